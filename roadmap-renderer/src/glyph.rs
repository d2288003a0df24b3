//! Status glyphs. Each mapping is total over the known vocabulary; anything
//! else fails with [`RenderError::UnknownStatus`].

use roadmap_core::types::{MilestoneStatus, ProjectStatus};

use crate::error::RenderError;

fn unknown(value: &str, context: &str) -> RenderError {
    RenderError::UnknownStatus {
        value: value.to_string(),
        context: context.to_string(),
    }
}

/// Label for a project status cell, e.g. `🚀 Active`.
pub fn project_label(status: &ProjectStatus, context: &str) -> Result<&'static str, RenderError> {
    match status {
        ProjectStatus::Planned => Ok("⏳ Planned"),
        ProjectStatus::Scaffolded => Ok("🧩 Scaffolded"),
        ProjectStatus::Active => Ok("🚀 Active"),
        ProjectStatus::Done => Ok("✅ Done"),
        ProjectStatus::Unrecognized(raw) => Err(unknown(raw, context)),
    }
}

/// Label for a milestone status cell, e.g. `🚀 In Progress`.
pub fn milestone_label(
    status: &MilestoneStatus,
    context: &str,
) -> Result<&'static str, RenderError> {
    match status {
        MilestoneStatus::Done => Ok("✅ Done"),
        MilestoneStatus::InProgress => Ok("🚀 In Progress"),
        MilestoneStatus::Planned => Ok("⏳ Planned"),
        MilestoneStatus::Unrecognized(raw) => Err(unknown(raw, context)),
    }
}

/// Bare glyph for milestone bullet lists.
pub fn milestone_bullet(
    status: &MilestoneStatus,
    context: &str,
) -> Result<&'static str, RenderError> {
    milestone_label(status, context)
        .map(|label| label.split_once(' ').map_or(label, |(glyph, _)| glyph))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_have_glyphs() {
        for status in [
            ProjectStatus::Planned,
            ProjectStatus::Scaffolded,
            ProjectStatus::Active,
            ProjectStatus::Done,
        ] {
            assert!(project_label(&status, "p").is_ok());
        }
        assert_eq!(milestone_bullet(&MilestoneStatus::Done, "m").ok(), Some("✅"));
        assert_eq!(milestone_bullet(&MilestoneStatus::InProgress, "m").ok(), Some("🚀"));
        assert_eq!(milestone_bullet(&MilestoneStatus::Planned, "m").ok(), Some("⏳"));
    }

    #[test]
    fn unrecognized_status_names_value_and_context() {
        let err = project_label(&ProjectStatus::Unrecognized("archived".into()), "projects[old]")
            .unwrap_err();
        assert!(err.is_unknown_status());
        assert_eq!(err.to_string(), "unknown status `archived` in projects[old]");
    }
}
