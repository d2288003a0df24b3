//! Per-resource outcomes and the aggregate run report.

use std::fmt;

use roadmap_core::validate::Finding;
use roadmap_renderer::ArtifactKind;

/// What happened (or would happen) to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created,
    /// Content replaced. For remote resources, `fields` names what changed.
    Updated { fields: Vec<String> },
    Unchanged,
    Skipped { reason: String },
    /// Dry-run: the target does not exist yet.
    WouldCreate { diff: String },
    /// Dry-run: the target differs from the candidate.
    WouldUpdate { diff: String },
    /// The artifact could not be projected (e.g. an unknown status).
    ProjectionFailed { cause: String },
    /// Reconciliation of this resource failed; others were unaffected.
    Failed { cause: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. } | Outcome::ProjectionFailed { .. })
    }

    /// Diff carried by a dry-run outcome.
    pub fn diff(&self) -> Option<&str> {
        match self {
            Outcome::WouldCreate { diff } | Outcome::WouldUpdate { diff } => Some(diff),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Updated { .. } => "updated",
            Outcome::Unchanged => "unchanged",
            Outcome::Skipped { .. } => "skipped",
            Outcome::WouldCreate { .. } => "would create",
            Outcome::WouldUpdate { .. } => "would update",
            Outcome::ProjectionFailed { .. } => "projection failed",
            Outcome::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Updated { fields } if !fields.is_empty() => {
                write!(f, "updated ({})", fields.join(", "))
            }
            Outcome::Skipped { reason } => write!(f, "skipped: {reason}"),
            Outcome::ProjectionFailed { cause } => write!(f, "projection failed: {cause}"),
            Outcome::Failed { cause } => write!(f, "failed: {cause}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Outcome for one (artifact, target) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOutcome {
    pub artifact: ArtifactKind,
    /// Document path or `owner/repo`.
    pub target: String,
    pub outcome: Outcome,
}

/// Summary counters printed at the end of every run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub validated: usize,
    pub projected: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Authoritative result of a run; the exit status is derived from it.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub findings: Vec<Finding>,
    /// Records checked by the validator (projects + milestones).
    pub validated: usize,
    /// Artifacts successfully projected.
    pub projected: usize,
    pub resources: Vec<ResourceOutcome>,
    pub dry_run: bool,
}

impl RunReport {
    pub fn is_blocked(&self) -> bool {
        self.findings.iter().any(Finding::is_fatal)
    }

    /// True when the run must exit non-zero.
    pub fn has_failures(&self) -> bool {
        self.is_blocked() || self.resources.iter().any(|r| r.outcome.is_failure())
    }

    pub fn push(&mut self, artifact: ArtifactKind, target: impl Into<String>, outcome: Outcome) {
        self.resources.push(ResourceOutcome {
            artifact,
            target: target.into(),
            outcome,
        });
    }

    pub fn counts(&self) -> Counts {
        let mut counts = Counts {
            validated: self.validated,
            projected: self.projected,
            ..Counts::default()
        };
        for r in &self.resources {
            match r.outcome {
                Outcome::Created | Outcome::WouldCreate { .. } => counts.created += 1,
                Outcome::Updated { .. } | Outcome::WouldUpdate { .. } => counts.updated += 1,
                Outcome::Unchanged => counts.unchanged += 1,
                Outcome::Skipped { .. } => counts.skipped += 1,
                Outcome::Failed { .. } | Outcome::ProjectionFailed { .. } => counts.failed += 1,
            }
        }
        counts
    }

    pub fn failures(&self) -> impl Iterator<Item = &ResourceOutcome> {
        self.resources.iter().filter(|r| r.outcome.is_failure())
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "validated {}, projected {}, created {}, updated {}, unchanged {}, skipped {}, failed {}",
            self.validated,
            self.projected,
            self.created,
            self.updated,
            self.unchanged,
            self.skipped,
            self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadmap_core::ProjectId;

    #[test]
    fn counts_and_failure_flag() {
        let mut report = RunReport::default();
        report.push(ArtifactKind::Overview, "README.md", Outcome::Created);
        report.push(
            ArtifactKind::RemoteMetadata(ProjectId::from("a")),
            "me/a",
            Outcome::Updated { fields: vec!["topics".into()] },
        );
        report.push(
            ArtifactKind::RemoteMetadata(ProjectId::from("b")),
            "me/b",
            Outcome::Skipped { reason: "no description".into() },
        );
        assert!(!report.has_failures());

        report.push(
            ArtifactKind::RemoteMetadata(ProjectId::from("c")),
            "me/c",
            Outcome::Failed { cause: "401".into() },
        );
        let counts = report.counts();
        assert_eq!((counts.created, counts.updated, counts.skipped, counts.failed), (1, 1, 1, 1));
        assert!(report.has_failures());
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn outcome_display() {
        let o = Outcome::Updated { fields: vec!["description".into(), "topics".into()] };
        assert_eq!(o.to_string(), "updated (description, topics)");
        assert_eq!(Outcome::Unchanged.to_string(), "unchanged");
        assert_eq!(Outcome::WouldCreate { diff: String::new() }.to_string(), "would create");
    }
}
