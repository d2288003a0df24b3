//! Template contexts: every cell is pre-formatted here so templates only lay
//! out lines and the output does not depend on Tera's number or date filters.

use chrono::NaiveDate;
use serde::Serialize;

use roadmap_core::types::{Manifest, Milestone, MilestoneStatus, ProgressSummary, ProjectRecord};

use crate::badge;
use crate::error::RenderError;
use crate::glyph;

/// Placeholder for an absent date or empty cell.
pub const EMPTY_CELL: &str = "—";
/// Web base for repository links.
pub const REPO_WEB_BASE: &str = "https://github.com";

/// `dd/mm/yyyy`, or `—` when undated.
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%d/%m/%Y").to_string(),
        None => EMPTY_CELL.to_string(),
    }
}

/// Make `text` safe inside a Markdown table cell.
pub fn escape_cell(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        return EMPTY_CELL.to_string();
    }
    flat.replace('|', "\\|")
}

/// Group milestones by category (first-appearance order); within a group,
/// ascending due date with undated last. Ties keep input order.
pub fn ordered_groups<'a, I>(milestones: I) -> Vec<(&'a str, Vec<&'a Milestone>)>
where
    I: IntoIterator<Item = &'a Milestone>,
{
    let mut groups: Vec<(&'a str, Vec<&'a Milestone>)> = Vec::new();
    for m in milestones {
        match groups.iter_mut().find(|(category, _)| *category == m.category) {
            Some((_, items)) => items.push(m),
            None => groups.push((m.category.as_str(), vec![m])),
        }
    }
    for (_, items) in &mut groups {
        items.sort_by_key(|m| (m.due.is_none(), m.due));
    }
    groups
}

fn milestone_context(m: &Milestone) -> String {
    format!("milestone `{}`", m.title)
}

fn project_context(p: &ProjectRecord) -> String {
    format!("project `{}`", p.id)
}

/// In-progress milestones by date, then the next planned one.
fn current_focus(manifest: &Manifest) -> Vec<String> {
    let by_date = |status: MilestoneStatus| {
        let mut picked: Vec<&Milestone> = manifest
            .milestones
            .iter()
            .filter(|m| m.status == status)
            .collect();
        picked.sort_by_key(|m| (m.due.is_none(), m.due));
        picked
    };

    let mut lines: Vec<String> = by_date(MilestoneStatus::InProgress)
        .into_iter()
        .map(|m| format!("- 🚀 **{}** → {}", m.title, format_date(m.due)))
        .collect();
    if let Some(next) = by_date(MilestoneStatus::Planned).first() {
        lines.push(format!("- Next: **{}** → {}", next.title, format_date(next.due)));
    }
    if lines.is_empty() {
        lines.push("- Nothing in progress".to_string());
    }
    lines
}

fn repository_link(project: &ProjectRecord) -> String {
    let label = escape_cell(&project.name);
    match project.repo.as_ref().and_then(|r| r.parts()) {
        Some((owner, name)) => format!("[`{label}`]({REPO_WEB_BASE}/{owner}/{name})"),
        None => format!("`{label}`"),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupCtx {
    pub category: String,
    pub lines: Vec<String>,
}

/// Payload of `overview.md.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewCtx {
    pub badges: String,
    pub updated: String,
    pub focus: Vec<String>,
    pub repositories: Vec<String>,
    pub milestone_groups: Vec<GroupCtx>,
}

impl OverviewCtx {
    pub fn build(manifest: &Manifest, progress: &ProgressSummary) -> Result<Self, RenderError> {
        let badges = if progress.is_empty() {
            "_No progress recorded._".to_string()
        } else {
            progress
                .iter()
                .map(|(label, pct)| badge::badge(label, pct))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let repositories = manifest
            .projects
            .iter()
            .map(|p| {
                Ok(format!(
                    "| {} | {} | {} | {} |",
                    repository_link(p),
                    escape_cell(&p.description),
                    glyph::project_label(&p.status, &project_context(p))?,
                    format_date(p.target)
                ))
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        let mut milestone_groups = Vec::new();
        for (category, items) in ordered_groups(&manifest.milestones) {
            let lines = items
                .into_iter()
                .map(|m| {
                    let bullet = glyph::milestone_bullet(&m.status, &milestone_context(m))?;
                    Ok(match m.due {
                        Some(_) => format!("- {bullet} {} ({})", m.title, format_date(m.due)),
                        None => format!("- {bullet} {}", m.title),
                    })
                })
                .collect::<Result<Vec<_>, RenderError>>()?;
            milestone_groups.push(GroupCtx {
                category: category.to_string(),
                lines,
            });
        }

        Ok(OverviewCtx {
            badges,
            updated: format_date(Some(manifest.updated)),
            focus: current_focus(manifest),
            repositories,
            milestone_groups,
        })
    }
}

/// Payload of `project_section.md.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectCtx {
    pub name: String,
    pub status: String,
    pub updated: String,
    pub target: String,
    pub topics: String,
    pub roadmap_rows: Vec<String>,
}

impl ProjectCtx {
    pub fn build(manifest: &Manifest, project: &ProjectRecord) -> Result<Self, RenderError> {
        let status = glyph::project_label(&project.status, &project_context(project))?;

        let mut roadmap_rows = Vec::new();
        for (category, items) in ordered_groups(manifest.milestones_for(&project.id)) {
            for m in items {
                roadmap_rows.push(format!(
                    "| {} | {} | {} | {} |",
                    escape_cell(&m.title),
                    escape_cell(category),
                    format_date(m.due),
                    glyph::milestone_label(&m.status, &milestone_context(m))?
                ));
            }
        }

        let topics = project
            .topics
            .iter()
            .map(|t| format!("`{t}`"))
            .collect::<Vec<_>>()
            .join(" ");

        Ok(ProjectCtx {
            name: project.name.clone(),
            status: status.to_string(),
            updated: format_date(Some(manifest.updated)),
            target: format_date(project.target),
            topics,
            roadmap_rows,
        })
    }
}

pub(crate) fn to_tera_context<T: Serialize>(ctx: &T) -> Result<tera::Context, RenderError> {
    tera::Context::from_serialize(ctx).map_err(RenderError::from)
}
