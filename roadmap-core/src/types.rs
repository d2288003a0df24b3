//! Domain types for the roadmap manifest.
//!
//! The manifest is the single source of truth; every README section and every
//! remote description is derived from these types. Unknown JSON fields are kept
//! in the `extra` maps so a load/save cycle never drops data written by a newer
//! version of the tool.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed project identifier (unique across the manifest).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Reference to a hosted repository in `owner/repo` form.
///
/// The raw string is kept as written so the validator can report malformed
/// references instead of the loader rejecting them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef(pub String);

impl RepoRef {
    /// Split into `(owner, repo)` if the reference is well formed.
    ///
    /// Both segments must be non-empty, use only ASCII alphanumerics, `-`,
    /// `_` or `.`, and the owner may not start with `-`. `.` and `..` are
    /// rejected as repository names.
    pub fn parts(&self) -> Option<(&str, &str)> {
        let (owner, name) = self.0.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        let valid = |s: &str| {
            s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };
        if !valid(owner) || !valid(name) || owner.starts_with('-') {
            return None;
        }
        if name == "." || name == ".." {
            return None;
        }
        Some((owner, name))
    }

    pub fn is_well_formed(&self) -> bool {
        self.parts().is_some()
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RepoRef {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a project. No transition rules are enforced.
///
/// Values outside the known vocabulary survive as [`ProjectStatus::Unrecognized`]
/// so that rendering can fail loudly instead of printing a blank cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectStatus {
    #[default]
    Planned,
    Scaffolded,
    Active,
    Done,
    Unrecognized(String),
}

impl ProjectStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectStatus::Planned => "planned",
            ProjectStatus::Scaffolded => "scaffolded",
            ProjectStatus::Active => "active",
            ProjectStatus::Done => "done",
            ProjectStatus::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for ProjectStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "planned" => ProjectStatus::Planned,
            "scaffolded" => ProjectStatus::Scaffolded,
            "active" => ProjectStatus::Active,
            "done" => ProjectStatus::Done,
            _ => ProjectStatus::Unrecognized(s),
        }
    }
}

impl From<ProjectStatus> for String {
    fn from(s: ProjectStatus) -> Self {
        match s {
            ProjectStatus::Unrecognized(raw) => raw,
            other => other.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion status of a milestone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MilestoneStatus {
    Done,
    InProgress,
    #[default]
    Planned,
    Unrecognized(String),
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &str {
        match self {
            MilestoneStatus::Done => "done",
            MilestoneStatus::InProgress => "in-progress",
            MilestoneStatus::Planned => "planned",
            MilestoneStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, MilestoneStatus::Done)
    }
}

impl From<String> for MilestoneStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "done" => MilestoneStatus::Done,
            "in-progress" => MilestoneStatus::InProgress,
            "planned" => MilestoneStatus::Planned,
            _ => MilestoneStatus::Unrecognized(s),
        }
    }
}

impl From<MilestoneStatus> for String {
    fn from(s: MilestoneStatus) -> Self {
        match s {
            MilestoneStatus::Unrecognized(raw) => raw,
            other => other.as_str().to_owned(),
        }
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Progress summary
// ---------------------------------------------------------------------------

/// Ordered mapping from category label to a completion percentage.
///
/// Serialized as a JSON object; entry order is the author's order and drives
/// badge order, so it is kept as written rather than sorted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressSummary {
    entries: Vec<(String, f64)>,
}

impl ProgressSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(label, _)| label == category)
            .map(|(_, pct)| *pct)
    }

    /// Insert or overwrite an entry. New labels are appended.
    pub fn set(&mut self, category: impl Into<String>, percent: f64) {
        let category = category.into();
        match self.entries.iter_mut().find(|(label, _)| *label == category) {
            Some(entry) => entry.1 = percent,
            None => self.entries.push((category, percent)),
        }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.entries.iter().any(|(label, _)| label == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(label, pct)| (label.as_str(), *pct))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, f64)> for ProgressSummary {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut summary = ProgressSummary::new();
        for (label, pct) in iter {
            summary.set(label, pct);
        }
        summary
    }
}

impl Serialize for ProgressSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, pct) in &self.entries {
            // Whole percentages are written as integers to match hand-edited files.
            if pct.is_finite() && pct.fract() == 0.0 && pct.abs() < 1e15 {
                map.serialize_entry(label, &(*pct as i64))?;
            } else {
                map.serialize_entry(label, pct)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProgressSummary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SummaryVisitor;

        impl<'de> Visitor<'de> for SummaryVisitor {
            type Value = ProgressSummary;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category label to percentage")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut summary = ProgressSummary::new();
                while let Some((label, pct)) = access.next_entry::<String, f64>()? {
                    summary.set(label, pct);
                }
                Ok(summary)
            }
        }

        deserializer.deserialize_map(SummaryVisitor)
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One external project repository tracked by the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    /// Human-readable display name.
    pub name: String,
    /// Short description; also published as the remote repository description.
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<RepoRef>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A dated goal inside a category. May optionally belong to one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub status: MilestoneStatus,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Aggregate root persisted as `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Last-updated date.
    pub updated: NaiveDate,
    pub projects: Vec<ProjectRecord>,
    pub milestones: Vec<Milestone>,
    pub progress: ProgressSummary,
    /// Categories registered explicitly, in addition to those used by projects
    /// and progress entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Manifest {
    pub fn project(&self, id: &ProjectId) -> Option<&ProjectRecord> {
        self.projects.iter().find(|p| &p.id == id)
    }

    /// Milestones owned by `id`, in stored order.
    pub fn milestones_for<'a>(&'a self, id: &'a ProjectId) -> impl Iterator<Item = &'a Milestone> {
        self.milestones
            .iter()
            .filter(move |m| m.project.as_ref() == Some(id))
    }

    /// Distinct milestone categories in first-appearance order.
    pub fn milestone_categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for m in &self.milestones {
            if !seen.contains(&m.category.as_str()) {
                seen.push(&m.category);
            }
        }
        seen
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(ProjectId::from("ml-foundations").to_string(), "ml-foundations");
        assert_eq!(RepoRef::from("octo/app").to_string(), "octo/app");
    }

    #[test]
    fn repo_ref_shape() {
        assert_eq!(RepoRef::from("Krispy145/secure-ai-api").parts(), Some(("Krispy145", "secure-ai-api")));
        assert!(RepoRef::from("owner/repo.rs").is_well_formed());
        assert!(!RepoRef::from("no-slash").is_well_formed());
        assert!(!RepoRef::from("a/b/c").is_well_formed());
        assert!(!RepoRef::from("/repo").is_well_formed());
        assert!(!RepoRef::from("owner/").is_well_formed());
        assert!(!RepoRef::from("-owner/repo").is_well_formed());
        assert!(!RepoRef::from("owner/..").is_well_formed());
        assert!(!RepoRef::from("https://github.com/owner/repo").is_well_formed());
        assert!(!RepoRef::from("own er/repo").is_well_formed());
    }

    #[test]
    fn status_vocabulary_roundtrip() {
        for raw in ["planned", "scaffolded", "active", "done"] {
            let status = ProjectStatus::from(raw.to_string());
            assert!(!matches!(status, ProjectStatus::Unrecognized(_)));
            assert_eq!(String::from(status), raw);
        }
        let odd = ProjectStatus::from("archived".to_string());
        assert_eq!(odd, ProjectStatus::Unrecognized("archived".to_string()));
        assert_eq!(odd.to_string(), "archived");

        assert_eq!(
            MilestoneStatus::from("in-progress".to_string()),
            MilestoneStatus::InProgress
        );
        assert!(MilestoneStatus::Done.is_done());
    }

    #[test]
    fn progress_summary_keeps_author_order() {
        let json = r#"{"Learning": 40, "Backend": 12.5, "Flutter": 0}"#;
        let summary: ProgressSummary = serde_json::from_str(json).expect("parse");
        let labels: Vec<&str> = summary.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, ["Learning", "Backend", "Flutter"]);
        assert_eq!(summary.get("Backend"), Some(12.5));

        let out = serde_json::to_string(&summary).expect("serialize");
        assert_eq!(out, r#"{"Learning":40,"Backend":12.5,"Flutter":0}"#);
    }

    #[test]
    fn progress_summary_set_overwrites_in_place() {
        let mut summary = ProgressSummary::new();
        summary.set("A", 10.0);
        summary.set("B", 20.0);
        summary.set("A", 30.0);
        let entries: Vec<_> = summary.iter().collect();
        assert_eq!(entries, [("A", 30.0), ("B", 20.0)]);
    }

    #[test]
    fn unknown_project_fields_are_preserved() {
        let json = r#"{
            "id": "flutter-iam",
            "name": "Flutter IAM",
            "status": "active",
            "cover_url": "images/flutter-iam/cover.webp"
        }"#;
        let record: ProjectRecord = serde_json::from_str(json).expect("parse");
        assert_eq!(
            record.extra.get("cover_url"),
            Some(&Value::String("images/flutter-iam/cover.webp".into()))
        );
        let back = serde_json::to_value(&record).expect("serialize");
        assert_eq!(back["cover_url"], "images/flutter-iam/cover.webp");
        assert_eq!(back["status"], "active");
    }
}
