//! Structural checks run before any projection.
//!
//! Findings accumulate: one pass reports every problem in the manifest. Fatal
//! findings block projection; warnings are surfaced but never block.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::types::{Manifest, ProjectId};

/// GitHub accepts at most this many topics per repository.
pub const MAX_TOPICS: usize = 20;
/// GitHub rejects topics longer than this.
pub const MAX_TOPIC_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Fatal => f.write_str("error"),
        }
    }
}

/// What a finding is about. Severity is a fixed property of the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingCode {
    DuplicateIdentifier,
    InvalidReference,
    InvalidProgress,
    OrphanCategory,
    UnknownProject,
    DuplicateMilestone,
    RepeatedMilestone,
    MissingDescription,
    TopicLimit,
}

impl FindingCode {
    pub fn severity(self) -> Severity {
        match self {
            FindingCode::DuplicateIdentifier
            | FindingCode::InvalidReference
            | FindingCode::InvalidProgress
            | FindingCode::UnknownProject
            | FindingCode::DuplicateMilestone => Severity::Fatal,
            FindingCode::OrphanCategory
            | FindingCode::RepeatedMilestone
            | FindingCode::MissingDescription
            | FindingCode::TopicLimit => Severity::Warning,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FindingCode::DuplicateIdentifier => "duplicate-identifier",
            FindingCode::InvalidReference => "invalid-reference",
            FindingCode::InvalidProgress => "invalid-progress",
            FindingCode::OrphanCategory => "orphan-category",
            FindingCode::UnknownProject => "unknown-project",
            FindingCode::DuplicateMilestone => "duplicate-milestone",
            FindingCode::RepeatedMilestone => "repeated-milestone",
            FindingCode::MissingDescription => "missing-description",
            FindingCode::TopicLimit => "topic-limit",
        }
    }
}

impl fmt::Display for FindingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub code: FindingCode,
    /// JSON-path-like pointer into the manifest, e.g. `projects[2]`.
    pub location: String,
    pub message: String,
}

impl Finding {
    fn new(code: FindingCode, location: impl Into<String>, message: impl Into<String>) -> Self {
        Finding {
            code,
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity(),
            self.code,
            self.location,
            self.message
        )
    }
}

/// All findings for one manifest, in check order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub findings: Vec<Finding>,
}

impl ValidationResult {
    pub fn is_fatal(&self) -> bool {
        self.findings.iter().any(Finding::is_fatal)
    }

    pub fn fatal(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_fatal())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.is_fatal())
    }

    pub fn has(&self, code: FindingCode) -> bool {
        self.findings.iter().any(|f| f.code == code)
    }
}

/// Validate `manifest`. `known_categories` are registered in addition to the
/// manifest's own `categories` list (typically from configuration).
pub fn validate(manifest: &Manifest, known_categories: &[String]) -> ValidationResult {
    let mut findings = Vec::new();

    check_unique_ids(manifest, &mut findings);
    check_references(manifest, &mut findings);
    check_progress(manifest, &mut findings);
    check_categories(manifest, known_categories, &mut findings);
    check_milestone_owners(manifest, &mut findings);
    check_milestone_duplicates(manifest, &mut findings);
    check_publishable(manifest, &mut findings);

    ValidationResult { findings }
}

fn check_unique_ids(manifest: &Manifest, out: &mut Vec<Finding>) {
    let mut first_seen: HashMap<&ProjectId, usize> = HashMap::new();
    for (i, project) in manifest.projects.iter().enumerate() {
        if let Some(first) = first_seen.get(&project.id) {
            out.push(Finding::new(
                FindingCode::DuplicateIdentifier,
                format!("projects[{i}]"),
                format!(
                    "identifier `{}` already used by projects[{first}]",
                    project.id
                ),
            ));
        } else {
            first_seen.insert(&project.id, i);
        }
    }
}

fn check_references(manifest: &Manifest, out: &mut Vec<Finding>) {
    for (i, project) in manifest.projects.iter().enumerate() {
        let Some(repo) = &project.repo else { continue };
        if !repo.is_well_formed() {
            out.push(Finding::new(
                FindingCode::InvalidReference,
                format!("projects[{i}].repo"),
                format!("`{repo}` is not an `owner/repo` reference"),
            ));
        }
    }
}

fn check_progress(manifest: &Manifest, out: &mut Vec<Finding>) {
    for (label, pct) in manifest.progress.iter() {
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            out.push(Finding::new(
                FindingCode::InvalidProgress,
                format!("progress.{label}"),
                format!("{pct} is outside 0..=100"),
            ));
        }
    }
}

fn check_categories(manifest: &Manifest, known: &[String], out: &mut Vec<Finding>) {
    let mut registered: HashSet<&str> = HashSet::new();
    registered.extend(manifest.projects.iter().filter_map(|p| p.category.as_deref()));
    registered.extend(manifest.progress.iter().map(|(label, _)| label));
    registered.extend(manifest.categories.iter().map(String::as_str));
    registered.extend(known.iter().map(String::as_str));

    let mut reported: HashSet<&str> = HashSet::new();
    for (i, milestone) in manifest.milestones.iter().enumerate() {
        let category = milestone.category.as_str();
        if registered.contains(category) || !reported.insert(category) {
            continue;
        }
        out.push(Finding::new(
            FindingCode::OrphanCategory,
            format!("milestones[{i}].category"),
            format!("category `{category}` is not used by any project or progress entry"),
        ));
    }
}

fn check_milestone_owners(manifest: &Manifest, out: &mut Vec<Finding>) {
    let ids: HashSet<&ProjectId> = manifest.projects.iter().map(|p| &p.id).collect();
    for (i, milestone) in manifest.milestones.iter().enumerate() {
        let Some(owner) = &milestone.project else { continue };
        if !ids.contains(owner) {
            out.push(Finding::new(
                FindingCode::UnknownProject,
                format!("milestones[{i}].project"),
                format!("`{owner}` is not a project identifier"),
            ));
        }
    }
}

fn check_milestone_duplicates(manifest: &Manifest, out: &mut Vec<Finding>) {
    let mut ids: HashSet<&str> = HashSet::new();
    let mut pairs: HashSet<(Option<&ProjectId>, String, Option<chrono::NaiveDate>)> =
        HashSet::new();

    for (i, milestone) in manifest.milestones.iter().enumerate() {
        if let Some(id) = milestone.id.as_deref() {
            if !ids.insert(id) {
                out.push(Finding::new(
                    FindingCode::DuplicateMilestone,
                    format!("milestones[{i}].id"),
                    format!("milestone id `{id}` is used more than once"),
                ));
            }
        }

        let key = (
            milestone.project.as_ref(),
            milestone.title.trim().to_lowercase(),
            milestone.due,
        );
        if !pairs.insert(key) {
            out.push(Finding::new(
                FindingCode::RepeatedMilestone,
                format!("milestones[{i}]"),
                format!(
                    "`{}` appears twice with the same date; run `roadmap dedupe`",
                    milestone.title
                ),
            ));
        }
    }
}

fn check_publishable(manifest: &Manifest, out: &mut Vec<Finding>) {
    for (i, project) in manifest.projects.iter().enumerate() {
        if project.description.trim().is_empty() {
            out.push(Finding::new(
                FindingCode::MissingDescription,
                format!("projects[{i}].description"),
                format!("`{}` has no short description; remote sync will skip it", project.id),
            ));
        }
        if project.topics.len() > MAX_TOPICS {
            out.push(Finding::new(
                FindingCode::TopicLimit,
                format!("projects[{i}].topics"),
                format!("{} topics; only the first {MAX_TOPICS} are published", project.topics.len()),
            ));
        }
        for topic in project.topics.iter().filter(|t| t.chars().count() > MAX_TOPIC_LEN) {
            out.push(Finding::new(
                FindingCode::TopicLimit,
                format!("projects[{i}].topics"),
                format!("topic `{topic}` is longer than {MAX_TOPIC_LEN} characters"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest;
    use std::path::Path;

    fn parse(json: &str) -> Manifest {
        manifest::parse(Path::new("test.json"), json).expect("parse")
    }

    #[test]
    fn clean_manifest_has_no_findings() {
        let m = parse(
            r#"{
            "updated": "2025-10-05",
            "projects": [{"id": "a", "name": "A", "description": "d", "category": "Backend", "repo": "me/a"}],
            "milestones": [{"title": "t", "category": "Backend", "project": "a", "status": "done"}],
            "progress": {"Backend": 50}
        }"#,
        );
        let result = validate(&m, &[]);
        assert!(result.findings.is_empty(), "{:?}", result.findings);
        assert!(!result.is_fatal());
    }

    #[test]
    fn orphan_category_is_only_a_warning_and_reported_once() {
        let m = parse(
            r#"{
            "updated": "2025-10-05",
            "projects": [],
            "milestones": [
                {"title": "one", "category": "Gardening"},
                {"title": "two", "category": "Gardening"}
            ],
            "progress": {}
        }"#,
        );
        let result = validate(&m, &[]);
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].code, FindingCode::OrphanCategory);
        assert!(!result.is_fatal());

        let known = validate(&m, &["Gardening".to_string()]);
        assert!(known.findings.is_empty());
    }

    #[test]
    fn nan_progress_is_invalid() {
        let mut m = parse(r#"{"updated": "2025-10-05", "projects": [], "milestones": [], "progress": {}}"#);
        m.progress.set("Backend", f64::NAN);
        assert!(validate(&m, &[]).has(FindingCode::InvalidProgress));
    }

    #[test]
    fn finding_display_includes_code_and_location() {
        let f = Finding::new(FindingCode::InvalidProgress, "progress.x", "150 is outside 0..=100");
        assert_eq!(f.to_string(), "error [invalid-progress] progress.x: 150 is outside 0..=100");
    }
}
