//! What the projector produces.

use std::fmt;

use serde::{Deserialize, Serialize};

use roadmap_core::types::{ProjectId, RepoRef};
use roadmap_core::validate::{MAX_TOPICS, MAX_TOPIC_LEN};

use crate::error::RenderError;
use crate::markers;

/// Section name of the overview region in the roadmap README.
pub const OVERVIEW_SECTION: &str = "overview";
/// Section name of the generated region in each project README.
pub const PROJECT_SECTION: &str = "roadmap";

/// One projectable artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Progress badges, current focus, repository table and milestones.
    Overview,
    /// Status block and milestone table for one project's README.
    ProjectSection(ProjectId),
    /// Description and topics of one project's hosted repository.
    RemoteMetadata(ProjectId),
}

impl ArtifactKind {
    /// Marker section name; `None` for remote artifacts.
    pub fn section(&self) -> Option<&'static str> {
        match self {
            ArtifactKind::Overview => Some(OVERVIEW_SECTION),
            ArtifactKind::ProjectSection(_) => Some(PROJECT_SECTION),
            ArtifactKind::RemoteMetadata(_) => None,
        }
    }

    pub fn project(&self) -> Option<&ProjectId> {
        match self {
            ArtifactKind::Overview => None,
            ArtifactKind::ProjectSection(id) | ArtifactKind::RemoteMetadata(id) => Some(id),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Overview => f.write_str("overview"),
            ArtifactKind::ProjectSection(id) => write!(f, "section:{id}"),
            ArtifactKind::RemoteMetadata(id) => write!(f, "remote:{id}"),
        }
    }
}

/// Remote repository fields managed by the tool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteMetadata {
    pub description: String,
    pub topics: Vec<String>,
}

/// A rendered candidate for one target.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// Body of a marker-bounded region (markers not included).
    Section {
        section: &'static str,
        body: String,
    },
    Remote {
        repo: RepoRef,
        metadata: RemoteMetadata,
    },
}

impl Artifact {
    /// Printable form: the full marked region, or the remote fields as JSON.
    pub fn to_text(&self) -> Result<String, RenderError> {
        match self {
            Artifact::Section { section, body } => {
                Ok(format!("{}\n", markers::region(section, body)))
            }
            Artifact::Remote { repo, metadata } => {
                let value = serde_json::json!({
                    "repo": repo.0,
                    "description": metadata.description,
                    "topics": metadata.topics,
                });
                let mut text = serde_json::to_string_pretty(&value)?;
                text.push('\n');
                Ok(text)
            }
        }
    }
}

/// Topics the way GitHub stores them: lower-case, hyphenated, unique, and at
/// most [`MAX_TOPICS`] of them. Over-long topics are dropped.
pub fn normalize_topics(topics: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in topics {
        let topic = raw
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        if topic.is_empty() || topic.chars().count() > MAX_TOPIC_LEN || out.contains(&topic) {
            continue;
        }
        out.push(topic);
        if out.len() == MAX_TOPICS {
            break;
        }
    }
    out
}
