//! Error types for roadmap-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while projecting a manifest into an artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON serialization error (building tera context).
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while loading user templates.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// A status value has no glyph. Aborts the artifact being projected.
    #[error("unknown status `{value}` in {context}")]
    UnknownStatus { value: String, context: String },

    /// Begin/end markers for `section` are missing a partner or out of order.
    #[error("marker mismatch for section `{section}`: {reason}")]
    MarkerMismatch { section: String, reason: String },

    #[error("no project with id `{id}` in the manifest")]
    UnknownProject { id: String },

    /// Remote metadata requested for a project without a usable `owner/repo`.
    #[error("project `{id}` has no valid repository reference")]
    MissingRepository { id: String },
}

impl RenderError {
    pub fn is_unknown_status(&self) -> bool {
        matches!(self, RenderError::UnknownStatus { .. })
    }
}
