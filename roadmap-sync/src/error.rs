//! Error types for roadmap-sync.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use roadmap_renderer::RenderError;

/// Errors that abort a whole reconciliation run.
///
/// Per-resource problems never surface here; they are recorded as
/// [`Outcome::Failed`](crate::report::Outcome::Failed) on that resource.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote reconciliation was requested without a client.
    #[error("remote reconciliation requested but no remote client is configured")]
    RemoteUnavailable,
}

/// Failure talking to the hosted repository API. Scoped to one resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("repository {repo} not found (or not visible to this token)")]
    NotFound { repo: String },

    #[error("authentication failed (401): check the API token")]
    Unauthorized,

    #[error("forbidden (403): {0}")]
    Forbidden(String),

    /// Throttled by the server. Retried by the throttle until exhausted.
    #[error("rate limited by the remote API")]
    RateLimited { retry_after: Option<Duration> },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("failed to parse remote response: {0}")]
    Parse(String),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
