//! # roadmap-sync
//!
//! Reconciles projected artifacts with their targets: marker-bounded regions
//! in local README files, and description/topics of hosted repositories.
//!
//! Call [`pipeline::run`] to validate, project and reconcile in one pass.

pub mod diff;
pub mod error;
pub mod github;
pub mod local;
pub mod pipeline;
pub mod remote;
pub mod report;
pub mod throttle;

pub use error::{RemoteError, SyncError};
pub use github::GithubClient;
pub use pipeline::{Remote, RunOptions, Scope};
pub use remote::{RemoteClient, RemoteTask};
pub use report::{Counts, Outcome, ResourceOutcome, RunReport};
pub use throttle::Throttle;
