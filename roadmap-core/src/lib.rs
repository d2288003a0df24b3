//! Roadmap core library: manifest data model, store, validator, progress
//! policy, and configuration.
//!
//! - [`types`]: records, statuses, and the [`Manifest`] aggregate
//! - [`manifest`]: load / normalize / atomic save
//! - [`validate`]: accumulating structural checks
//! - [`progress`]: stored vs derived percentages
//! - [`dedupe`]: milestone de-duplication
//! - [`config`]: `roadmap.yaml`

pub mod config;
pub mod dedupe;
pub mod error;
pub mod manifest;
pub mod normalize;
pub mod progress;
pub mod types;
pub mod validate;

pub use config::{Config, ProjectConfig, RemoteConfig};
pub use error::{ConfigError, ManifestError};
pub use progress::ProgressPolicy;
pub use types::{
    Manifest, Milestone, MilestoneStatus, ProgressSummary, ProjectId, ProjectRecord,
    ProjectStatus, RepoRef,
};
pub use validate::{validate, Finding, FindingCode, Severity, ValidationResult};
