//! # roadmap-renderer
//!
//! Projects a roadmap [`Manifest`](roadmap_core::Manifest) into candidate
//! artifacts: README sections rendered from embedded Tera templates, and the
//! description/topics of each hosted repository.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use roadmap_renderer::{markers, Artifact, ArtifactKind, Projector};
//!
//! fn refresh(manifest: &roadmap_core::Manifest, readme: &str) -> Option<String> {
//!     let projector = Projector::new().ok()?;
//!     match projector.project(manifest, &ArtifactKind::Overview).ok()? {
//!         Artifact::Section { section, body } => markers::splice(readme, section, &body).ok(),
//!         Artifact::Remote { .. } => None,
//!     }
//! }
//! ```

pub mod artifact;
pub mod badge;
pub mod context;
pub mod engine;
pub mod error;
pub mod glyph;
pub mod markers;

pub use artifact::{Artifact, ArtifactKind, RemoteMetadata, OVERVIEW_SECTION, PROJECT_SECTION};
pub use badge::ColorBand;
pub use engine::{Projector, TemplateEngine};
pub use error::RenderError;
