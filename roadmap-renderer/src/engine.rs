//! Tera rendering engine and the [`Projector`].
//!
//! # Templates
//!
//! | Template                    | Artifact                        |
//! |-----------------------------|---------------------------------|
//! | `overview.md.tera`          | [`ArtifactKind::Overview`]      |
//! | `project_section.md.tera`   | [`ArtifactKind::ProjectSection`]|
//!
//! Remote metadata is plain data and needs no template.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use roadmap_core::progress::{self, ProgressPolicy};
use roadmap_core::types::{Manifest, ProjectId};

use crate::artifact::{normalize_topics, Artifact, ArtifactKind, RemoteMetadata};
use crate::context::{to_tera_context, OverviewCtx, ProjectCtx};
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

pub const OVERVIEW_TEMPLATE: &str = "overview.md.tera";
pub const PROJECT_TEMPLATE: &str = "project_section.md.tera";

const TPLS: &[(&str, &str)] = &[
    (OVERVIEW_TEMPLATE, include_str!("templates/overview.md.tera")),
    (PROJECT_TEMPLATE, include_str!("templates/project_section.md.tera")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    files.sort();
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(normalize_template_name(Path::new(name)), (*content).to_string());
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            tracing::debug!("template override: {name}");
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine for rendering templates with optional user overrides.
///
/// `user_template_dir` may contain `.tera` files that override embedded defaults.
/// Template names are normalised to lowercase and relative paths.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render `name` and normalise line endings and trailing whitespace.
    pub fn render(&self, name: &str, ctx: &tera::Context) -> Result<String, RenderError> {
        let raw = self.tera.render(name, ctx)?;
        let unix = raw.replace("\r\n", "\n");
        Ok(unix.trim_end().to_string())
    }
}

// ---------------------------------------------------------------------------
// Projector
// ---------------------------------------------------------------------------

/// Turns a manifest into candidate artifacts. Pure: no I/O after construction.
pub struct Projector {
    engine: TemplateEngine,
    policy: ProgressPolicy,
}

impl Projector {
    /// Embedded templates, derived progress.
    pub fn new() -> Result<Self, RenderError> {
        Projector::with_options(None, ProgressPolicy::default())
    }

    pub fn with_options(
        user_template_dir: Option<&Path>,
        policy: ProgressPolicy,
    ) -> Result<Self, RenderError> {
        Ok(Projector {
            engine: TemplateEngine::new(user_template_dir)?,
            policy,
        })
    }

    /// Render one artifact. The same manifest always yields the same bytes.
    pub fn project(&self, manifest: &Manifest, kind: &ArtifactKind) -> Result<Artifact, RenderError> {
        match kind {
            ArtifactKind::Overview => {
                let summary = progress::effective(manifest, self.policy);
                let ctx = OverviewCtx::build(manifest, &summary)?;
                let body = self.engine.render(OVERVIEW_TEMPLATE, &to_tera_context(&ctx)?)?;
                Ok(Artifact::Section {
                    section: crate::artifact::OVERVIEW_SECTION,
                    body,
                })
            }
            ArtifactKind::ProjectSection(id) => {
                let project = lookup(manifest, id)?;
                let ctx = ProjectCtx::build(manifest, project)?;
                let body = self.engine.render(PROJECT_TEMPLATE, &to_tera_context(&ctx)?)?;
                Ok(Artifact::Section {
                    section: crate::artifact::PROJECT_SECTION,
                    body,
                })
            }
            ArtifactKind::RemoteMetadata(id) => {
                let project = lookup(manifest, id)?;
                let repo = project
                    .repo
                    .clone()
                    .filter(|r| r.is_well_formed())
                    .ok_or_else(|| RenderError::MissingRepository { id: id.0.clone() })?;
                Ok(Artifact::Remote {
                    repo,
                    metadata: RemoteMetadata {
                        description: project.description.trim().to_string(),
                        topics: normalize_topics(&project.topics),
                    },
                })
            }
        }
    }
}

fn lookup<'a>(
    manifest: &'a Manifest,
    id: &ProjectId,
) -> Result<&'a roadmap_core::types::ProjectRecord, RenderError> {
    manifest
        .project(id)
        .ok_or_else(|| RenderError::UnknownProject { id: id.0.clone() })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
