//! Validate → project → reconcile. The canonical entrypoint used by the CLI.

use std::path::{Path, PathBuf};

use roadmap_core::config::Config;
use roadmap_core::types::{Manifest, ProjectId};
use roadmap_core::validate;
use roadmap_renderer::{Artifact, ArtifactKind, Projector};

use crate::error::SyncError;
use crate::local;
use crate::remote::{self, RemoteClient, RemoteTask};
use crate::report::{Outcome, RunReport};
use crate::throttle::Throttle;

/// Which projects a run touches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    /// The overview plus every project.
    #[default]
    All,
    /// One project's section and remote metadata; the overview is left alone.
    Project(ProjectId),
}

impl Scope {
    fn includes(&self, id: &ProjectId) -> bool {
        match self {
            Scope::All => true,
            Scope::Project(only) => only == id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub local: bool,
    pub remote: bool,
    pub dry_run: bool,
    pub scope: Scope,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            local: true,
            remote: true,
            dry_run: false,
            scope: Scope::All,
        }
    }
}

/// Remote side of a run: client, shared throttle, and worker count.
pub struct Remote<'a> {
    pub client: &'a dyn RemoteClient,
    pub throttle: &'a Throttle,
    pub concurrency: usize,
}

/// One local document target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTarget {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    /// Path shown in reports and diff headers.
    pub label: String,
}

/// Local targets for `scope`, overview first, then projects in stored order.
pub fn local_targets(manifest: &Manifest, config: &Config, scope: &Scope) -> Vec<LocalTarget> {
    let mut targets = Vec::new();
    if *scope == Scope::All {
        let path = config.overview_path();
        targets.push(LocalTarget {
            kind: ArtifactKind::Overview,
            label: display_label(config.base_dir(), &path),
            path,
        });
    }
    for project in manifest.projects.iter().filter(|p| scope.includes(&p.id)) {
        let path = config.readme_path(&project.id);
        targets.push(LocalTarget {
            kind: ArtifactKind::ProjectSection(project.id.clone()),
            label: display_label(config.base_dir(), &path),
            path,
        });
    }
    targets
}

fn display_label(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Run the full pipeline.
///
/// Fatal validation findings stop the run before anything is projected.
/// Per-resource failures are recorded in the report; only setup problems
/// return `Err`.
pub fn run(
    manifest: &Manifest,
    config: &Config,
    projector: &Projector,
    remote: Option<Remote<'_>>,
    opts: &RunOptions,
) -> Result<RunReport, SyncError> {
    let mut report = RunReport {
        dry_run: opts.dry_run,
        ..RunReport::default()
    };

    check_scope(manifest, &opts.scope)?;

    let validation = validate::validate(manifest, &config.known_categories);
    report.validated = manifest.projects.len() + manifest.milestones.len();
    report.findings = validation.findings;
    if report.is_blocked() {
        tracing::warn!("validation failed; nothing projected");
        return Ok(report);
    }

    if opts.local {
        reconcile_local(manifest, config, projector, opts, &mut report);
    }

    if opts.remote {
        let remote = remote.ok_or(SyncError::RemoteUnavailable)?;
        reconcile_remote(manifest, config, projector, &remote, opts, &mut report);
    }

    Ok(report)
}

fn check_scope(manifest: &Manifest, scope: &Scope) -> Result<(), SyncError> {
    if let Scope::Project(id) = scope {
        if manifest.project(id).is_none() {
            return Err(roadmap_renderer::RenderError::UnknownProject { id: id.0.clone() }.into());
        }
    }
    Ok(())
}

/// Why `target` is left alone, if it is. Project READMEs are only written
/// into checkouts that already exist.
fn skip_reason(target: &LocalTarget) -> Option<String> {
    if !matches!(target.kind, ArtifactKind::ProjectSection(_)) {
        return None;
    }
    let checkout = target.path.parent().filter(|p| !p.as_os_str().is_empty())?;
    (!checkout.is_dir()).then(|| format!("checkout not found for {}", target.label))
}

/// Project and reconcile one local target. Errors become that target's outcome.
fn reconcile_target(
    manifest: &Manifest,
    projector: &Projector,
    target: &LocalTarget,
    dry_run: bool,
    projected: &mut usize,
) -> Outcome {
    if let Some(reason) = skip_reason(target) {
        tracing::info!("skipping {}: {reason}", target.kind);
        return Outcome::Skipped { reason };
    }

    match projector.project(manifest, &target.kind) {
        Ok(Artifact::Section { section, body }) => {
            *projected += 1;
            match local::reconcile_document(&target.path, &target.label, section, &body, dry_run) {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!("{}: {e}", target.label);
                    Outcome::Failed { cause: e.to_string() }
                }
            }
        }
        Ok(Artifact::Remote { .. }) => Outcome::ProjectionFailed {
            cause: "expected a document section".to_string(),
        },
        Err(e) => {
            tracing::warn!("{}: {e}", target.kind);
            Outcome::ProjectionFailed { cause: e.to_string() }
        }
    }
}

fn reconcile_local(
    manifest: &Manifest,
    config: &Config,
    projector: &Projector,
    opts: &RunOptions,
    report: &mut RunReport,
) {
    for target in local_targets(manifest, config, &opts.scope) {
        let outcome =
            reconcile_target(manifest, projector, &target, opts.dry_run, &mut report.projected);
        report.push(target.kind, target.label, outcome);
    }
}

fn reconcile_remote(
    manifest: &Manifest,
    config: &Config,
    projector: &Projector,
    remote: &Remote<'_>,
    opts: &RunOptions,
    report: &mut RunReport,
) {
    let mut tasks: Vec<RemoteTask> = Vec::new();

    for project in manifest.projects.iter().filter(|p| opts.scope.includes(&p.id)) {
        let Some(repo) = &project.repo else { continue };
        let kind = ArtifactKind::RemoteMetadata(project.id.clone());
        if !config.remote_enabled(&project.id) {
            report.push(kind, repo.0.clone(), Outcome::Skipped {
                reason: "remote sync disabled in config".to_string(),
            });
            continue;
        }
        match projector.project(manifest, &kind) {
            Ok(Artifact::Remote { repo, metadata }) => {
                report.projected += 1;
                tasks.push(RemoteTask {
                    project: project.id.clone(),
                    repo,
                    desired: metadata,
                });
            }
            Ok(Artifact::Section { .. }) => report.push(kind, repo.0.clone(), Outcome::ProjectionFailed {
                cause: "expected remote metadata".to_string(),
            }),
            Err(e) => report.push(kind, repo.0.clone(), Outcome::ProjectionFailed { cause: e.to_string() }),
        }
    }

    let outcomes = remote::reconcile_all(
        remote.client,
        remote.throttle,
        &tasks,
        opts.dry_run,
        remote.concurrency,
    );
    for (task, outcome) in tasks.into_iter().zip(outcomes) {
        report.push(ArtifactKind::RemoteMetadata(task.project), task.repo.0, outcome);
    }
}

/// Preview of the local pass: the same plan `run` would apply, as a
/// dry-run report. Each document carries its own outcome; unchanged
/// documents have no diff.
pub fn diff(
    manifest: &Manifest,
    config: &Config,
    projector: &Projector,
    scope: &Scope,
) -> Result<RunReport, SyncError> {
    check_scope(manifest, scope)?;
    let opts = RunOptions {
        local: true,
        remote: false,
        dry_run: true,
        scope: scope.clone(),
    };
    let mut report = RunReport {
        dry_run: true,
        ..RunReport::default()
    };
    reconcile_local(manifest, config, projector, &opts, &mut report);
    Ok(report)
}
