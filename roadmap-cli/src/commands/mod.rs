//! Subcommands and the loading steps they share.

pub mod dedupe;
pub mod diff;
pub mod progress;
pub mod project;
pub mod reconcile;
pub mod validate;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use colored::Colorize;

use roadmap_core::validate::{validate as run_checks, Finding, ValidationResult};
use roadmap_core::{manifest, Config, Manifest};
use roadmap_renderer::Projector;

/// Flags accepted by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Path to the manifest.
    #[arg(long, global = true, default_value = manifest::MANIFEST_FILE)]
    pub manifest: PathBuf,

    /// Configuration file (default: roadmap.yaml next to the manifest).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API token for the hosting service. Falls back to the variable named by
    /// `remote.token_env` (GITHUB_TOKEN unless configured).
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// A loaded manifest with its resolved configuration.
pub struct Workspace {
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    pub config: Config,
}

impl GlobalArgs {
    pub fn load(&self) -> Result<Workspace> {
        let manifest = manifest::load(&self.manifest)
            .with_context(|| format!("failed to load manifest {}", self.manifest.display()))?;
        let config = Config::discover(&self.manifest, self.config.as_deref())
            .context("failed to load configuration")?;
        Ok(Workspace {
            manifest_path: self.manifest.clone(),
            manifest,
            config,
        })
    }

    pub fn token(&self, config: &Config) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(&config.remote.token_env).ok())
            .filter(|t| !t.trim().is_empty())
    }
}

impl Workspace {
    pub fn projector(&self) -> Result<Projector> {
        Projector::with_options(
            self.config.template_dir().as_deref(),
            self.config.progress_policy,
        )
        .context("failed to load templates")
    }

    pub fn validate(&self) -> ValidationResult {
        run_checks(&self.manifest, &self.config.known_categories)
    }
}

pub fn print_findings(findings: &[Finding]) {
    for finding in findings {
        let severity = if finding.is_fatal() {
            finding.severity().to_string().red().bold()
        } else {
            finding.severity().to_string().yellow().bold()
        };
        eprintln!(
            "{severity} [{}] {}: {}",
            finding.code,
            finding.location.bold(),
            finding.message
        );
    }
}

/// Print findings and refuse to continue when any is fatal.
pub fn require_valid(ws: &Workspace) -> Option<ExitCode> {
    let result = ws.validate();
    print_findings(&result.findings);
    if result.is_fatal() {
        eprintln!("{}", "manifest has errors; nothing projected".red());
        return Some(ExitCode::FAILURE);
    }
    None
}
