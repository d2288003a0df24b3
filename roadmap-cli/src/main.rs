//! roadmap: keep READMEs and repository metadata in line with a manifest.
//!
//! # Usage
//!
//! ```text
//! roadmap validate
//! roadmap project overview | section <id> | remote <id>
//! roadmap reconcile [--local] [--remote] [--dry-run] [--project <id>]
//! roadmap diff [--project <id>]
//! roadmap progress [--write]
//! roadmap dedupe [--dry-run]
//! ```
//!
//! Global flags: `--manifest <path>`, `--config <path>`, `--token <token>`,
//! `-v`/`-vv`.

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    dedupe::DedupeArgs, diff::DiffArgs, progress::ProgressArgs, project::ProjectCommand,
    reconcile::ReconcileArgs, validate::ValidateArgs, GlobalArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "roadmap",
    version,
    about = "Project a roadmap manifest into READMEs and repository metadata",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the manifest and print every finding.
    Validate(ValidateArgs),

    /// Print one rendered artifact.
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    /// Validate, project, and bring local documents and remote metadata up to date.
    Reconcile(ReconcileArgs),

    /// Show unified diffs of what reconcile would write locally.
    Diff(DiffArgs),

    /// Compare stored and derived progress percentages.
    Progress(ProgressArgs),

    /// Merge milestones entered more than once for the same project.
    Dedupe(DedupeArgs),
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// stderr subscriber; `log` records from the library crates are bridged in.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match cli.command {
        Commands::Validate(args) => args.run(&cli.global),
        Commands::Project { command } => commands::project::run(command, &cli.global),
        Commands::Reconcile(args) => args.run(&cli.global),
        Commands::Diff(args) => args.run(&cli.global),
        Commands::Progress(args) => args.run(&cli.global),
        Commands::Dedupe(args) => args.run(&cli.global),
    }
}
