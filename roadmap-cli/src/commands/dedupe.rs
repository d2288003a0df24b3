//! `roadmap dedupe`: fold repeated milestones into their first occurrence.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use roadmap_core::dedupe::dedupe_milestones;
use roadmap_core::manifest;

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct DedupeArgs {
    /// List the merges without saving.
    #[arg(long)]
    pub dry_run: bool,
}

impl DedupeArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let mut ws = global.load()?;
        let merges = dedupe_milestones(&mut ws.manifest.milestones);

        if merges.is_empty() {
            println!("No duplicate milestones.");
            return Ok(ExitCode::SUCCESS);
        }

        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        for merge in &merges {
            let owner = merge
                .project
                .as_ref()
                .map_or_else(|| "(no project)".to_string(), |p| p.to_string());
            println!(
                "{prefix}{owner}: \"{}\" ({} duplicate(s) removed)",
                merge.title, merge.removed
            );
        }

        if !self.dry_run {
            manifest::save(&ws.manifest_path, &ws.manifest)
                .with_context(|| format!("failed to save {}", ws.manifest_path.display()))?;
            println!("{} saved {}", "✓".green().bold(), ws.manifest_path.display());
        }
        Ok(ExitCode::SUCCESS)
    }
}
