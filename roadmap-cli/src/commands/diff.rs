//! `roadmap diff`: unified diffs for what reconcile would write locally.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use roadmap_core::ProjectId;
use roadmap_sync::pipeline::{self, Scope};
use roadmap_sync::Outcome;

use super::{require_valid, GlobalArgs};

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Only this project's README.
    #[arg(long, value_name = "ID")]
    pub project: Option<String>,
}

impl DiffArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let ws = global.load()?;
        if let Some(code) = require_valid(&ws) {
            return Ok(code);
        }

        let scope = match self.project {
            Some(id) => Scope::Project(ProjectId::from(id)),
            None => Scope::All,
        };
        let preview = pipeline::diff(&ws.manifest, &ws.config, &ws.projector()?, &scope)
            .context("diff failed")?;

        let mut changed = 0;
        for resource in &preview.resources {
            match &resource.outcome {
                Outcome::Skipped { reason } => {
                    eprintln!("{} {}: {reason}", "skipped".bright_black(), resource.target);
                }
                failure if failure.is_failure() => {
                    eprintln!("{} {}: {failure}", "✗".red().bold(), resource.target);
                }
                outcome => {
                    if let Some(diff) = outcome.diff() {
                        changed += 1;
                        print!("{diff}");
                        if !diff.ends_with('\n') {
                            println!();
                        }
                    }
                }
            }
        }

        if changed == 0 {
            println!("No differences.");
        }
        Ok(if preview.has_failures() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }
}
