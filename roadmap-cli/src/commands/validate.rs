//! `roadmap validate`: structural checks only.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use roadmap_core::validate::ValidationResult;

use super::{print_findings, GlobalArgs};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ValidationJson {
    valid: bool,
    projects: usize,
    milestones: usize,
    findings: Vec<FindingJson>,
}

#[derive(Serialize)]
struct FindingJson {
    severity: String,
    code: &'static str,
    location: String,
    message: String,
}

impl ValidateArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let ws = global.load()?;
        let result = ws.validate();
        let code = if result.is_fatal() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };

        if self.json {
            print_json(&result, ws.manifest.projects.len(), ws.manifest.milestones.len())?;
            return Ok(code);
        }

        print_findings(&result.findings);
        let errors = result.fatal().count();
        let warnings = result.warnings().count();
        if errors > 0 {
            println!(
                "{} {} ({errors} error(s), {warnings} warning(s))",
                "✗".red().bold(),
                ws.manifest_path.display()
            );
        } else {
            println!(
                "{} {}: {} projects, {} milestones, {warnings} warning(s)",
                "✓".green().bold(),
                ws.manifest_path.display(),
                ws.manifest.projects.len(),
                ws.manifest.milestones.len(),
            );
        }
        Ok(code)
    }
}

fn print_json(result: &ValidationResult, projects: usize, milestones: usize) -> Result<()> {
    let payload = ValidationJson {
        valid: !result.is_fatal(),
        projects,
        milestones,
        findings: result
            .findings
            .iter()
            .map(|f| FindingJson {
                severity: f.severity().to_string(),
                code: f.code.as_str(),
                location: f.location.clone(),
                message: f.message.clone(),
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize findings")?
    );
    Ok(())
}
