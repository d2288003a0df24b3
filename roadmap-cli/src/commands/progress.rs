//! `roadmap progress`: stored vs derived percentages.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use roadmap_core::{manifest, progress, ProgressSummary};

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct ProgressArgs {
    /// Save the derived percentages into the manifest.
    #[arg(long)]
    pub write: bool,
}

#[derive(Tabled)]
struct ProgressRow {
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "stored")]
    stored: String,
    #[tabled(rename = "derived")]
    derived: String,
}

fn rows(stored: &ProgressSummary, derived: &ProgressSummary) -> Vec<ProgressRow> {
    let cell = |v: Option<f64>| v.map_or_else(|| "—".to_string(), |p| format!("{p:.0}%"));
    let mut categories: Vec<&str> = stored.iter().map(|(c, _)| c).collect();
    for (category, _) in derived.iter() {
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    categories
        .into_iter()
        .map(|category| {
            let s = stored.get(category);
            let d = derived.get(category);
            let derived = if s != d {
                cell(d).yellow().to_string()
            } else {
                cell(d)
            };
            ProgressRow {
                category: category.to_string(),
                stored: cell(s),
                derived,
            }
        })
        .collect()
}

impl ProgressArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let mut ws = global.load()?;
        let derived = progress::derive(&ws.manifest);

        let mut table = Table::new(rows(&ws.manifest.progress, &derived));
        table.with(Style::rounded());
        println!("{table}");

        if !self.write {
            return Ok(ExitCode::SUCCESS);
        }
        if derived == ws.manifest.progress {
            println!("Progress already matches milestones.");
            return Ok(ExitCode::SUCCESS);
        }

        ws.manifest.progress = derived;
        manifest::save(&ws.manifest_path, &ws.manifest)
            .with_context(|| format!("failed to save {}", ws.manifest_path.display()))?;
        println!("{} saved derived progress to {}", "✓".green().bold(), ws.manifest_path.display());
        Ok(ExitCode::SUCCESS)
    }
}
