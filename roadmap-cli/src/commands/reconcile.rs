//! `roadmap reconcile`: the full validate → project → reconcile run.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use roadmap_core::ProjectId;
use roadmap_sync::pipeline::{self, Remote, RunOptions, Scope};
use roadmap_sync::{GithubClient, Outcome, RunReport, Throttle};

use super::{print_findings, GlobalArgs};

/// Arguments for `roadmap reconcile`. Without `--local`/`--remote` both run.
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Reconcile README documents.
    #[arg(long)]
    pub local: bool,

    /// Reconcile repository description and topics.
    #[arg(long)]
    pub remote: bool,

    /// Report what would change without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Limit the run to one project (the overview is skipped).
    #[arg(long, value_name = "ID")]
    pub project: Option<String>,
}

impl ReconcileArgs {
    fn options(&self) -> RunOptions {
        let both = !self.local && !self.remote;
        RunOptions {
            local: self.local || both,
            remote: self.remote || both,
            dry_run: self.dry_run,
            scope: match &self.project {
                Some(id) => Scope::Project(ProjectId::from(id.as_str())),
                None => Scope::All,
            },
        }
    }

    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let ws = global.load()?;
        let projector = ws.projector()?;
        let opts = self.options();

        let remote_cfg = &ws.config.remote;
        let token = global.token(&ws.config);
        if opts.remote && token.is_none() && !opts.dry_run {
            tracing::warn!(
                "no token (--token or {}); repository updates will be rejected",
                remote_cfg.token_env
            );
        }
        let client = GithubClient::new(
            &remote_cfg.api_base,
            token,
            Duration::from_secs(remote_cfg.timeout_secs),
        );
        let throttle = Throttle::new(remote_cfg.requests_per_second, remote_cfg.max_retries);
        let remote = opts.remote.then(|| Remote {
            client: &client,
            throttle: &throttle,
            concurrency: remote_cfg.concurrency,
        });

        let report = pipeline::run(&ws.manifest, &ws.config, &projector, remote, &opts)
            .context("reconcile failed")?;
        print_report(&report);

        Ok(if report.has_failures() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }
}

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "artifact")]
    artifact: String,
    #[tabled(rename = "target")]
    target: String,
    #[tabled(rename = "outcome")]
    outcome: String,
}

pub fn print_report(report: &RunReport) {
    print_findings(&report.findings);
    if report.is_blocked() {
        println!(
            "{} manifest has errors; nothing projected",
            "✗".red().bold()
        );
        println!("{}", report.counts());
        return;
    }

    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    if report.dry_run {
        for resource in &report.resources {
            if let Some(diff) = resource.outcome.diff() {
                println!("{} {}", "~".yellow(), resource.target.bold());
                print!("{diff}");
                if !diff.ends_with('\n') {
                    println!();
                }
            }
        }
    }

    if !report.resources.is_empty() {
        let rows: Vec<ResourceRow> = report
            .resources
            .iter()
            .map(|r| ResourceRow {
                artifact: r.artifact.to_string(),
                target: r.target.clone(),
                outcome: outcome_cell(&r.outcome),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    let mark = if report.has_failures() {
        "✗".red().bold()
    } else {
        "✓".green().bold()
    };
    println!("{prefix}{mark} {}", report.counts());
}

fn outcome_cell(outcome: &Outcome) -> String {
    let text = outcome.to_string();
    match outcome {
        Outcome::Created | Outcome::Updated { .. } => text.green().to_string(),
        Outcome::WouldCreate { .. } | Outcome::WouldUpdate { .. } => text.yellow().to_string(),
        Outcome::Unchanged | Outcome::Skipped { .. } => text.bright_black().to_string(),
        Outcome::ProjectionFailed { .. } | Outcome::Failed { .. } => text.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(local: bool, remote: bool) -> ReconcileArgs {
        ReconcileArgs {
            local,
            remote,
            dry_run: false,
            project: None,
        }
    }

    #[test]
    fn no_target_flags_means_both() {
        let opts = args(false, false).options();
        assert!(opts.local && opts.remote);
        let opts = args(true, false).options();
        assert!(opts.local && !opts.remote);
        let opts = args(false, true).options();
        assert!(!opts.local && opts.remote);
    }

    #[test]
    fn project_flag_narrows_scope() {
        let mut a = args(true, false);
        a.project = Some("api".into());
        assert_eq!(a.options().scope, Scope::Project(ProjectId::from("api")));
    }
}
