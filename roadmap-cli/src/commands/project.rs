//! `roadmap project <overview|section <id>|remote <id>>`

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Subcommand;

use roadmap_core::ProjectId;
use roadmap_renderer::ArtifactKind;

use super::{require_valid, GlobalArgs};

/// Which artifact to print.
#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// The overview section of the top-level README.
    Overview,

    /// The roadmap section of one project's README.
    Section {
        /// Project identifier.
        id: String,
    },

    /// Description and topics published to one project's repository.
    Remote {
        /// Project identifier.
        id: String,
    },
}

impl ProjectCommand {
    fn kind(&self) -> ArtifactKind {
        match self {
            ProjectCommand::Overview => ArtifactKind::Overview,
            ProjectCommand::Section { id } => ArtifactKind::ProjectSection(ProjectId::from(id.as_str())),
            ProjectCommand::Remote { id } => ArtifactKind::RemoteMetadata(ProjectId::from(id.as_str())),
        }
    }
}

pub fn run(cmd: ProjectCommand, global: &GlobalArgs) -> Result<ExitCode> {
    let ws = global.load()?;
    if let Some(code) = require_valid(&ws) {
        return Ok(code);
    }

    let kind = cmd.kind();
    let artifact = ws
        .projector()?
        .project(&ws.manifest, &kind)
        .with_context(|| format!("failed to project {kind}"))?;
    print!("{}", artifact.to_text()?);
    Ok(ExitCode::SUCCESS)
}
