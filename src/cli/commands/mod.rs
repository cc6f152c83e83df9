//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod clean;
pub mod doctor;
pub mod install;

use anyhow::Result;
use clap::Subcommand;

use crate::cli::RunContext;

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Build the wheel and install it with pip (default)
    Install,

    /// Build the wheel without installing it
    Build,

    /// Remove previously built wheels
    Clean,

    /// Check the toolchain and interpreter
    Doctor,
}

impl Commands {
    /// Execute the command
    pub async fn run(self, ctx: &RunContext) -> Result<()> {
        match self {
            Self::Install => install::execute(ctx).await,
            Self::Build => build::execute(ctx).await,
            Self::Clean => clean::execute(ctx).await,
            Self::Doctor => doctor::execute(ctx).await,
        }
    }
}
