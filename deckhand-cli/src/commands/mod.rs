//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod app;
mod endpoint;
mod pipeline;

pub use app::AppCommands;
pub use pipeline::PipelineCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Application listing
    App {
        #[command(subcommand)]
        command: AppCommands,
    },
    /// Pipeline listing and triggering
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Show where a pipeline deploys its application
    Endpoint {
        /// Pipeline name (e.g. dev, uat, prod)
        name: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::App { command } => app::handle_app_command(command, config).await,
        Commands::Pipeline { command } => {
            pipeline::handle_pipeline_command(command, config).await
        }
        Commands::Endpoint { name } => endpoint::show_endpoint(&name),
    }
}
