//! Deckhand CLI
//!
//! Command-line front end for listing applications and pipelines and for
//! triggering a pipeline and following its execution to the end.

mod commands;
mod config;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "deckhand")]
#[command(about = "Trigger and follow deployment pipelines", long_about = None)]
struct Cli {
    /// Orchestration service URL
    #[arg(
        long,
        global = true,
        env = "DECKHAND_ORCHESTRATOR_URL",
        default_value = "http://localhost:8084"
    )]
    orchestrator_url: String,

    /// Per-request HTTP timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    request_timeout: u64,

    /// Log controller and client activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Log filter used when `RUST_LOG` is unset
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "deckhand=debug,deckhand_controller=debug,deckhand_client=debug"
    } else {
        "deckhand=info,deckhand_controller=info,deckhand_client=info"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config {
        orchestrator_url: cli.orchestrator_url,
        request_timeout: Duration::from_secs(cli.request_timeout),
    };

    handle_command(cli.command, &config).await
}
