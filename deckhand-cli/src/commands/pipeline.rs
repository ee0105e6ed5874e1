//! Pipeline command handlers
//!
//! Lists the pipelines of an application and triggers one, following the
//! execution until it reaches a terminal status.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use deckhand_controller::{Catalog, ControllerConfig, ExecutionController, TriggerOutcome};
use deckhand_core::domain::execution::ExecutionState;
use deckhand_core::endpoint::EndpointTable;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::Config;

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// List the pipelines of an application
    List {
        /// Application ID
        application: String,

        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Trigger a pipeline and follow it until it finishes
    Trigger {
        /// Application ID
        application: String,

        /// Pipeline name
        pipeline: String,

        /// Milliseconds between status reads
        #[arg(long, env = "DECKHAND_POLL_INTERVAL_MS", default_value = "5000")]
        interval_ms: u64,

        /// Give up after this many seconds without a terminal status (0 disables)
        #[arg(long, env = "DECKHAND_POLL_TIMEOUT_SECS")]
        timeout: Option<u64>,

        /// Failed status reads tolerated before giving up
        #[arg(long, env = "DECKHAND_POLL_RETRIES", default_value = "3")]
        retries: u32,

        /// Endpoint overrides as name=url pairs (e.g., staging=https://staging.example.com)
        #[arg(short, long, value_parser = parse_key_val)]
        endpoint: Vec<(String, String)>,
    },
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid NAME=url: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Builds the poll settings of a trigger from its flags
fn poll_config(
    orchestrator_url: &str,
    interval_ms: u64,
    timeout: Option<u64>,
    retries: u32,
) -> Result<ControllerConfig> {
    let mut config = ControllerConfig::new(orchestrator_url.to_string());
    config.poll_interval = Duration::from_millis(interval_ms);
    config.poll_timeout = timeout.filter(|secs| *secs > 0).map(Duration::from_secs);
    config.max_poll_retries = retries;
    config.validate()?;
    Ok(config)
}

/// Handle pipeline commands
///
/// Routes pipeline subcommands to their respective handlers.
pub async fn handle_pipeline_command(command: PipelineCommands, config: &Config) -> Result<()> {
    match command {
        PipelineCommands::List { application, json } => {
            list_pipelines(config, &application, json).await
        }
        PipelineCommands::Trigger {
            application,
            pipeline,
            interval_ms,
            timeout,
            retries,
            endpoint,
        } => {
            let controller_config =
                poll_config(&config.orchestrator_url, interval_ms, timeout, retries)?;

            let endpoints = endpoint
                .into_iter()
                .fold(EndpointTable::new(), |table, (name, url)| {
                    table.with_entry(name, url)
                });

            trigger_pipeline(config, controller_config, endpoints, &application, &pipeline).await
        }
    }
}

/// List the distinct pipelines of an application
///
/// An unreachable service is logged and shown as an empty listing.
async fn list_pipelines(config: &Config, application: &str, json: bool) -> Result<()> {
    let catalog = Catalog::new(config.client()?);
    let pipelines = catalog.pipelines_or_empty(application).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&pipelines)?);
        return Ok(());
    }

    if pipelines.is_empty() {
        println!(
            "{}",
            format!("No pipelines found for {}.", application).yellow()
        );
    } else {
        println!(
            "{}",
            format!("Found {} pipeline(s) for {}:", pipelines.len(), application).bold()
        );
        println!();
        for pipeline in pipelines {
            println!("  {} {}", "▸".cyan(), pipeline.name.bold());
        }
    }

    Ok(())
}

/// Trigger a pipeline and follow its execution
///
/// Ctrl-C resets the controller, which stops polling; the execution itself
/// keeps running on the service.
async fn trigger_pipeline(
    config: &Config,
    controller_config: ControllerConfig,
    endpoints: EndpointTable,
    application: &str,
    pipeline: &str,
) -> Result<()> {
    let client = config.client()?;

    let pipelines = Catalog::new(client.clone())
        .list_pipelines(application)
        .await
        .with_context(|| format!("Failed to fetch pipelines of {}", application))?;

    let controller = ExecutionController::new(client, controller_config).with_endpoints(endpoints);
    controller.set_pipelines(application, &pipelines);
    controller.select_pipeline(application, pipeline);

    let mut events = controller.subscribe();

    match controller.trigger(application, pipeline).await? {
        TriggerOutcome::Started(handle) => {
            info!("Triggered {} for {}: {}", pipeline, application, handle);
            println!("{}", "✓ Pipeline triggered".green().bold());
            println!("  Application: {}", application.cyan());
            println!("  Pipeline:    {}", pipeline.bold());
            println!("  Execution:   {}", handle.to_string().dimmed());
            println!();
        }
        TriggerOutcome::AlreadyActive | TriggerOutcome::Superseded => {
            anyhow::bail!("Pipeline {} was not triggered", pipeline);
        }
    }

    let final_state = tokio::select! {
        state = follow(&mut events) => state,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, resetting controller");
            controller.reset();
            println!();
            println!("{}", "Stopped following; the execution keeps running.".yellow());
            return Ok(());
        }
    };

    println!();
    match &final_state {
        ExecutionState::Succeeded { .. } => {
            println!("{}", "✓ Success".green().bold());
            if let Some(url) = controller.endpoint() {
                println!("  View application page: {}", url.cyan());
            }
            Ok(())
        }
        ExecutionState::Failed { reason, .. } => {
            println!("{} {}", "✗".red(), final_state.status_text().red());
            anyhow::bail!("Pipeline {} did not succeed: {}", pipeline, reason)
        }
        other => anyhow::bail!("Stopped following in state {}", other.label()),
    }
}

/// Prints status changes until the execution reaches a terminal state
async fn follow(events: &mut broadcast::Receiver<ExecutionState>) -> ExecutionState {
    let mut last_status: Option<String> = None;

    loop {
        let state = match events.recv().await {
            Ok(state) => state,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("Missed {} transition(s)", skipped);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return ExecutionState::Idle,
        };

        debug!("Execution state: {}", state.label());

        if let Some(status) = state.last_status() {
            if last_status.as_deref() != Some(status) {
                println!("  Status: {}", colorize_status(&state, status));
                last_status = Some(status.to_string());
            }
        }

        if state.is_terminal() || matches!(state, ExecutionState::Idle) {
            return state;
        }
    }
}

/// Colorize an execution status for display
fn colorize_status(state: &ExecutionState, status: &str) -> ColoredString {
    match state {
        ExecutionState::Succeeded { .. } => status.green(),
        ExecutionState::Failed { .. } => status.red(),
        _ => status.cyan(),
    }
}
