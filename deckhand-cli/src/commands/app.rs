//! Application command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use deckhand_controller::Catalog;

use crate::config::Config;

/// Application subcommands
#[derive(Subcommand)]
pub enum AppCommands {
    /// List all applications
    List {
        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
}

/// Handle application commands
pub async fn handle_app_command(command: AppCommands, config: &Config) -> Result<()> {
    let catalog = Catalog::new(config.client()?);

    match command {
        AppCommands::List { json } => list_applications(&catalog, json).await,
    }
}

/// List all applications
///
/// An unreachable service is logged and shown as an empty listing.
async fn list_applications(catalog: &Catalog, json: bool) -> Result<()> {
    let applications = catalog.applications_or_empty().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&applications)?);
        return Ok(());
    }

    if applications.is_empty() {
        println!("{}", "No applications found.".yellow());
    } else {
        println!(
            "{}",
            format!("Found {} application(s):", applications.len()).bold()
        );
        println!();
        for app in applications {
            println!("  {} {}", "▸".cyan(), app.name.bold());
            println!("    ID: {}", app.id.dimmed());
        }
    }

    Ok(())
}
