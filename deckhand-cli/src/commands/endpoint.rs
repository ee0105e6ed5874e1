//! Endpoint lookup command

use anyhow::Result;
use colored::*;
use deckhand_core::endpoint::resolve_endpoint;

/// Print the application URL a pipeline deploys to
pub fn show_endpoint(name: &str) -> Result<()> {
    match resolve_endpoint(name) {
        Some(url) => println!("{}", url),
        None => println!(
            "{}",
            format!("No endpoint known for pipeline {}.", name).yellow()
        ),
    }

    Ok(())
}
