//! Configuration module
//!
//! Handles CLI configuration shared by every command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use deckhand_client::OrchestratorClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the orchestration service
    pub orchestrator_url: String,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl Config {
    /// Builds the HTTP client every command talks through
    pub fn client(&self) -> Result<Arc<OrchestratorClient>> {
        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Arc::new(OrchestratorClient::with_client(
            self.orchestrator_url.clone(),
            http,
        )))
    }
}
