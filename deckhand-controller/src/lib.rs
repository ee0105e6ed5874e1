//! Deckhand Controller
//!
//! Catalog lookups and the trigger-and-poll execution controller.
//!
//! The presentation layer lists applications and pipelines through the
//! [`Catalog`], hands the pipeline set of the selected application to the
//! [`ExecutionController`] and then triggers one of them. From there the
//! controller owns every state transition until the execution succeeds,
//! fails, times out or is reset.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use deckhand_client::OrchestratorClient;
//! use deckhand_controller::{Catalog, ControllerConfig, ExecutionController};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ControllerConfig::new("http://localhost:8084".to_string());
//!     let api = Arc::new(OrchestratorClient::new(config.orchestrator_url.clone()));
//!
//!     let catalog = Catalog::new(api.clone());
//!     let pipelines = catalog.list_pipelines("shop").await?;
//!
//!     let controller = ExecutionController::new(api, config);
//!     controller.set_pipelines("shop", &pipelines);
//!     controller.trigger("shop", "dev").await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;

#[cfg(test)]
mod test_support;

pub use catalog::Catalog;
pub use config::ControllerConfig;
pub use controller::{ExecutionController, TriggerOutcome};
pub use error::{ControllerError, Result};
