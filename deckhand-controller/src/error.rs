//! Error types for the catalog and execution controller

use deckhand_client::ClientError;
use thiserror::Error;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, ControllerError>;

/// Errors surfaced to the presentation layer
///
/// None of these are fatal: the catalog and controller stay usable after
/// returning any of them.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Listing applications or pipelines failed
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(#[source] ClientError),

    /// Trigger requested for a missing or unknown application/pipeline
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// The trigger request failed or returned no execution reference
    #[error("trigger failed: {0}")]
    TriggerFailed(String),

    /// A status read of a running execution failed
    #[error("status poll failed: {0}")]
    PollTransport(#[source] ClientError),
}

impl ControllerError {
    pub(crate) fn invalid_selection(message: impl Into<String>) -> Self {
        Self::InvalidSelection(message.into())
    }
}
