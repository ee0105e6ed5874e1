//! Application-related API endpoints

use deckhand_core::domain::application::Application;
use tracing::debug;

use crate::OrchestratorClient;
use crate::error::Result;

impl OrchestratorClient {
    // =============================================================================
    // Applications
    // =============================================================================

    /// List all applications
    ///
    /// # Returns
    /// Every application known to the service, in service order
    pub async fn list_applications(&self) -> Result<Vec<Application>> {
        let url = self.segments_url(&["applications"])?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }
}
