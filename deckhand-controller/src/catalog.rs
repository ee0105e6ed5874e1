//! Catalog client
//!
//! Read-only lookups of applications and their pipelines. Nothing is cached
//! beyond what the caller keeps for the current selection.

use std::sync::Arc;

use deckhand_client::OrchestratorApi;
use deckhand_core::domain::application::Application;
use deckhand_core::domain::pipeline::{PipelineDescriptor, dedup_by_name};
use tracing::{debug, warn};

use crate::error::{ControllerError, Result};

/// Lists applications and pipelines from the orchestration service
#[derive(Clone)]
pub struct Catalog {
    api: Arc<dyn OrchestratorApi>,
}

impl Catalog {
    pub fn new(api: Arc<dyn OrchestratorApi>) -> Self {
        Self { api }
    }

    /// Fetches every application
    pub async fn list_applications(&self) -> Result<Vec<Application>> {
        let applications = self
            .api
            .list_applications()
            .await
            .map_err(ControllerError::CatalogUnavailable)?;

        debug!("Fetched {} application(s)", applications.len());
        Ok(applications)
    }

    /// Fetches every application, degrading to an empty list on failure
    pub async fn applications_or_empty(&self) -> Vec<Application> {
        self.list_applications().await.unwrap_or_else(|e| {
            warn!("Error fetching application list: {}", e);
            Vec::new()
        })
    }

    /// Fetches the distinct pipelines of an application
    ///
    /// Pipelines sharing a name are collapsed to their first occurrence.
    ///
    /// # Arguments
    /// * `application_id` - Non-empty application identifier
    pub async fn list_pipelines(&self, application_id: &str) -> Result<Vec<PipelineDescriptor>> {
        if application_id.trim().is_empty() {
            return Err(ControllerError::invalid_selection("no application selected"));
        }

        let listed = self
            .api
            .list_pipelines(application_id)
            .await
            .map_err(ControllerError::CatalogUnavailable)?;

        let listed_count = listed.len();
        let pipelines = dedup_by_name(listed);
        debug!(
            "Fetched {} pipeline(s) for {} ({} distinct)",
            listed_count,
            application_id,
            pipelines.len()
        );

        Ok(pipelines)
    }

    /// Fetches the distinct pipelines of an application, degrading to an
    /// empty list on failure
    pub async fn pipelines_or_empty(&self, application_id: &str) -> Vec<PipelineDescriptor> {
        self.list_pipelines(application_id)
            .await
            .unwrap_or_else(|e| {
                warn!("Error fetching pipelines for {}: {}", application_id, e);
                Vec::new()
            })
    }
}
