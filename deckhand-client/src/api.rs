//! Service seam used by the catalog and execution controller

use async_trait::async_trait;
use deckhand_core::domain::application::Application;
use deckhand_core::domain::execution::ExecutionHandle;
use deckhand_core::domain::pipeline::PipelineDescriptor;
use deckhand_core::dto::execution::{ExecutionStatusResponse, TriggerResponse};

use crate::OrchestratorClient;
use crate::error::Result;

/// Operations the orchestration service exposes to Deckhand
///
/// Implemented by [`OrchestratorClient`] over HTTP. Tests substitute
/// scripted implementations.
#[async_trait]
pub trait OrchestratorApi: Send + Sync {
    /// `GET /applications`
    async fn list_applications(&self) -> Result<Vec<Application>>;

    /// `GET /applications/{application_id}/pipelines`
    async fn list_pipelines(&self, application_id: &str) -> Result<Vec<PipelineDescriptor>>;

    /// `POST /pipelines/{application_id}/{pipeline_name}`
    async fn trigger_pipeline(
        &self,
        application_id: &str,
        pipeline_name: &str,
    ) -> Result<TriggerResponse>;

    /// `GET {host}{handle}`
    async fn execution_status(&self, handle: &ExecutionHandle) -> Result<ExecutionStatusResponse>;
}

#[async_trait]
impl OrchestratorApi for OrchestratorClient {
    async fn list_applications(&self) -> Result<Vec<Application>> {
        OrchestratorClient::list_applications(self).await
    }

    async fn list_pipelines(&self, application_id: &str) -> Result<Vec<PipelineDescriptor>> {
        OrchestratorClient::list_pipelines(self, application_id).await
    }

    async fn trigger_pipeline(
        &self,
        application_id: &str,
        pipeline_name: &str,
    ) -> Result<TriggerResponse> {
        OrchestratorClient::trigger_pipeline(self, application_id, pipeline_name).await
    }

    async fn execution_status(&self, handle: &ExecutionHandle) -> Result<ExecutionStatusResponse> {
        OrchestratorClient::execution_status(self, handle).await
    }
}
