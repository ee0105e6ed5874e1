//! Execution status endpoint

use deckhand_core::domain::execution::ExecutionHandle;
use deckhand_core::dto::execution::ExecutionStatusResponse;
use tracing::debug;

use crate::OrchestratorClient;
use crate::error::Result;

impl OrchestratorClient {
    // =============================================================================
    // Execution Status
    // =============================================================================

    /// Read the current status of an execution
    ///
    /// The handle is appended to the base URL as-is; it already is the full
    /// path of the execution resource.
    ///
    /// # Arguments
    /// * `handle` - The handle returned by [`OrchestratorClient::trigger_pipeline`]
    pub async fn execution_status(
        &self,
        handle: &ExecutionHandle,
    ) -> Result<ExecutionStatusResponse> {
        let url = self.fragment_url(handle.as_str())?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use deckhand_core::domain::execution::ExecutionHandle;

    use crate::OrchestratorClient;
    use crate::test_server::serve_once;

    #[tokio::test]
    async fn test_execution_status_uses_handle_path() {
        let (base_url, server) =
            serve_once("200 OK", r#"{"status":"RUNNING","name":"dev"}"#).await;

        let client = OrchestratorClient::new(base_url);
        let handle = ExecutionHandle::new("/pipelines/01HXYZ").unwrap();
        let status = client.execution_status(&handle).await.unwrap();

        assert_eq!(status.status, "RUNNING");
        assert_eq!(server.await.unwrap(), "GET /pipelines/01HXYZ HTTP/1.1");
    }

    #[tokio::test]
    async fn test_execution_status_not_found() {
        let (base_url, _server) = serve_once("404 Not Found", "").await;

        let client = OrchestratorClient::new(base_url);
        let handle = ExecutionHandle::new("/pipelines/gone").unwrap();
        let err = client.execution_status(&handle).await.unwrap_err();

        assert!(err.is_not_found());
    }
}
