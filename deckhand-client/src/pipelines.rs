//! Pipeline-related API endpoints

use deckhand_core::domain::pipeline::PipelineDescriptor;
use deckhand_core::dto::execution::TriggerResponse;
use tracing::debug;

use crate::OrchestratorClient;
use crate::error::Result;

impl OrchestratorClient {
    // =============================================================================
    // Pipeline Management
    // =============================================================================

    /// List the pipelines of an application
    ///
    /// The listing is returned as the service sends it, duplicates included.
    ///
    /// # Arguments
    /// * `application_id` - The application identifier
    pub async fn list_pipelines(&self, application_id: &str) -> Result<Vec<PipelineDescriptor>> {
        let url = self.segments_url(&["applications", application_id, "pipelines"])?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Trigger a pipeline of an application
    ///
    /// # Arguments
    /// * `application_id` - The application identifier
    /// * `pipeline_name` - Name of the pipeline to run
    ///
    /// # Returns
    /// The trigger response, whose `ref` addresses the new execution
    pub async fn trigger_pipeline(
        &self,
        application_id: &str,
        pipeline_name: &str,
    ) -> Result<TriggerResponse> {
        let url = self.segments_url(&["pipelines", application_id, pipeline_name])?;
        debug!("POST {}", url);
        let response = self.client.post(url).send().await?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use crate::OrchestratorClient;
    use crate::test_server::serve_once;

    #[tokio::test]
    async fn test_list_pipelines_keeps_duplicates() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"[{"name":"dev","id":"1"},{"name":"dev","id":"2"},{"name":"prod","id":"3"}]"#,
        )
        .await;

        let client = OrchestratorClient::new(base_url);
        let pipelines = client.list_pipelines("shop").await.unwrap();

        assert_eq!(pipelines.len(), 3);
        assert_eq!(
            server.await.unwrap(),
            "GET /applications/shop/pipelines HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_trigger_pipeline() {
        let (base_url, server) = serve_once("202 Accepted", r#"{"ref":"/pipelines/01HXYZ"}"#).await;

        let client = OrchestratorClient::new(base_url);
        let response = client.trigger_pipeline("shop", "dev").await.unwrap();

        assert_eq!(response.handle().unwrap().as_str(), "/pipelines/01HXYZ");
        assert_eq!(server.await.unwrap(), "POST /pipelines/shop/dev HTTP/1.1");
    }

    #[tokio::test]
    async fn test_trigger_pipeline_rejected() {
        let (base_url, _server) = serve_once("400 Bad Request", "no such pipeline").await;

        let client = OrchestratorClient::new(base_url);
        let err = client.trigger_pipeline("shop", "nope").await.unwrap_err();

        assert!(err.is_client_error());
        assert!(err.to_string().contains("no such pipeline"));
    }
}
