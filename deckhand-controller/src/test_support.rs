//! Scripted orchestration service for tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use deckhand_client::{ClientError, OrchestratorApi};
use deckhand_core::domain::application::Application;
use deckhand_core::domain::execution::ExecutionHandle;
use deckhand_core::domain::pipeline::PipelineDescriptor;
use deckhand_core::dto::execution::{ExecutionStatusResponse, TriggerResponse};

/// Status reported once the scripted statuses run out
const IDLE_STATUS: &str = "RUNNING";

/// In-memory [`OrchestratorApi`] replaying canned responses
///
/// Trigger responses default to fresh `/pipelines/exec-N` references and
/// status reads default to `RUNNING` once the script is exhausted.
#[derive(Default)]
pub struct ScriptedApi {
    applications: Vec<Application>,
    pipelines: Vec<PipelineDescriptor>,
    catalog_down: bool,
    triggers: Mutex<VecDeque<Result<TriggerResponse, ClientError>>>,
    statuses: Mutex<VecDeque<Result<String, ClientError>>>,
    trigger_delay: Option<Duration>,
    status_delay: Option<Duration>,
    trigger_calls: AtomicUsize,
    status_calls: AtomicUsize,
    pipeline_list_calls: AtomicUsize,
    polled_handles: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_applications(mut self, apps: &[(&str, &str)]) -> Self {
        self.applications = apps
            .iter()
            .map(|(id, name)| Application {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn with_pipelines(mut self, names: &[&str]) -> Self {
        self.pipelines = names.iter().map(|n| PipelineDescriptor::new(*n)).collect();
        self
    }

    pub fn failing_catalog(mut self) -> Self {
        self.catalog_down = true;
        self
    }

    pub fn with_trigger(self, response: Result<TriggerResponse, ClientError>) -> Self {
        self.triggers.lock().unwrap().push_back(response);
        self
    }

    pub fn with_trigger_ref(self, reference: &str) -> Self {
        self.with_trigger(Ok(TriggerResponse {
            reference: Some(reference.to_string()),
        }))
    }

    pub fn with_statuses(self, statuses: &[&str]) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .extend(statuses.iter().map(|s| Ok(s.to_string())));
        self
    }

    pub fn with_status_error(self) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .push_back(Err(ClientError::api_error(503, "service unavailable")));
        self
    }

    pub fn with_trigger_delay(mut self, delay: Duration) -> Self {
        self.trigger_delay = Some(delay);
        self
    }

    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = Some(delay);
        self
    }

    pub fn trigger_calls(&self) -> usize {
        self.trigger_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn pipeline_list_calls(&self) -> usize {
        self.pipeline_list_calls.load(Ordering::SeqCst)
    }

    pub fn polled_handles(&self) -> Vec<String> {
        self.polled_handles.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrchestratorApi for ScriptedApi {
    async fn list_applications(&self) -> Result<Vec<Application>, ClientError> {
        if self.catalog_down {
            return Err(ClientError::api_error(502, "bad gateway"));
        }
        Ok(self.applications.clone())
    }

    async fn list_pipelines(
        &self,
        _application_id: &str,
    ) -> Result<Vec<PipelineDescriptor>, ClientError> {
        self.pipeline_list_calls.fetch_add(1, Ordering::SeqCst);
        if self.catalog_down {
            return Err(ClientError::ParseError("expected a JSON array".to_string()));
        }
        Ok(self.pipelines.clone())
    }

    async fn trigger_pipeline(
        &self,
        _application_id: &str,
        _pipeline_name: &str,
    ) -> Result<TriggerResponse, ClientError> {
        let call = self.trigger_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.trigger_delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.triggers.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(TriggerResponse {
                reference: Some(format!("/pipelines/exec-{}", call)),
            })
        })
    }

    async fn execution_status(
        &self,
        handle: &ExecutionHandle,
    ) -> Result<ExecutionStatusResponse, ClientError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.polled_handles
            .lock()
            .unwrap()
            .push(handle.as_str().to_string());
        if let Some(delay) = self.status_delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.statuses.lock().unwrap().pop_front();
        scripted
            .unwrap_or_else(|| Ok(IDLE_STATUS.to_string()))
            .map(|status| ExecutionStatusResponse { status })
    }
}
