//! Execution controller
//!
//! Owns the lifecycle of one pipeline execution at a time:
//!
//! ```text
//! Idle -> Triggering -> Running -> Succeeded | Failed
//!           |             |
//!           +-> Idle      +-> Idle (reset / selection change)
//! ```
//!
//! Each lifecycle gets a generation number. The in-flight trigger request
//! and the poll task only write state while their generation is current,
//! so completions arriving after a reset are dropped.

mod poller;

use std::sync::{Arc, Mutex};

use deckhand_client::OrchestratorApi;
use deckhand_core::domain::execution::{ExecutionHandle, ExecutionState, Selection};
use deckhand_core::domain::pipeline::{PipelineDescriptor, dedup_by_name};
use deckhand_core::endpoint::EndpointTable;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::ControllerConfig;
use crate::error::{ControllerError, Result};
use poller::PollLoop;

/// Transitions buffered per subscriber before it starts lagging
const EVENT_CAPACITY: usize = 64;

/// What a call to [`ExecutionController::trigger`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The pipeline was triggered and polling started
    Started(ExecutionHandle),
    /// Another lifecycle is still triggering or running; nothing was sent
    AlreadyActive,
    /// The controller was reset while the trigger request was in flight
    Superseded,
}

/// Pipelines loaded for the current application
#[derive(Debug, Clone)]
struct PipelineSet {
    application_id: String,
    names: Vec<String>,
}

impl PipelineSet {
    fn contains(&self, pipeline_name: &str) -> bool {
        self.names.iter().any(|n| n == pipeline_name)
    }
}

struct Inner {
    state: ExecutionState,
    generation: u64,
    pipelines: Option<PipelineSet>,
    poll_task: Option<JoinHandle<()>>,
}

impl Inner {
    fn abort_poll_task(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }
}

/// State shared between the controller and its poll task
pub(crate) struct Shared {
    inner: Mutex<Inner>,
    events: broadcast::Sender<ExecutionState>,
}

impl Shared {
    /// Replaces the current state and publishes it
    fn transition(&self, inner: &mut Inner, next: ExecutionState) {
        debug!("{} -> {}", inner.state.label(), next.label());
        inner.state = next.clone();
        // No subscribers is fine
        let _ = self.events.send(next);
    }

    /// Applies `update` only if `generation` is still the current lifecycle
    ///
    /// Returns false when the lifecycle was superseded and nothing changed.
    pub(crate) fn apply_if_current(
        &self,
        generation: u64,
        update: impl FnOnce(&ExecutionState) -> Option<ExecutionState>,
    ) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.generation != generation {
            return false;
        }
        if let Some(next) = update(&inner.state) {
            if next.is_terminal() {
                inner.poll_task = None;
            }
            self.transition(&mut inner, next);
        }
        true
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.inner.lock().unwrap().generation == generation
    }

    pub(crate) fn state(&self) -> ExecutionState {
        self.inner.lock().unwrap().state.clone()
    }
}

/// Drives one pipeline execution from trigger to terminal status
pub struct ExecutionController {
    api: Arc<dyn OrchestratorApi>,
    config: ControllerConfig,
    endpoints: EndpointTable,
    shared: Arc<Shared>,
}

impl ExecutionController {
    /// Creates an idle controller
    pub fn new(api: Arc<dyn OrchestratorApi>, config: ControllerConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            config,
            endpoints: EndpointTable::default(),
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: ExecutionState::Idle,
                    generation: 0,
                    pipelines: None,
                    poll_task: None,
                }),
                events,
            }),
        }
    }

    /// Uses a custom endpoint table for [`ExecutionController::endpoint`]
    pub fn with_endpoints(mut self, endpoints: EndpointTable) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ExecutionState {
        self.shared.state()
    }

    /// Receives every state the controller transitions into from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionState> {
        self.shared.events.subscribe()
    }

    /// Records the pipelines fetched for an application
    ///
    /// Triggers are validated against the last recorded set. Switching to a
    /// different application resets any lifecycle of the previous one.
    pub fn set_pipelines(&self, application_id: &str, pipelines: &[PipelineDescriptor]) {
        let mut inner = self.shared.inner.lock().unwrap();

        let switched = inner
            .state
            .selection()
            .is_some_and(|s| s.application_id != application_id);
        if switched {
            info!("Application changed to {}, resetting controller", application_id);
            self.reset_locked(&mut inner);
        }

        let names = dedup_by_name(pipelines.to_vec())
            .into_iter()
            .map(|p| p.name)
            .collect();
        inner.pipelines = Some(PipelineSet {
            application_id: application_id.to_string(),
            names,
        });
    }

    /// Notes the pipeline the operator currently has selected
    ///
    /// Selecting anything other than the selection of the current lifecycle
    /// stops polling and returns the controller to `Idle`.
    pub fn select_pipeline(&self, application_id: &str, pipeline_name: &str) {
        let selection = Selection::new(application_id, pipeline_name);
        let mut inner = self.shared.inner.lock().unwrap();

        let changed = inner.state.selection().is_some_and(|s| *s != selection);
        if changed {
            info!("Selection changed to {}, resetting controller", selection);
            self.reset_locked(&mut inner);
        }
    }

    /// Stops any polling, discards the handle and returns to `Idle`
    pub fn reset(&self) {
        let mut inner = self.shared.inner.lock().unwrap();
        self.reset_locked(&mut inner);
    }

    fn reset_locked(&self, inner: &mut Inner) {
        inner.abort_poll_task();
        inner.generation += 1;
        if !matches!(inner.state, ExecutionState::Idle) {
            self.shared.transition(inner, ExecutionState::Idle);
        }
    }

    /// Triggers a pipeline and starts polling its execution
    ///
    /// Ignored while another lifecycle is triggering or running. The
    /// selection must belong to the last set passed to
    /// [`ExecutionController::set_pipelines`]; otherwise nothing is sent.
    pub async fn trigger(&self, application_id: &str, pipeline_name: &str) -> Result<TriggerOutcome> {
        let selection = Selection::new(application_id, pipeline_name);

        let generation = {
            let mut inner = self.shared.inner.lock().unwrap();

            if inner.state.is_active() {
                warn!(
                    "Ignoring trigger of {}: {} is still {}",
                    selection,
                    inner
                        .state
                        .selection()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    inner.state.label()
                );
                return Ok(TriggerOutcome::AlreadyActive);
            }

            validate_selection(inner.pipelines.as_ref(), &selection)?;

            inner.abort_poll_task();
            inner.generation += 1;
            self.shared.transition(
                &mut inner,
                ExecutionState::Triggering {
                    selection: selection.clone(),
                },
            );
            inner.generation
        };

        info!("Triggering pipeline {}", selection);
        let result = self.api.trigger_pipeline(application_id, pipeline_name).await;

        let mut inner = self.shared.inner.lock().unwrap();
        if inner.generation != generation {
            debug!("Discarding trigger response for {}: controller was reset", selection);
            return Ok(TriggerOutcome::Superseded);
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!("Error triggering pipeline {}: {}", selection, e);
                self.shared.transition(&mut inner, ExecutionState::Idle);
                return Err(ControllerError::TriggerFailed(e.to_string()));
            }
        };

        let Some(handle) = response.handle() else {
            error!("Trigger response for {} carried no execution reference", selection);
            self.shared.transition(&mut inner, ExecutionState::Idle);
            return Err(ControllerError::TriggerFailed(
                "response carried no execution reference".to_string(),
            ));
        };

        info!("Pipeline {} triggered, execution {}", selection, handle);
        self.shared.transition(
            &mut inner,
            ExecutionState::Running {
                selection: selection.clone(),
                handle: handle.clone(),
                last_sample: None,
            },
        );

        let poll = PollLoop {
            api: Arc::clone(&self.api),
            shared: Arc::clone(&self.shared),
            config: self.config.clone(),
            generation,
            selection,
            handle: handle.clone(),
        };
        inner.poll_task = Some(tokio::spawn(poll.run()));

        Ok(TriggerOutcome::Started(handle))
    }

    /// URL of the deployed application, once the execution succeeded
    pub fn endpoint(&self) -> Option<String> {
        match self.state() {
            ExecutionState::Succeeded { selection, .. } => self
                .endpoints
                .resolve(&selection.pipeline_name)
                .map(ToString::to_string),
            _ => None,
        }
    }
}

impl Drop for ExecutionController {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.shared.inner.lock() {
            inner.abort_poll_task();
            inner.generation += 1;
        }
    }
}

fn validate_selection(pipelines: Option<&PipelineSet>, selection: &Selection) -> Result<()> {
    if selection.application_id.trim().is_empty() {
        return Err(ControllerError::invalid_selection("no application selected"));
    }

    if selection.pipeline_name.trim().is_empty() {
        return Err(ControllerError::invalid_selection("no pipeline selected"));
    }

    let pipelines = pipelines
        .filter(|set| set.application_id == selection.application_id)
        .ok_or_else(|| {
            ControllerError::invalid_selection(format!(
                "pipelines of {} have not been loaded",
                selection.application_id
            ))
        })?;

    if !pipelines.contains(&selection.pipeline_name) {
        return Err(ControllerError::invalid_selection(format!(
            "pipeline {} not found for {}",
            selection.pipeline_name, selection.application_id
        )));
    }

    Ok(())
}
