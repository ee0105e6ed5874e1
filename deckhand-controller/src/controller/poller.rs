//! Status poll loop
//!
//! Samples the status of one execution until it reports a terminal status,
//! the retry budget for failed reads runs out, or the optional ceiling is
//! reached. The next read is scheduled only after the previous one has
//! resolved, so reads of one execution never overlap.

use std::sync::Arc;

use deckhand_client::OrchestratorApi;
use deckhand_core::domain::execution::{
    ExecutionHandle, ExecutionState, FailureReason, PollSample, Selection, StatusClass,
};
use tokio::time;
use tracing::{debug, info, warn};

use super::Shared;
use crate::config::ControllerConfig;
use crate::error::ControllerError;

/// How the loop ended
enum Finish {
    Succeeded(PollSample),
    Failed(FailureReason, Option<PollSample>),
    /// The lifecycle was reset while polling
    Superseded,
}

/// Poll task for one execution lifecycle
pub(super) struct PollLoop {
    pub(super) api: Arc<dyn OrchestratorApi>,
    pub(super) shared: Arc<Shared>,
    pub(super) config: ControllerConfig,
    pub(super) generation: u64,
    pub(super) selection: Selection,
    pub(super) handle: ExecutionHandle,
}

impl PollLoop {
    pub(super) async fn run(self) {
        debug!(
            "Polling {} every {:?}",
            self.handle, self.config.poll_interval
        );

        let finish = match self.config.poll_timeout {
            Some(ceiling) => match time::timeout(ceiling, self.poll_until_terminal()).await {
                Ok(finish) => finish,
                Err(_) => {
                    warn!(
                        "No terminal status for {} after {:?}, giving up",
                        self.selection, ceiling
                    );
                    Finish::Failed(FailureReason::TimedOut { after: ceiling }, self.last_sample())
                }
            },
            None => self.poll_until_terminal().await,
        };

        self.finish(finish);
    }

    async fn poll_until_terminal(&self) -> Finish {
        let mut failures: u32 = 0;
        let mut delay = self.config.poll_interval;
        let mut last_sample: Option<PollSample> = None;

        loop {
            time::sleep(delay).await;

            if !self.shared.is_current(self.generation) {
                return Finish::Superseded;
            }

            let response = self
                .api
                .execution_status(&self.handle)
                .await
                .map_err(ControllerError::PollTransport);

            match response {
                Ok(response) => {
                    failures = 0;
                    delay = self.config.poll_interval;

                    let sample = PollSample::new(response.status);
                    debug!("Pipeline status for {}: {}", self.selection, sample.status);

                    match sample.class() {
                        StatusClass::Succeeded => return Finish::Succeeded(sample),
                        StatusClass::Failed => {
                            let reason = FailureReason::Status(sample.status.clone());
                            return Finish::Failed(reason, Some(sample));
                        }
                        StatusClass::InProgress => {
                            if !self.record(sample.clone()) {
                                return Finish::Superseded;
                            }
                            last_sample = Some(sample);
                        }
                    }
                }
                Err(e) => {
                    failures += 1;
                    if failures > self.config.max_poll_retries {
                        warn!(
                            "Giving up on {} after {} failed status read(s): {}",
                            self.selection, failures, e
                        );
                        let reason = FailureReason::PollTransport {
                            attempts: failures,
                            message: e.to_string(),
                        };
                        return Finish::Failed(reason, last_sample);
                    }

                    delay = self.config.retry_delay(failures);
                    warn!(
                        "Error fetching pipeline status for {} (attempt {}/{}): {}; retrying in {:?}",
                        self.selection,
                        failures,
                        self.config.max_poll_retries.saturating_add(1),
                        e,
                        delay
                    );
                }
            }
        }
    }

    /// Publishes a non-terminal sample; false if the lifecycle is gone
    fn record(&self, sample: PollSample) -> bool {
        self.shared.apply_if_current(self.generation, |state| match state {
            ExecutionState::Running {
                selection, handle, ..
            } => Some(ExecutionState::Running {
                selection: selection.clone(),
                handle: handle.clone(),
                last_sample: Some(sample),
            }),
            _ => None,
        })
    }

    fn last_sample(&self) -> Option<PollSample> {
        match self.shared.state() {
            ExecutionState::Running { last_sample, .. } => last_sample,
            _ => None,
        }
    }

    fn finish(self, finish: Finish) {
        let next = match finish {
            Finish::Succeeded(sample) => {
                info!("Pipeline {} succeeded", self.selection);
                ExecutionState::Succeeded {
                    selection: self.selection,
                    handle: self.handle,
                    last_sample: sample,
                }
            }
            Finish::Failed(reason, last_sample) => {
                info!("Pipeline {} failed: {}", self.selection, reason);
                ExecutionState::Failed {
                    selection: self.selection,
                    handle: self.handle,
                    reason,
                    last_sample,
                }
            }
            Finish::Superseded => {
                debug!("Stopped polling {}: controller was reset", self.handle);
                return;
            }
        };

        let generation = self.generation;
        if !self.shared.apply_if_current(generation, |_| Some(next)) {
            debug!("Discarding stale poll result");
        }
    }
}
