//! Execution domain types
//!
//! An execution is one run of a triggered pipeline. It is addressed by the
//! opaque [`ExecutionHandle`] the orchestration service returns from the
//! trigger call, and observed through [`PollSample`]s until its
//! [`ExecutionState`] becomes terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Status literal reported for a successful execution
pub const SUCCEEDED_STATUS: &str = "SUCCEEDED";

/// Status literals reported for executions that ended without success
pub const FAILED_STATUSES: [&str; 3] = ["FAILED", "CANCELED", "TERMINAL"];

/// Opaque reference to one execution, as returned by the trigger call
///
/// The value is a path fragment that is appended verbatim to the service
/// host when polling. It is never parsed or rebuilt from trigger inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionHandle(String);

impl ExecutionHandle {
    /// Wraps a handle value, rejecting empty or blank references
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The application and pipeline an execution lifecycle belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub application_id: String,
    pub pipeline_name: String,
}

impl Selection {
    pub fn new(application_id: impl Into<String>, pipeline_name: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            pipeline_name: pipeline_name.into(),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.application_id, self.pipeline_name)
    }
}

/// One observed status of a running execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSample {
    pub status: String,
    pub observed_at: DateTime<Utc>,
}

impl PollSample {
    /// Creates a sample observed now
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            observed_at: Utc::now(),
        }
    }

    pub fn class(&self) -> StatusClass {
        StatusClass::classify(&self.status)
    }
}

/// Classification of a status literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Succeeded,
    Failed,
    InProgress,
}

impl StatusClass {
    /// Classifies a status literal reported by the orchestration service
    ///
    /// Matching is exact. Anything outside the success and failure literals
    /// (`RUNNING`, `PENDING`, `NOT_STARTED`, lowercase variants, ...) is
    /// treated as still in progress.
    pub fn classify(status: &str) -> Self {
        if status == SUCCEEDED_STATUS {
            StatusClass::Succeeded
        } else if FAILED_STATUSES.contains(&status) {
            StatusClass::Failed
        } else {
            StatusClass::InProgress
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, StatusClass::InProgress)
    }
}

/// Why an execution lifecycle ended in [`ExecutionState::Failed`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The service reported a terminal failure status
    Status(String),
    /// Status reads kept failing until the retry budget ran out
    PollTransport { attempts: u32, message: String },
    /// No terminal status was observed before the polling ceiling
    TimedOut { after: Duration },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Status(status) => write!(f, "execution ended with status {}", status),
            FailureReason::PollTransport { attempts, message } => write!(
                f,
                "status polling failed after {} attempt(s): {}",
                attempts, message
            ),
            FailureReason::TimedOut { after } => {
                write!(f, "no terminal status after {}s", after.as_secs())
            }
        }
    }
}

/// Observable state of the execution controller
///
/// Exactly one variant is current per controller. Every non-idle variant
/// carries the selection it belongs to, so a stale lifecycle can never be
/// confused with the current one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExecutionState {
    #[default]
    Idle,
    Triggering {
        selection: Selection,
    },
    Running {
        selection: Selection,
        handle: ExecutionHandle,
        last_sample: Option<PollSample>,
    },
    Succeeded {
        selection: Selection,
        handle: ExecutionHandle,
        last_sample: PollSample,
    },
    Failed {
        selection: Selection,
        handle: ExecutionHandle,
        reason: FailureReason,
        last_sample: Option<PollSample>,
    },
}

impl ExecutionState {
    /// True while a trigger request or poll loop is in flight
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ExecutionState::Triggering { .. } | ExecutionState::Running { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionState::Succeeded { .. } | ExecutionState::Failed { .. }
        )
    }

    pub fn selection(&self) -> Option<&Selection> {
        match self {
            ExecutionState::Idle => None,
            ExecutionState::Triggering { selection }
            | ExecutionState::Running { selection, .. }
            | ExecutionState::Succeeded { selection, .. }
            | ExecutionState::Failed { selection, .. } => Some(selection),
        }
    }

    pub fn handle(&self) -> Option<&ExecutionHandle> {
        match self {
            ExecutionState::Idle | ExecutionState::Triggering { .. } => None,
            ExecutionState::Running { handle, .. }
            | ExecutionState::Succeeded { handle, .. }
            | ExecutionState::Failed { handle, .. } => Some(handle),
        }
    }

    /// Most recent status literal reported by the service, if any
    pub fn last_status(&self) -> Option<&str> {
        match self {
            ExecutionState::Running { last_sample, .. }
            | ExecutionState::Failed { last_sample, .. } => {
                last_sample.as_ref().map(|s| s.status.as_str())
            }
            ExecutionState::Succeeded { last_sample, .. } => Some(last_sample.status.as_str()),
            _ => None,
        }
    }

    /// Short name of the variant
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionState::Idle => "Idle",
            ExecutionState::Triggering { .. } => "Triggering",
            ExecutionState::Running { .. } => "Running",
            ExecutionState::Succeeded { .. } => "Succeeded",
            ExecutionState::Failed { .. } => "Failed",
        }
    }

    /// Text for a status column
    pub fn status_text(&self) -> String {
        match self {
            ExecutionState::Idle => String::new(),
            ExecutionState::Triggering { .. } => "Triggering...".to_string(),
            ExecutionState::Running { last_sample, .. } => match last_sample {
                Some(sample) => format!("Running... ({})", sample.status),
                None => "Running...".to_string(),
            },
            ExecutionState::Succeeded { .. } => "Success".to_string(),
            ExecutionState::Failed {
                reason,
                last_sample,
                ..
            } => match (reason, last_sample) {
                (FailureReason::Status(status), _) => status.clone(),
                (_, Some(sample)) => format!("{} ({})", sample.status, reason),
                (_, None) => reason.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> Selection {
        Selection::new("shop", "dev")
    }

    fn handle() -> ExecutionHandle {
        ExecutionHandle::new("/pipelines/01HX").unwrap()
    }

    #[test]
    fn test_classify_success() {
        assert_eq!(StatusClass::classify("SUCCEEDED"), StatusClass::Succeeded);
    }

    #[test]
    fn test_classify_failures() {
        for status in ["FAILED", "CANCELED", "TERMINAL"] {
            assert_eq!(StatusClass::classify(status), StatusClass::Failed);
        }
    }

    #[test]
    fn test_classify_in_progress() {
        for status in ["RUNNING", "PENDING", "NOT_STARTED", "succeeded", ""] {
            assert_eq!(StatusClass::classify(status), StatusClass::InProgress);
            assert!(!StatusClass::classify(status).is_terminal());
        }
    }

    #[test]
    fn test_handle_rejects_blank() {
        assert!(ExecutionHandle::new("").is_none());
        assert!(ExecutionHandle::new("   ").is_none());
        assert_eq!(handle().as_str(), "/pipelines/01HX");
    }

    #[test]
    fn test_handle_deserializes_transparently() {
        let parsed: ExecutionHandle = serde_json::from_str(r#""/pipelines/abc""#).unwrap();
        assert_eq!(parsed.as_str(), "/pipelines/abc");
    }

    #[test]
    fn test_state_predicates() {
        assert!(!ExecutionState::Idle.is_active());
        assert!(!ExecutionState::Idle.is_terminal());

        let triggering = ExecutionState::Triggering {
            selection: selection(),
        };
        assert!(triggering.is_active());
        assert!(triggering.handle().is_none());

        let running = ExecutionState::Running {
            selection: selection(),
            handle: handle(),
            last_sample: Some(PollSample::new("RUNNING")),
        };
        assert!(running.is_active());
        assert_eq!(running.last_status(), Some("RUNNING"));
        assert_eq!(running.status_text(), "Running... (RUNNING)");

        let succeeded = ExecutionState::Succeeded {
            selection: selection(),
            handle: handle(),
            last_sample: PollSample::new("SUCCEEDED"),
        };
        assert!(succeeded.is_terminal());
        assert_eq!(succeeded.selection(), Some(&selection()));
        assert_eq!(succeeded.status_text(), "Success");
    }

    #[test]
    fn test_failed_status_text() {
        let by_status = ExecutionState::Failed {
            selection: selection(),
            handle: handle(),
            reason: FailureReason::Status("CANCELED".to_string()),
            last_sample: Some(PollSample::new("CANCELED")),
        };
        assert_eq!(by_status.status_text(), "CANCELED");

        let timed_out = ExecutionState::Failed {
            selection: selection(),
            handle: handle(),
            reason: FailureReason::TimedOut {
                after: Duration::from_secs(40),
            },
            last_sample: None,
        };
        assert_eq!(timed_out.status_text(), "no terminal status after 40s");
    }
}
