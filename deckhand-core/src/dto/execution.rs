//! Execution DTOs for the trigger and status endpoints

use serde::{Deserialize, Serialize};

use crate::domain::execution::ExecutionHandle;

/// Response of `POST /pipelines/{application}/{pipeline}`
///
/// `ref` is a path to the execution resource, e.g. `/pipelines/01HX...`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerResponse {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl TriggerResponse {
    /// Extracts the execution handle, if the service returned a usable one
    pub fn handle(&self) -> Option<ExecutionHandle> {
        self.reference.clone().and_then(ExecutionHandle::new)
    }
}

/// Response of `GET {host}{handle}`
///
/// Only `status` is read; the execution document carries much more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStatusResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_response_with_ref() {
        let parsed: TriggerResponse =
            serde_json::from_str(r#"{"ref":"/pipelines/01HXYZ"}"#).unwrap();
        assert_eq!(parsed.handle().unwrap().as_str(), "/pipelines/01HXYZ");
    }

    #[test]
    fn test_trigger_response_without_ref() {
        let parsed: TriggerResponse = serde_json::from_str(r#"{"id":"01HXYZ"}"#).unwrap();
        assert!(parsed.handle().is_none());
    }

    #[test]
    fn test_trigger_response_with_empty_ref() {
        let parsed: TriggerResponse = serde_json::from_str(r#"{"ref":""}"#).unwrap();
        assert!(parsed.handle().is_none());
    }

    #[test]
    fn test_status_response_ignores_other_fields() {
        let parsed: ExecutionStatusResponse =
            serde_json::from_str(r#"{"status":"RUNNING","stages":[],"buildTime":1}"#).unwrap();
        assert_eq!(parsed.status, "RUNNING");
    }
}
