//! Pipeline domain types

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named pipeline belonging to an application
///
/// The upstream listing carries more fields per pipeline; only the name is
/// needed to trigger one, everything else is ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineDescriptor {
    pub name: String,
}

impl PipelineDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Removes pipelines whose name was already seen, keeping first occurrences
///
/// The orchestration service may list several pipeline configs under the
/// same name; only one selectable entry per name is kept.
pub fn dedup_by_name(pipelines: Vec<PipelineDescriptor>) -> Vec<PipelineDescriptor> {
    let mut seen = HashSet::new();
    pipelines
        .into_iter()
        .filter(|p| seen.insert(p.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(pipelines: &[PipelineDescriptor]) -> Vec<&str> {
        pipelines.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let input = vec![
            PipelineDescriptor::new("uat"),
            PipelineDescriptor::new("dev"),
            PipelineDescriptor::new("uat"),
            PipelineDescriptor::new("prod"),
            PipelineDescriptor::new("dev"),
        ];

        let deduped = dedup_by_name(input);
        assert_eq!(names(&deduped), vec!["uat", "dev", "prod"]);
    }

    #[test]
    fn test_dedup_without_duplicates_is_identity() {
        let input = vec![PipelineDescriptor::new("dev"), PipelineDescriptor::new("prod")];
        assert_eq!(dedup_by_name(input.clone()), input);
    }

    #[test]
    fn test_dedup_empty() {
        assert!(dedup_by_name(Vec::new()).is_empty());
    }

    #[test]
    fn test_descriptor_ignores_extra_fields() {
        let json = r#"[{"name":"dev","application":"shop","index":0},{"name":"dev","id":"x"}]"#;
        let parsed: Vec<PipelineDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(dedup_by_name(parsed), vec![PipelineDescriptor::new("dev")]);
    }
}
