//! Deployed application endpoints
//!
//! Once a pipeline run succeeds, the application it deployed can be viewed
//! at a URL that depends only on the pipeline name (one pipeline per
//! environment). The mapping is static; unknown names have no endpoint.

use std::collections::HashMap;

/// Built-in environment endpoints, keyed by pipeline name
const STATIC_ENDPOINTS: [(&str, &str); 3] = [
    (
        "dev",
        "http://a915a80b42c0c4c7eac7a3f5aa619dea-627576352.us-east-1.elb.amazonaws.com",
    ),
    (
        "uat",
        "http://a4accc2b34f81444fbaf6652837d97cc-1181325399.us-east-1.elb.amazonaws.com",
    ),
    (
        "prod",
        "http://a57d4da36efd34c56bfcabb3310af27d-196101690.us-east-1.elb.amazonaws.com",
    ),
];

/// Resolves the viewing URL for a pipeline name from the built-in table
///
/// Total over any input: names without an entry resolve to `None`.
pub fn resolve_endpoint(pipeline_name: &str) -> Option<&'static str> {
    STATIC_ENDPOINTS
        .iter()
        .find(|(name, _)| *name == pipeline_name)
        .map(|(_, url)| *url)
}

/// Endpoint lookup with per-deployment overrides on top of the built-in table
#[derive(Debug, Clone, Default)]
pub struct EndpointTable {
    overrides: HashMap<String, String>,
}

impl EndpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the endpoint for a pipeline name
    pub fn with_entry(mut self, pipeline_name: impl Into<String>, url: impl Into<String>) -> Self {
        self.overrides.insert(pipeline_name.into(), url.into());
        self
    }

    /// Resolves a pipeline name, preferring overrides over the built-in table
    pub fn resolve(&self, pipeline_name: &str) -> Option<&str> {
        self.overrides
            .get(pipeline_name)
            .map(String::as_str)
            .or_else(|| resolve_endpoint(pipeline_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_environments_resolve_to_distinct_urls() {
        let dev = resolve_endpoint("dev").unwrap();
        let uat = resolve_endpoint("uat").unwrap();
        let prod = resolve_endpoint("prod").unwrap();

        assert_ne!(dev, uat);
        assert_ne!(uat, prod);
        assert_ne!(dev, prod);
        assert!(dev.starts_with("http://"));
    }

    #[test]
    fn test_unknown_names_resolve_to_none() {
        assert_eq!(resolve_endpoint("staging"), None);
        assert_eq!(resolve_endpoint(""), None);
        assert_eq!(resolve_endpoint("DEV"), None);
        assert_eq!(resolve_endpoint("dev "), None);
        assert_eq!(resolve_endpoint("\u{1F680}/../prod"), None);
    }

    #[test]
    fn test_table_overrides_and_fallback() {
        let table = EndpointTable::new()
            .with_entry("staging", "https://staging.example.test")
            .with_entry("dev", "https://dev.example.test");

        assert_eq!(table.resolve("staging"), Some("https://staging.example.test"));
        assert_eq!(table.resolve("dev"), Some("https://dev.example.test"));
        assert_eq!(table.resolve("prod"), resolve_endpoint("prod"));
        assert_eq!(table.resolve("qa"), None);
    }
}
