//! The unit of work handed to the execution engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::RunConfig;

/// The tag key carrying the resolved partition key on every run request.
pub const PARTITION_TAG: &str = "partition";

/// One schedule firing's output: a run configuration and its tags.
///
/// Consumed by the external execution engine as an opaque value. Requests are
/// pure functions of the firing instant and the definitions that produced
/// them, so evaluating the same tick twice yields equal requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    run_config: RunConfig,
    tags: BTreeMap<String, String>,
}

impl RunRequest {
    /// Creates a new run request.
    #[must_use]
    pub fn new(run_config: RunConfig, tags: BTreeMap<String, String>) -> Self {
        Self { run_config, tags }
    }

    /// The opaque run configuration payload.
    #[must_use]
    pub fn run_config(&self) -> &RunConfig {
        &self.run_config
    }

    /// The merged tags, including the `partition` tag with the resolved key.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// The resolved partition key, read from the `partition` tag.
    #[must_use]
    pub fn partition_key(&self) -> Option<&str> {
        self.tags.get(PARTITION_TAG).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partition_key_reads_tag() {
        let mut config = RunConfig::new();
        config.insert("start".into(), json!("2021-05-05T00:00:00+00:00"));

        let mut tags = BTreeMap::new();
        tags.insert(PARTITION_TAG.to_string(), "2021-05-05".to_string());

        let request = RunRequest::new(config, tags);
        assert_eq!(request.partition_key(), Some("2021-05-05"));
    }

    #[test]
    fn test_round_trips_through_serde() {
        let mut config = RunConfig::new();
        config.insert("start".into(), json!("2021-05-05T00:00:00+00:00"));
        let mut tags = BTreeMap::new();
        tags.insert("team".to_string(), "analytics".to_string());

        let request = RunRequest::new(config, tags);
        let encoded = serde_json::to_string(&request).unwrap();
        let decoded: RunRequest = serde_json::from_str(&encoded).unwrap();
        assert_eq!(request, decoded);
    }
}
