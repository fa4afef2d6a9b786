//! Binding a partition scheme to run-config generation.
//!
//! A [`PartitionedConfig`] pairs a [`PartitionsDefinition`] with a
//! user-supplied pure function that maps one partition window to an opaque
//! run-config payload. The callback receives the window's exact timezone-aware
//! endpoints; when those are rendered into the payload as RFC 3339 strings,
//! UTC endpoints carry the literal `+00:00` suffix, which downstream stores
//! depend on.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use metronome_core::{PartitionsDefinition, TimeWindow};

use crate::error::Result;

/// An opaque run configuration payload, keyed by string.
pub type RunConfig = serde_json::Map<String, serde_json::Value>;

/// The user-supplied mapping from a partition window to a run configuration.
///
/// Must be pure and total over every window the bound definition can produce.
pub type RunConfigFn = Arc<dyn Fn(&TimeWindow) -> RunConfig + Send + Sync>;

/// A partition scheme bound to run-config generation and base tags.
///
/// Immutable after construction; shared freely across threads.
#[derive(Clone)]
pub struct PartitionedConfig {
    partitions_def: PartitionsDefinition,
    run_config_fn: RunConfigFn,
    tags: BTreeMap<String, String>,
}

impl PartitionedConfig {
    /// Binds `partitions_def` to `run_config_fn`.
    pub fn new<F>(partitions_def: PartitionsDefinition, run_config_fn: F) -> Self
    where
        F: Fn(&TimeWindow) -> RunConfig + Send + Sync + 'static,
    {
        Self {
            partitions_def,
            run_config_fn: Arc::new(run_config_fn),
            tags: BTreeMap::new(),
        }
    }

    /// Sets base tags merged into every run request derived from this config.
    #[must_use]
    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// The bound partition scheme.
    #[must_use]
    pub fn partitions_def(&self) -> &PartitionsDefinition {
        &self.partitions_def
    }

    /// The base tags.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// The keys of all partitions fully elapsed at `current_time`, ordered by
    /// start ascending.
    #[must_use]
    pub fn get_partition_keys(&self, current_time: DateTime<Utc>) -> Vec<String> {
        self.partitions_def.get_partition_keys(current_time)
    }

    /// Resolves `key` and returns the callback's payload for its window,
    /// verbatim.
    ///
    /// # Errors
    ///
    /// Propagates `UnknownPartitionKey` when `key` does not belong to the
    /// bound scheme.
    pub fn get_run_config_for_partition_key(&self, key: &str) -> Result<RunConfig> {
        let partition = self.partitions_def.get_partition(key)?;
        Ok((self.run_config_fn)(partition.window()))
    }
}

impl fmt::Debug for PartitionedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionedConfig")
            .field("partitions_def", &self.partitions_def)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;

    fn window_endpoints(window: &TimeWindow) -> RunConfig {
        let mut config = RunConfig::new();
        config.insert("start".into(), json!(window.start().to_rfc3339()));
        config.insert("end".into(), json!(window.end().to_rfc3339()));
        config
    }

    fn daily_config() -> PartitionedConfig {
        let start = NaiveDate::from_ymd_opt(2021, 5, 5).unwrap();
        PartitionedConfig::new(PartitionsDefinition::daily(start), window_endpoints)
    }

    #[test]
    fn test_run_config_surfaces_utc_offset_suffix() {
        let config = daily_config();
        let run_config = config.get_run_config_for_partition_key("2021-05-05").unwrap();
        assert_eq!(run_config["start"], json!("2021-05-05T00:00:00+00:00"));
        assert_eq!(run_config["end"], json!("2021-05-06T00:00:00+00:00"));
    }

    #[test]
    fn test_unknown_key_propagates() {
        let config = daily_config();
        let err = config
            .get_run_config_for_partition_key("2021-05-04")
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Core(metronome_core::Error::UnknownPartitionKey { .. })
        ));
    }

    #[test]
    fn test_partition_keys_delegate_to_definition() {
        let config = daily_config();
        let now = Utc.with_ymd_and_hms(2021, 5, 8, 0, 0, 0).unwrap();
        assert_eq!(
            config.get_partition_keys(now),
            config.partitions_def().get_partition_keys(now)
        );
    }
}
