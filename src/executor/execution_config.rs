use serde::{Deserialize, Serialize};

use crate::functions::FunctionError;

/// How an aggregate call is driven through its phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One SinglePass evaluator over all rows.
    #[default]
    Local,
    /// EmitPartial per partition, shuffle, optional MergePartial, FinalMerge.
    Distributed,
}

/// Executor configuration.
///
/// - `mode` selects single-pass or partitioned execution.
/// - `partitions` is the number of map-side partitions in distributed mode.
/// - `combine_partials` inserts a combiner stage that re-merges partials of
///   neighbouring partitions before the final merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub mode: ExecutionMode,
    pub partitions: usize,
    pub combine_partials: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { mode: ExecutionMode::Local, partitions: 1, combine_partials: false }
    }
}

impl ExecutionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local() -> Self {
        Self::default()
    }

    /// Partitioned execution; a partition count of zero is treated as one.
    pub fn distributed(partitions: usize) -> Self {
        Self { mode: ExecutionMode::Distributed, partitions: partitions.max(1), combine_partials: false }
    }

    pub fn with_combiner(mut self) -> Self {
        self.combine_partials = true;
        self
    }

    pub fn from_json(text: &str) -> Result<Self, FunctionError> {
        serde_json::from_str(text).map_err(|e| FunctionError::Other(format!("invalid execution config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_local_single_partition() {
        let c = ExecutionConfig::new();
        assert_eq!(c.mode, ExecutionMode::Local);
        assert_eq!(c.partitions, 1);
        assert!(!c.combine_partials);
    }

    #[test]
    fn distributed_clamps_partitions() {
        assert_eq!(ExecutionConfig::distributed(0).partitions, 1);
        let c = ExecutionConfig::distributed(4).with_combiner();
        assert_eq!(c.mode, ExecutionMode::Distributed);
        assert!(c.combine_partials);
    }

    #[test]
    fn from_json_fills_missing_fields_with_defaults() {
        let c = ExecutionConfig::from_json(r#"{"mode": "distributed", "partitions": 3}"#).unwrap();
        assert_eq!(c, ExecutionConfig { mode: ExecutionMode::Distributed, partitions: 3, combine_partials: false });
        assert_eq!(ExecutionConfig::from_json("{}").unwrap(), ExecutionConfig::default());
        assert!(ExecutionConfig::from_json(r#"{"mode": "sideways"}"#).is_err());
    }
}
