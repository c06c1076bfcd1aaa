use serde::{Deserialize, Serialize};

use crate::runtime::gc::gc_heap::{DEFAULT_GC_THRESHOLD, MIN_GC_THRESHOLD};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

/// Tunables for a [`crate::runtime::heap::Heap`] and the lambdas that run on it.
///
/// Every field has a default, so a JSON config file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Allocations between automatic collection passes.
    pub gc_threshold: usize,
    /// Run a collection pass automatically once `gc_threshold` is reached.
    pub auto_collect: bool,
    /// Maximum nesting of lambda and native calls.
    pub max_call_depth: usize,
    /// Emit a `tracing` event for every executed instruction.
    pub trace: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            gc_threshold: DEFAULT_GC_THRESHOLD,
            auto_collect: true,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            trace: false,
        }
    }
}

impl RuntimeConfig {
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Threshold actually handed to the heap.
    pub fn effective_gc_threshold(&self) -> usize {
        self.gc_threshold.max(MIN_GC_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = RuntimeConfig::from_json_str(r#"{ "trace": true }"#).unwrap();
        assert!(config.trace);
        assert!(config.auto_collect);
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }

    #[test]
    fn small_threshold_is_clamped() {
        let config = RuntimeConfig {
            gc_threshold: 3,
            ..RuntimeConfig::default()
        };
        assert_eq!(config.effective_gc_threshold(), MIN_GC_THRESHOLD);
    }
}
