//! Per-run simulator configuration.
//!
//! [`SimulatorConfig`] describes one test invocation handed to a simulator
//! harness: where to run, which UVM test to select, and the knobs that are
//! uniform across vendors (seed, verbosity, timeout, coverage collection).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SimulatorConfig {
    pub work_dir: PathBuf,

    /// UVM test name passed as `+UVM_TESTNAME`.
    pub test_name: String,

    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_uvm_verbosity")]
    pub uvm_verbosity: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra vendor-specific arguments, passed through verbatim.
    #[serde(default)]
    pub extra_args: BTreeMap<String, String>,

    #[serde(default = "default_coverage_enabled")]
    pub coverage_enabled: bool,
}

impl SimulatorConfig {
    pub fn new(work_dir: PathBuf, test_name: impl Into<String>) -> Self {
        Self {
            work_dir,
            test_name: test_name.into(),
            seed: None,
            uvm_verbosity: default_uvm_verbosity(),
            timeout_secs: default_timeout_secs(),
            extra_args: BTreeMap::new(),
            coverage_enabled: default_coverage_enabled(),
        }
    }
}

fn default_uvm_verbosity() -> String {
    "UVM_MEDIUM".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_coverage_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_defaults() {
        let config = SimulatorConfig::new(PathBuf::from("/work/eval/t1"), "apb_burst_test");
        assert_eq!(config.test_name, "apb_burst_test");
        assert_eq!(config.uvm_verbosity, "UVM_MEDIUM");
        assert_eq!(config.timeout_secs, 300);
        assert!(config.coverage_enabled);
        assert!(config.seed.is_none());
        assert!(config.extra_args.is_empty());
    }

    #[test]
    fn test_deserialize_fills_missing_fields() {
        let raw = r#"{"work_dir": "/work/eval/t1", "test_name": "smoke_test", "seed": 42}"#;
        let config: SimulatorConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.timeout_secs, 300);
        assert!(config.coverage_enabled);
    }
}
