//! Task acceptance criteria.
//!
//! [`AcceptanceCriteria`] carries the thresholds and scoring weights a task
//! promises to grade against: target functional bins/groups, code coverage
//! minimums, health maximums, and the component weights. Criteria are
//! validated when loaded so a malformed task fails before any simulation
//! time is spent on it.

use serde::{Deserialize, Serialize};
use std::fs;

/// How the target functional bins are combined into one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionalStrategy {
    /// The single best-covered target determines the score.
    AnyOf,
    /// Every target must independently approach the threshold.
    AllOf,
}

/// Component weights for the total score. Must sum to 1.0 (± tolerance).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScoreWeights {
    #[serde(default = "default_functional_weight")]
    pub functional_coverage: f64,

    #[serde(default = "default_code_weight")]
    pub code_coverage: f64,

    #[serde(default = "default_health_weight")]
    pub health: f64,
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.functional_coverage + self.code_coverage + self.health
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            functional_coverage: default_functional_weight(),
            code_coverage: default_code_weight(),
            health: default_health_weight(),
        }
    }
}

/// Allowed deviation of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AcceptanceCriteria {
    /// Target functional bin/group names. A bare group name selects the
    /// group's overall percentage; `group.bin` selects a single bin.
    #[serde(default)]
    pub functional_bins: Vec<String>,

    /// Minimum coverage percentage (0–100) a target must reach.
    #[serde(default = "default_functional_min_pct")]
    pub functional_min_pct: f64,

    #[serde(default = "default_functional_strategy")]
    pub functional_strategy: FunctionalStrategy,

    #[serde(default = "default_code_statements_min_pct")]
    pub code_statements_min_pct: f64,

    #[serde(default = "default_code_branches_min_pct")]
    pub code_branches_min_pct: f64,

    #[serde(default = "default_code_toggles_min_pct")]
    pub code_toggles_min_pct: f64,

    #[serde(default)]
    pub max_scoreboard_errors: u64,

    #[serde(default)]
    pub max_uvm_errors: u64,

    #[serde(default)]
    pub max_uvm_fatals: u64,

    /// If true, any assertion failure zeroes the health score.
    #[serde(default = "default_all_assertions_pass")]
    pub all_assertions_pass: bool,

    #[serde(default)]
    pub weights: ScoreWeights,
}

impl Default for AcceptanceCriteria {
    fn default() -> Self {
        Self {
            functional_bins: vec![],
            functional_min_pct: default_functional_min_pct(),
            functional_strategy: default_functional_strategy(),
            code_statements_min_pct: default_code_statements_min_pct(),
            code_branches_min_pct: default_code_branches_min_pct(),
            code_toggles_min_pct: default_code_toggles_min_pct(),
            max_scoreboard_errors: 0,
            max_uvm_errors: 0,
            max_uvm_fatals: 0,
            all_assertions_pass: default_all_assertions_pass(),
            weights: ScoreWeights::default(),
        }
    }
}

impl AcceptanceCriteria {
    /// Checks the invariants that make criteria scorable: weights summing to
    /// 1.0 within [`WEIGHT_SUM_TOLERANCE`] and percentage thresholds inside
    /// the 0–100 range.
    pub fn validate(&self) -> Result<(), String> {
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!(
                "Score weights must sum to 1.0 (±{WEIGHT_SUM_TOLERANCE}), got {sum}"
            ));
        }

        for (label, value) in [
            ("functional_min_pct", self.functional_min_pct),
            ("code_statements_min_pct", self.code_statements_min_pct),
            ("code_branches_min_pct", self.code_branches_min_pct),
            ("code_toggles_min_pct", self.code_toggles_min_pct),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(format!("{label} must be within 0–100, got {value}"));
            }
        }

        Ok(())
    }

    /// Parses criteria from a JSON string and validates them.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let criteria: AcceptanceCriteria =
            serde_json::from_str(raw).map_err(|e| format!("Invalid criteria JSON: {e}"))?;
        criteria.validate()?;
        Ok(criteria)
    }

    /// Loads and validates criteria from a JSON file.
    pub fn load(path: &std::path::Path) -> Result<Self, String> {
        use std::io::ErrorKind;

        let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => "Criteria file not found".to_string(),
            ErrorKind::PermissionDenied => "Permission denied reading criteria file".to_string(),
            ErrorKind::InvalidData => "Criteria file is not valid UTF-8".to_string(),
            _ => format!("Failed to read criteria file: {e}"),
        })?;
        Self::from_json(&raw)
    }
}

fn default_functional_min_pct() -> f64 {
    80.0
}

fn default_functional_strategy() -> FunctionalStrategy {
    FunctionalStrategy::AnyOf
}

fn default_code_statements_min_pct() -> f64 {
    70.0
}

fn default_code_branches_min_pct() -> f64 {
    60.0
}

fn default_code_toggles_min_pct() -> f64 {
    50.0
}

fn default_all_assertions_pass() -> bool {
    true
}

fn default_functional_weight() -> f64 {
    0.6
}

fn default_code_weight() -> f64 {
    0.3
}

fn default_health_weight() -> f64 {
    0.1
}
