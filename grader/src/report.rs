//! # Coverage Report Module
//!
//! This module defines the normalized coverage data model shared by every
//! report parser and the scoring engine, plus the [`EvaluationResult`]
//! returned to callers. Whatever a simulator emits — a Questa vcover text
//! report or an Xcelium IMC report directory — parsers reduce it to exactly
//! this shape, so the scorer never sees vendor-specific structure.
//!
//! ## JSON Output Example
//!
//! `CoverageReport::to_json` produces the durable interchange form:
//!
//! ```json
//! {
//!   "functional_groups": [
//!     {
//!       "name": "apb_master_coverage/apb_master_cg",
//!       "overall_pct": 75.0,
//!       "bins": [
//!         { "name": "paddr_low", "hits": 10, "goal": 10, "coverage_pct": 100.0 }
//!       ]
//!     }
//!   ],
//!   "code_coverage": { "statements_pct": 85.3, "branches_pct": 72.1, "toggles_pct": 91.5, "fsm_pct": 0.0, "expressions_pct": 0.0 },
//!   "health": { "uvm_errors": 0, "uvm_fatals": 0, "uvm_warnings": 0, "scoreboard_errors": 0, "assertion_failures": 0, "simulation_timeout": false, "compilation_errors": 0 },
//!   "simulator": "questa",
//!   "raw_report_path": "work/eval/t1/coverage.rpt"
//! }
//! ```
//!
//! Field names and nesting are a durable on-disk contract consumed by
//! leaderboard tooling; they must not change without a migration note.

use crate::error::GraderError;
use crate::types::EvaluationStage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use util::simulators::Simulator;

/// Individual coverage bin information.
///
/// `coverage_pct` is always derived from `hits` and `goal` at construction
/// time; it can exceed 100 when a bin is over-covered and is never clamped.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CoverageBin {
    pub name: String,
    pub hits: u64,
    pub goal: u64,
    pub coverage_pct: f64,
}

impl CoverageBin {
    /// Creates a bin, deriving `coverage_pct`. A `goal` of zero yields 0.0
    /// rather than a division by zero.
    pub fn new(name: impl Into<String>, hits: u64, goal: u64) -> Self {
        let coverage_pct = if goal > 0 {
            hits as f64 / goal as f64 * 100.0
        } else {
            0.0
        };
        Self {
            name: name.into(),
            hits,
            goal,
            coverage_pct,
        }
    }

    pub fn is_covered(&self) -> bool {
        self.hits >= self.goal
    }
}

/// Functional coverage group ("covergroup") with its bins.
///
/// Group names keep the source tool's qualification scheme verbatim
/// (`instance.covergroup`, `path/covergroup`) because acceptance criteria
/// reference these exact names.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CoverageGroup {
    pub name: String,
    pub overall_pct: f64,
    pub bins: Vec<CoverageBin>,
}

impl CoverageGroup {
    /// Find bin by name (first match).
    pub fn get_bin(&self, name: &str) -> Option<&CoverageBin> {
        self.bins.iter().find(|b| b.name == name)
    }
}

/// Code coverage metrics. Each metric defaults to 0.0 when the tool does not
/// report it; they are surfaced separately, never weighted internally.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CodeCoverage {
    #[serde(default)]
    pub statements_pct: f64,
    #[serde(default)]
    pub branches_pct: f64,
    #[serde(default)]
    pub toggles_pct: f64,
    #[serde(default)]
    pub fsm_pct: f64,
    #[serde(default)]
    pub expressions_pct: f64,
}

/// Simulation health/quality metrics.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct HealthMetrics {
    #[serde(default)]
    pub uvm_errors: u64,
    #[serde(default)]
    pub uvm_fatals: u64,
    #[serde(default)]
    pub uvm_warnings: u64,
    #[serde(default)]
    pub scoreboard_errors: u64,
    #[serde(default)]
    pub assertion_failures: u64,
    #[serde(default)]
    pub simulation_timeout: bool,
    #[serde(default)]
    pub compilation_errors: u64,
}

impl HealthMetrics {
    /// Check if simulation is in healthy state: every error-class counter is
    /// zero and the run did not time out. Warnings do not affect health.
    pub fn is_healthy(&self) -> bool {
        self.uvm_errors == 0
            && self.uvm_fatals == 0
            && self.scoreboard_errors == 0
            && self.assertion_failures == 0
            && !self.simulation_timeout
            && self.compilation_errors == 0
    }
}

/// Normalized coverage report across all simulators.
///
/// The sole interchange format between parsers and the scorer; every parser
/// produces exactly this shape regardless of the vendor source format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CoverageReport {
    #[serde(default)]
    pub functional_groups: Vec<CoverageGroup>,
    #[serde(default)]
    pub code_coverage: CodeCoverage,
    #[serde(default)]
    pub health: HealthMetrics,
    #[serde(default)]
    pub simulator: Option<Simulator>,
    /// Raw artifact the report was parsed from, for auditing.
    #[serde(default)]
    pub raw_report_path: Option<PathBuf>,
}

impl CoverageReport {
    /// An empty report tagged with its source simulator and raw artifact.
    pub fn empty(simulator: Simulator, raw_report_path: Option<PathBuf>) -> Self {
        Self {
            simulator: Some(simulator),
            raw_report_path,
            ..Default::default()
        }
    }

    /// Find coverage group by name (first match).
    pub fn get_group(&self, name: &str) -> Option<&CoverageGroup> {
        self.functional_groups.iter().find(|g| g.name == name)
    }

    /// Serialize to the stable JSON interchange form.
    pub fn to_json(&self) -> Result<String, GraderError> {
        serde_json::to_string_pretty(self).map_err(|e| GraderError::InvalidJson(e.to_string()))
    }

    /// Parse a report back from its JSON interchange form.
    pub fn from_json(raw: &str) -> Result<Self, GraderError> {
        serde_json::from_str(raw).map_err(|e| GraderError::InvalidJson(e.to_string()))
    }
}

/// Result of task evaluation.
///
/// Component scores and `score` all live on the 0.0–1.0 scale; `score` is the
/// weighted sum of the three components. `passed` is a near-strict AND across
/// the components (each ≥ 0.99), *not* a threshold on the weighted total.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EvaluationResult {
    pub task_id: String,
    pub passed: bool,
    pub score: f64,
    pub functional_score: f64,
    pub code_coverage_score: f64,
    pub health_score: f64,

    #[serde(default)]
    pub functional_bins_met: Vec<String>,
    #[serde(default)]
    pub functional_bins_missed: Vec<String>,
    #[serde(default)]
    pub thresholds_met: BTreeMap<String, bool>,

    pub coverage_report: CoverageReport,

    /// Populated when a pipeline stage failed terminally.
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub failed_stage: Option<EvaluationStage>,

    // Artifacts
    #[serde(default)]
    pub log_path: Option<PathBuf>,
    #[serde(default)]
    pub coverage_db_path: Option<PathBuf>,
}

impl EvaluationResult {
    /// Serialize to the stable JSON form persisted as `result.json`.
    pub fn to_json(&self) -> Result<String, GraderError> {
        serde_json::to_string_pretty(self).map_err(|e| GraderError::InvalidJson(e.to_string()))
    }

    /// Parse a result back from its JSON form.
    pub fn from_json(raw: &str) -> Result<Self, GraderError> {
        serde_json::from_str(raw).map_err(|e| GraderError::InvalidJson(e.to_string()))
    }
}
