//! # Types Module
//!
//! Shared types for the evaluation pipeline: the pipeline stage tags used to
//! label terminal failures, and the outcome structs handed back by simulator
//! harnesses at the external process boundary.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pipeline stages of one evaluation, in execution order. A failed stage is
/// recorded on the resulting [`crate::report::EvaluationResult`] so callers
/// can tell "the harness could not even try" apart from "the solution scored
/// zero".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStage {
    ApplyPatch,
    Compile,
    RunTest,
    ExtractCoverage,
    Score,
    Persist,
}

impl std::fmt::Display for EvaluationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EvaluationStage::ApplyPatch => "apply_patch",
            EvaluationStage::Compile => "compile",
            EvaluationStage::RunTest => "run_test",
            EvaluationStage::ExtractCoverage => "extract_coverage",
            EvaluationStage::Score => "score",
            EvaluationStage::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// Pass/fail outcome of a boolean external stage (patch application,
/// compilation), with an optional vendor message for the failure reason.
#[derive(Debug, Clone, Default)]
pub struct StageOutcome {
    pub success: bool,
    pub detail: Option<String>,
}

impl StageOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            detail: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: Some(detail.into()),
        }
    }
}

/// Result of a simulation run as reported by a simulator harness.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub success: bool,
    pub exit_code: i32,
    pub log_path: PathBuf,
    /// Raw coverage artifact (file or directory), if the run produced one.
    pub coverage_db_path: Option<PathBuf>,
    pub runtime_secs: f64,
    pub timed_out: bool,
}
