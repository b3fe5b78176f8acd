//! # Grader Library
//!
//! This module provides the core logic for grading UVM verification gym
//! solutions. It normalizes simulator coverage reports into a shared data
//! model, extracts simulation health from logs, scores the result against a
//! task's acceptance criteria, and drives the evaluation pipeline from patch
//! application through persisting `result.json`.
//!
//! ## Key Concepts
//! - **EvaluationJob**: The main struct representing one evaluation of a
//!   solution patch against a task.
//! - **Parsers**: Vendor report parsers behind one [`CoverageParser`]
//!   interface, resolved through an explicit [`ParserRegistry`].
//! - **Scorer**: A pure function blending functional coverage, code coverage
//!   and simulation health into a weighted score with pass/fail semantics.
//! - **SimulatorHarness**: The external process boundary; the grader itself
//!   never spawns simulator processes.
//!
//! [`CoverageParser`]: crate::traits::coverage_parser::CoverageParser

pub mod error;
pub mod parsers;
pub mod report;
pub mod scorer;
pub mod traits;
pub mod types;

use crate::error::GraderError;
use crate::parsers::ParserRegistry;
use crate::parsers::uvm_log::UvmLogParser;
use crate::report::{CoverageReport, EvaluationResult};
use crate::traits::sim_harness::SimulatorHarness;
use crate::types::EvaluationStage;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use util::paths;
use util::sim_config::SimulatorConfig;
use util::task_spec::TaskSpec;

/// Represents one evaluation of a solution patch against a task.
///
/// The job walks the pipeline
/// `apply_patch → compile → run_test → extract_coverage → score → persist`,
/// delegating every external step to the configured [`SimulatorHarness`].
/// Each stage either advances or produces an immediate terminal failure
/// result tagged with the stage that failed; a run reported as timed out
/// short-circuits before coverage extraction. There are no retries — flaky
/// simulator handling belongs to the caller.
///
/// # Fields
/// - `task`: The task specification, including acceptance criteria.
/// - `patch_path`: Path to the candidate solution patch.
/// - `harness`: External process boundary for the selected simulator.
/// - `parsers`: Parser registry used to normalize the coverage artifact.
pub struct EvaluationJob<'a> {
    task: TaskSpec,
    patch_path: PathBuf,
    harness: Box<dyn SimulatorHarness + Send + Sync + 'a>,
    parsers: ParserRegistry,
    work_dir: Option<PathBuf>,
    sim_config: Option<SimulatorConfig>,
}

impl<'a> EvaluationJob<'a> {
    /// Create a new evaluation job with the default parser registry.
    ///
    /// # Arguments
    /// * `task` - Task specification (criteria validated at load time).
    /// * `patch_path` - Path to the solution patch file.
    /// * `harness` - Simulator harness performing patch/compile/run.
    pub fn new<H: SimulatorHarness + Send + Sync + 'a>(
        task: TaskSpec,
        patch_path: PathBuf,
        harness: H,
    ) -> Self {
        Self {
            task,
            patch_path,
            harness: Box::new(harness),
            parsers: ParserRegistry::with_defaults(),
            work_dir: None,
            sim_config: None,
        }
    }

    /// Use a custom working directory instead of the configured default
    /// (`{WORK_ROOT}/eval/{task_id}`).
    pub fn with_work_dir(mut self, work_dir: PathBuf) -> Self {
        self.work_dir = Some(work_dir);
        self
    }

    /// Use a custom parser registry for this job.
    pub fn with_parsers(mut self, parsers: ParserRegistry) -> Self {
        self.parsers = parsers;
        self
    }

    /// Use a fully specified simulator run configuration instead of the
    /// default derived from the task (inferred test name, default knobs).
    pub fn with_sim_config(mut self, sim_config: SimulatorConfig) -> Self {
        self.sim_config = Some(sim_config);
        self
    }

    /// Run the evaluation pipeline and produce a result.
    ///
    /// Never returns an error: every failure mode is folded into a terminal
    /// [`EvaluationResult`] carrying a stage tag and a human-readable reason.
    /// A persist failure is logged and does not invalidate the result.
    pub async fn evaluate(self) -> EvaluationResult {
        info!("Evaluating task: {}", self.task.id);

        let work_dir = self
            .work_dir
            .clone()
            .unwrap_or_else(|| paths::eval_work_dir(&self.task.id));
        if let Err(e) = paths::ensure_dir(&work_dir) {
            return self.failure_result(
                None,
                format!("Could not create work directory {}: {e}", work_dir.display()),
                None,
            );
        }

        // 1. Apply patch
        let patch = self.harness.apply_patch(&self.patch_path).await;
        if !patch.success {
            return self.failure_result(
                Some(EvaluationStage::ApplyPatch),
                with_detail("Patch application failed", patch.detail),
                None,
            );
        }

        // 2. Compile
        let compile = self.harness.compile(&work_dir).await;
        if !compile.success {
            return self.failure_result(
                Some(EvaluationStage::Compile),
                with_detail("Compilation failed", compile.detail),
                None,
            );
        }

        // 3. Run test
        let sim_config = self
            .sim_config
            .clone()
            .unwrap_or_else(|| SimulatorConfig::new(work_dir.clone(), self.task.infer_test_name()));
        let run = self.harness.run_test(&sim_config).await;

        if run.timed_out {
            // Timed-out runs are never scored, whatever artifacts they left.
            return self.failure_result(
                Some(EvaluationStage::RunTest),
                "Simulation timed out".to_string(),
                Some(run.log_path),
            );
        }
        if !run.success {
            return self.failure_result(
                Some(EvaluationStage::RunTest),
                format!("Simulation failed with exit code {}", run.exit_code),
                Some(run.log_path),
            );
        }

        // 4. Extract coverage
        let simulator = self.harness.simulator();
        let Some(parser) = self.parsers.get(simulator) else {
            return self.failure_result(
                Some(EvaluationStage::ExtractCoverage),
                format!("No coverage parser registered for simulator '{simulator}'"),
                Some(run.log_path),
            );
        };

        let coverage = match &run.coverage_db_path {
            Some(artifact) => parser.parse(artifact, Some(&run.log_path)),
            None => {
                // Some simulators skip the coverage artifact under certain
                // flags; an empty report is valid degenerate input and the
                // scorer fails it naturally. Health still comes from the log.
                let mut empty = CoverageReport::empty(simulator, None);
                empty.health = UvmLogParser.parse_health(&run.log_path);
                empty
            }
        };

        // 5. Score
        let mut result = scorer::score(&self.task.id, &coverage, &self.task.acceptance);
        result.log_path = Some(run.log_path);
        result.coverage_db_path = run.coverage_db_path;

        // 6. Persist artifacts
        match persist_result(&work_dir, &result) {
            Ok(path) => info!("Saved result to {}", path.display()),
            Err(e) => warn!("Could not persist result for {}: {e:?}", self.task.id),
        }

        result
    }

    /// Build the terminal result for a failed pipeline stage.
    fn failure_result(
        &self,
        failed_stage: Option<EvaluationStage>,
        reason: String,
        log_path: Option<PathBuf>,
    ) -> EvaluationResult {
        error!("Evaluation of task {} failed: {reason}", self.task.id);

        EvaluationResult {
            task_id: self.task.id.clone(),
            passed: false,
            score: 0.0,
            functional_score: 0.0,
            code_coverage_score: 0.0,
            health_score: 0.0,
            functional_bins_met: vec![],
            functional_bins_missed: vec![],
            thresholds_met: BTreeMap::new(),
            coverage_report: CoverageReport::empty(self.harness.simulator(), None),
            failure_reason: Some(reason),
            failed_stage,
            log_path,
            coverage_db_path: None,
        }
    }
}

/// Write `result.json` into the work directory and return its path.
pub fn persist_result(
    work_dir: &Path,
    result: &EvaluationResult,
) -> Result<PathBuf, GraderError> {
    let path = paths::result_json_path(work_dir);
    paths::ensure_parent_dir(&path)
        .map_err(|e| GraderError::IoError(format!("Could not create {}: {e}", path.display())))?;

    let json = result.to_json()?;
    fs::write(&path, json)
        .map_err(|e| GraderError::IoError(format!("Could not write {}: {e}", path.display())))?;

    Ok(path)
}

/// Prefix a stage failure message with the vendor detail when one exists.
fn with_detail(message: &str, detail: Option<String>) -> String {
    match detail {
        Some(detail) if !detail.is_empty() => format!("{message}: {detail}"),
        _ => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer;

    #[test]
    fn test_persist_result_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let result = scorer::score(
            "t1",
            &CoverageReport::default(),
            &util::acceptance_criteria::AcceptanceCriteria::default(),
        );

        let path = persist_result(dir.path(), &result).unwrap();
        assert!(path.ends_with("result.json"));

        let raw = fs::read_to_string(&path).unwrap();
        let parsed = EvaluationResult::from_json(&raw).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_with_detail_formats() {
        assert_eq!(with_detail("Compilation failed", None), "Compilation failed");
        assert_eq!(
            with_detail("Compilation failed", Some("vlog-13069".to_string())),
            "Compilation failed: vlog-13069"
        );
        assert_eq!(
            with_detail("Compilation failed", Some(String::new())),
            "Compilation failed"
        );
    }
}
