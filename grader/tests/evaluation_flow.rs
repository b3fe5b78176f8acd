//! End-to-end tests for the evaluation pipeline, driving [`EvaluationJob`]
//! with a scripted simulator harness instead of a real toolchain.

use grader::EvaluationJob;
use grader::parsers::ParserRegistry;
use grader::report::EvaluationResult;
use grader::traits::sim_harness::SimulatorHarness;
use grader::types::{EvaluationStage, SimulationResult, StageOutcome};
use std::fs;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use util::acceptance_criteria::{AcceptanceCriteria, FunctionalStrategy};
use util::config::AppConfig;
use util::sim_config::SimulatorConfig;
use util::simulators::Simulator;
use util::task_spec::{TaskLevel, TaskSpec};

/// Harness that replays scripted stage outcomes instead of running tools.
struct ScriptedHarness {
    simulator: Simulator,
    patch: StageOutcome,
    compile: StageOutcome,
    run: SimulationResult,
}

impl SimulatorHarness for ScriptedHarness {
    fn simulator(&self) -> Simulator {
        self.simulator
    }

    fn apply_patch<'a>(
        &'a self,
        _patch_path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = StageOutcome> + Send + 'a>> {
        let outcome = self.patch.clone();
        Box::pin(async move { outcome })
    }

    fn compile<'a>(
        &'a self,
        _work_dir: &'a Path,
    ) -> Pin<Box<dyn Future<Output = StageOutcome> + Send + 'a>> {
        let outcome = self.compile.clone();
        Box::pin(async move { outcome })
    }

    fn run_test<'a>(
        &'a self,
        _config: &'a SimulatorConfig,
    ) -> Pin<Box<dyn Future<Output = SimulationResult> + Send + 'a>> {
        let run = self.run.clone();
        Box::pin(async move { run })
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn sample_task() -> TaskSpec {
    TaskSpec {
        id: "apb_burst".into(),
        name: "Cover APB burst writes".into(),
        level: TaskLevel::Medium,
        bench_name: "apb_avip".into(),
        description: String::new(),
        goal: "Hit the burst covergroup".into(),
        acceptance: AcceptanceCriteria {
            functional_bins: vec!["tb/apb_cg".into()],
            functional_min_pct: 80.0,
            functional_strategy: FunctionalStrategy::AnyOf,
            code_statements_min_pct: 70.0,
            code_branches_min_pct: 60.0,
            code_toggles_min_pct: 50.0,
            ..Default::default()
        },
        hints: vec![],
        original_test_files: vec![PathBuf::from("tests/apb_burst_test.sv")],
        supported_simulators: vec![Simulator::Questa],
        notes: None,
    }
}

/// Lay down a passing vcover report and a clean log, returning their paths.
fn write_passing_artifacts(dir: &Path) -> (PathBuf, PathBuf) {
    let report_path = dir.join("coverage.rpt");
    fs::write(
        &report_path,
        "Covergroup Coverage:\n\
         =====================================\n\
         tb/apb_cg      85.00%     100.00%\n\
         \x20   bin burst_incr    17    20\n\
         \n\
         Code Coverage Summary:\n\
         =====================================\n\
         Statement Coverage: 75.0%\n\
         Branch Coverage: 65.0%\n\
         Toggle Coverage: 55.0%\n",
    )
    .unwrap();

    let log_path = dir.join("sim.log");
    fs::write(
        &log_path,
        "UVM_INFO @ 0: reporter [RNTST] Running test apb_burst_test...\n\
         UVM_INFO @ 900: reporter [FINISH] run phase complete\n",
    )
    .unwrap();

    (report_path, log_path)
}

fn passing_run(report_path: PathBuf, log_path: PathBuf) -> SimulationResult {
    SimulationResult {
        success: true,
        exit_code: 0,
        log_path,
        coverage_db_path: Some(report_path),
        runtime_secs: 4.2,
        timed_out: false,
    }
}

#[tokio::test]
async fn test_successful_evaluation_passes_and_persists() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let work_dir = dir.path().join("work");
    let (report_path, log_path) = write_passing_artifacts(dir.path());

    let harness = ScriptedHarness {
        simulator: Simulator::Questa,
        patch: StageOutcome::ok(),
        compile: StageOutcome::ok(),
        run: passing_run(report_path.clone(), log_path.clone()),
    };

    let result = EvaluationJob::new(sample_task(), dir.path().join("solution.patch"), harness)
        .with_work_dir(work_dir.clone())
        .evaluate()
        .await;

    assert!(result.passed, "expected pass, got: {result:?}");
    assert!((result.score - 1.0).abs() < 1e-8);
    assert_eq!(result.functional_score, 1.0);
    assert_eq!(result.code_coverage_score, 1.0);
    assert_eq!(result.health_score, 1.0);
    assert!(result.failed_stage.is_none());
    assert!(result.failure_reason.is_none());
    assert_eq!(result.log_path.as_deref(), Some(log_path.as_path()));
    assert_eq!(result.coverage_db_path.as_deref(), Some(report_path.as_path()));
    assert_eq!(result.functional_bins_met, vec!["tb/apb_cg"]);

    // result.json must parse back to the identical result.
    let raw = fs::read_to_string(work_dir.join("result.json")).unwrap();
    let persisted = EvaluationResult::from_json(&raw).unwrap();
    assert_eq!(persisted, result);
}

#[tokio::test]
async fn test_patch_failure_is_terminal() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let (report_path, log_path) = write_passing_artifacts(dir.path());

    let harness = ScriptedHarness {
        simulator: Simulator::Questa,
        patch: StageOutcome::failed("git apply --check rejected the patch"),
        compile: StageOutcome::ok(),
        run: passing_run(report_path, log_path),
    };

    let result = EvaluationJob::new(sample_task(), dir.path().join("solution.patch"), harness)
        .with_work_dir(dir.path().join("work"))
        .evaluate()
        .await;

    assert!(!result.passed);
    assert_eq!(result.score, 0.0);
    assert_eq!(result.failed_stage, Some(EvaluationStage::ApplyPatch));
    let reason = result.failure_reason.unwrap();
    assert!(reason.contains("Patch application failed"), "reason: {reason}");
    assert!(reason.contains("git apply"), "reason: {reason}");
    assert!(result.coverage_report.functional_groups.is_empty());
}

#[tokio::test]
async fn test_compile_failure_is_terminal() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let (report_path, log_path) = write_passing_artifacts(dir.path());

    let harness = ScriptedHarness {
        simulator: Simulator::Questa,
        patch: StageOutcome::ok(),
        compile: StageOutcome::failed("vlog-13069 near 'endclass'"),
        run: passing_run(report_path, log_path),
    };

    let result = EvaluationJob::new(sample_task(), dir.path().join("solution.patch"), harness)
        .with_work_dir(dir.path().join("work"))
        .evaluate()
        .await;

    assert_eq!(result.failed_stage, Some(EvaluationStage::Compile));
    assert_eq!(result.score, 0.0);
    assert!(
        result
            .failure_reason
            .unwrap()
            .starts_with("Compilation failed")
    );
}

#[tokio::test]
async fn test_simulation_failure_is_terminal() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let (report_path, log_path) = write_passing_artifacts(dir.path());

    let harness = ScriptedHarness {
        simulator: Simulator::Questa,
        patch: StageOutcome::ok(),
        compile: StageOutcome::ok(),
        run: SimulationResult {
            success: false,
            exit_code: 2,
            log_path: log_path.clone(),
            coverage_db_path: Some(report_path),
            runtime_secs: 0.4,
            timed_out: false,
        },
    };

    let result = EvaluationJob::new(sample_task(), dir.path().join("solution.patch"), harness)
        .with_work_dir(dir.path().join("work"))
        .evaluate()
        .await;

    assert_eq!(result.failed_stage, Some(EvaluationStage::RunTest));
    assert!(result.failure_reason.unwrap().contains("exit code 2"));
    // The log is still surfaced for debugging.
    assert_eq!(result.log_path.as_deref(), Some(log_path.as_path()));
}

#[tokio::test]
async fn test_timeout_short_circuits_before_extraction() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let (report_path, log_path) = write_passing_artifacts(dir.path());

    let harness = ScriptedHarness {
        simulator: Simulator::Questa,
        patch: StageOutcome::ok(),
        compile: StageOutcome::ok(),
        run: SimulationResult {
            // A killed run can still report a nonzero artifact; the timeout
            // flag alone must keep it from being scored.
            success: false,
            exit_code: 137,
            log_path,
            coverage_db_path: Some(report_path),
            runtime_secs: 300.0,
            timed_out: true,
        },
    };

    let result = EvaluationJob::new(sample_task(), dir.path().join("solution.patch"), harness)
        .with_work_dir(dir.path().join("work"))
        .evaluate()
        .await;

    assert_eq!(result.failed_stage, Some(EvaluationStage::RunTest));
    assert_eq!(result.failure_reason.as_deref(), Some("Simulation timed out"));
    assert!(result.coverage_report.functional_groups.is_empty());
}

#[tokio::test]
async fn test_missing_parser_is_terminal() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let (report_path, log_path) = write_passing_artifacts(dir.path());

    let harness = ScriptedHarness {
        simulator: Simulator::Verilator,
        patch: StageOutcome::ok(),
        compile: StageOutcome::ok(),
        run: passing_run(report_path, log_path),
    };

    let result = EvaluationJob::new(sample_task(), dir.path().join("solution.patch"), harness)
        .with_work_dir(dir.path().join("work"))
        .with_parsers(ParserRegistry::with_defaults())
        .evaluate()
        .await;

    assert_eq!(result.failed_stage, Some(EvaluationStage::ExtractCoverage));
    assert!(result.failure_reason.unwrap().contains("verilator"));
}

#[tokio::test]
async fn test_missing_coverage_artifact_scores_degenerately() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let (_, log_path) = write_passing_artifacts(dir.path());

    let harness = ScriptedHarness {
        simulator: Simulator::Questa,
        patch: StageOutcome::ok(),
        compile: StageOutcome::ok(),
        run: SimulationResult {
            success: true,
            exit_code: 0,
            log_path,
            coverage_db_path: None,
            runtime_secs: 3.0,
            timed_out: false,
        },
    };

    let result = EvaluationJob::new(sample_task(), dir.path().join("solution.patch"), harness)
        .with_work_dir(dir.path().join("work"))
        .evaluate()
        .await;

    // Not a stage failure: the empty report simply scores zero coverage.
    assert!(result.failed_stage.is_none());
    assert!(!result.passed);
    assert_eq!(result.functional_score, 0.0);
    assert_eq!(result.health_score, 1.0);
    assert_eq!(result.functional_bins_missed, vec!["tb/apb_cg"]);
}

#[tokio::test]
#[serial_test::serial]
async fn test_default_work_dir_from_configured_root() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    AppConfig::set_work_storage_root(dir.path().to_string_lossy().to_string());
    let (report_path, log_path) = write_passing_artifacts(dir.path());

    let harness = ScriptedHarness {
        simulator: Simulator::Questa,
        patch: StageOutcome::ok(),
        compile: StageOutcome::ok(),
        run: passing_run(report_path, log_path),
    };

    let result = EvaluationJob::new(sample_task(), dir.path().join("solution.patch"), harness)
        .evaluate()
        .await;

    assert!(result.passed);
    let result_json = dir.path().join("eval").join("apb_burst").join("result.json");
    assert!(result_json.is_file(), "missing {}", result_json.display());

    AppConfig::reset();
}
