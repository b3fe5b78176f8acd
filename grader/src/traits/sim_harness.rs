//!
//! # Simulator Harness Trait
//!
//! This module defines the [`SimulatorHarness`] trait: the boundary between
//! the evaluation pipeline and the external processes that apply patches,
//! compile testbenches, and run simulations. The grader core never spawns a
//! process itself; it only consumes the success/failure outcomes and artifact
//! paths a harness reports back.
//!

use crate::types::{SimulationResult, StageOutcome};
use std::path::Path;
use std::pin::Pin;
use util::sim_config::SimulatorConfig;
use util::simulators::Simulator;

/// The external process boundary for one simulator installation.
///
/// Implementations wrap a concrete vendor toolchain (Questa, Xcelium, ...)
/// and are expected to enforce their own run timeout, reporting it through
/// [`SimulationResult::timed_out`] — the pipeline short-circuits on timeout
/// without attempting coverage extraction.
pub trait SimulatorHarness {
    /// The simulator this harness drives; used to select the report parser.
    fn simulator(&self) -> Simulator;

    /// Apply a solution patch to the gym checkout.
    fn apply_patch<'a>(
        &'a self,
        patch_path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = StageOutcome> + Send + 'a>>;

    /// Compile the design and testbench into `work_dir`.
    fn compile<'a>(
        &'a self,
        work_dir: &'a Path,
    ) -> Pin<Box<dyn Future<Output = StageOutcome> + Send + 'a>>;

    /// Run a single test and report its outcome and artifact paths.
    fn run_test<'a>(
        &'a self,
        config: &'a SimulatorConfig,
    ) -> Pin<Box<dyn Future<Output = SimulationResult> + Send + 'a>>;
}
