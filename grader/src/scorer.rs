//! # Scorer Module
//!
//! This module turns a normalized [`CoverageReport`] and a task's
//! [`AcceptanceCriteria`] into an [`EvaluationResult`]: three component
//! scores on the 0.0–1.0 scale, their weighted total, a pass/fail verdict,
//! and per-target diagnostics.
//!
//! Scoring is a pure function of its two inputs — no I/O, no randomness —
//! so the same report and criteria always produce the same result.
//!
//! ## Semantics
//!
//! - **Functional**: with no targets the axis is vacuously satisfied (1.0).
//!   Targets resolve to a group's `overall_pct`, or to a bin's
//!   `coverage_pct` via the `group.bin` dotted form; unresolvable targets
//!   count as 0.0. `any_of` scores the single best target against
//!   `functional_min_pct`; `all_of` averages every target's clamped ratio.
//! - **Code**: unweighted mean of the statements/branches/toggles ratios,
//!   each clamped at 1.0 so over-achieving one metric cannot make up for
//!   another falling short.
//! - **Health**: binary. One excess error zeroes the whole axis.
//! - **Passed**: every component ≥ [`PASS_THRESHOLD`]. A high weighted total
//!   never compensates for a failing component.

use crate::report::{CoverageReport, EvaluationResult};
use std::collections::BTreeMap;
use util::acceptance_criteria::{AcceptanceCriteria, FunctionalStrategy};

/// Component score required to count as met: a whisker under 1.0 to absorb
/// floating point.
pub const PASS_THRESHOLD: f64 = 0.99;

/// Compute the evaluation result for a coverage report against criteria.
///
/// # Arguments
///
/// * `task_id` - Task the report is being graded for.
/// * `report` - Normalized coverage report from a simulator run.
/// * `criteria` - The task's acceptance criteria (validated at load time).
pub fn score(task_id: &str, report: &CoverageReport, criteria: &AcceptanceCriteria) -> EvaluationResult {
    let functional_score = score_functional(report, criteria);
    let code_coverage_score = score_code_coverage(report, criteria);
    let health_score = score_health(report, criteria);

    let total = functional_score * criteria.weights.functional_coverage
        + code_coverage_score * criteria.weights.code_coverage
        + health_score * criteria.weights.health;

    let functional_ok = functional_score >= PASS_THRESHOLD;
    let code_ok = code_coverage_score >= PASS_THRESHOLD;
    let health_ok = health_score >= PASS_THRESHOLD;

    let (functional_bins_met, functional_bins_missed) = check_bins(report, criteria);

    let thresholds_met = BTreeMap::from([
        ("functional_coverage".to_string(), functional_ok),
        ("code_coverage".to_string(), code_ok),
        ("health".to_string(), health_ok),
    ]);

    EvaluationResult {
        task_id: task_id.to_string(),
        passed: functional_ok && code_ok && health_ok,
        score: total,
        functional_score,
        code_coverage_score,
        health_score,
        functional_bins_met,
        functional_bins_missed,
        thresholds_met,
        coverage_report: report.clone(),
        failure_reason: None,
        failed_stage: None,
        log_path: None,
        coverage_db_path: None,
    }
}

/// Score functional coverage (0.0 to 1.0).
pub fn score_functional(report: &CoverageReport, criteria: &AcceptanceCriteria) -> f64 {
    if criteria.functional_bins.is_empty() {
        // A task with no functional requirement cannot fail on this axis.
        return 1.0;
    }

    let min_pct = criteria.functional_min_pct;

    match criteria.functional_strategy {
        FunctionalStrategy::AnyOf => {
            let max_pct = criteria
                .functional_bins
                .iter()
                .map(|name| resolve_target_pct(report, name))
                .fold(0.0, f64::max);
            ratio(max_pct, min_pct)
        }
        FunctionalStrategy::AllOf => {
            let total: f64 = criteria
                .functional_bins
                .iter()
                .map(|name| ratio(resolve_target_pct(report, name), min_pct))
                .sum();
            total / criteria.functional_bins.len() as f64
        }
    }
}

/// Score code coverage (0.0 to 1.0): unweighted mean of the three clamped
/// ratios, so each metric contributes at most its 1/3 share.
pub fn score_code_coverage(report: &CoverageReport, criteria: &AcceptanceCriteria) -> f64 {
    let code = &report.code_coverage;

    let stmt_score = ratio(code.statements_pct, criteria.code_statements_min_pct);
    let branch_score = ratio(code.branches_pct, criteria.code_branches_min_pct);
    let toggle_score = ratio(code.toggles_pct, criteria.code_toggles_min_pct);

    (stmt_score + branch_score + toggle_score) / 3.0
}

/// Score health (0.0 or 1.0). No partial credit.
pub fn score_health(report: &CoverageReport, criteria: &AcceptanceCriteria) -> f64 {
    let health = &report.health;

    if health.uvm_errors > criteria.max_uvm_errors {
        return 0.0;
    }
    if health.uvm_fatals > criteria.max_uvm_fatals {
        return 0.0;
    }
    if health.scoreboard_errors > criteria.max_scoreboard_errors {
        return 0.0;
    }
    if criteria.all_assertions_pass && health.assertion_failures > 0 {
        return 0.0;
    }

    1.0
}

/// Resolve a target name to its coverage percentage.
///
/// Groups are tried first; a dotted name then falls back to splitting on the
/// *last* dot into `(group, bin)`. Unresolvable names score 0.0.
pub fn resolve_target_pct(report: &CoverageReport, name: &str) -> f64 {
    if let Some(group) = report.get_group(name) {
        return group.overall_pct;
    }

    if let Some((group_name, bin_name)) = name.rsplit_once('.') {
        if let Some(group) = report.get_group(group_name) {
            if let Some(bin) = group.get_bin(bin_name) {
                return bin.coverage_pct;
            }
        }
    }

    0.0
}

/// Partition the criteria targets into met/missed by the plain per-target
/// threshold check, independent of the `any_of`/`all_of` aggregate — so the
/// diagnostics show exactly which targets were hit even under `any_of`.
fn check_bins(report: &CoverageReport, criteria: &AcceptanceCriteria) -> (Vec<String>, Vec<String>) {
    let mut met = Vec::new();
    let mut missed = Vec::new();

    for name in &criteria.functional_bins {
        if resolve_target_pct(report, name) >= criteria.functional_min_pct {
            met.push(name.clone());
        } else {
            missed.push(name.clone());
        }
    }

    (met, missed)
}

/// `min(1.0, value / minimum)`, with a zero (or negative) minimum defined as
/// 0.0 instead of a division by zero.
fn ratio(value: f64, minimum: f64) -> f64 {
    if minimum > 0.0 {
        (value / minimum).min(1.0)
    } else {
        0.0
    }
}
