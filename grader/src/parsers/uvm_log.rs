//! UVM Log Health Parser
//!
//! This module provides the [`UvmLogParser`] for extracting [`HealthMetrics`]
//! from a plain-text simulation log, independent of simulator vendor. Each
//! signal category (UVM errors/fatals/warnings, scoreboard errors, assertion
//! failures, timeouts, compilation errors) is counted by its own set of
//! case-insensitive patterns, summed across the set.
//!
//! A single log line that matches two patterns of the same category is
//! counted twice. This over-count is a known property of the counting scheme
//! and is kept as-is: changing it would shift historical scoring outcomes.
//!
//! A missing log file yields all-zero metrics, which reads as "healthy".
//! Distinguishing "no log was produced" from "a clean log" is the pipeline's
//! responsibility, before this parser is consulted.

use crate::report::HealthMetrics;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::error;

const UVM_ERROR_PATTERN: &str = r"(?i)UVM_ERROR(?:\s+@|\s+:|\s*\])";
const UVM_FATAL_PATTERN: &str = r"(?i)UVM_FATAL(?:\s+@|\s+:|\s*\])";
const UVM_WARNING_PATTERN: &str = r"(?i)UVM_WARNING(?:\s+@|\s+:|\s*\])";

const SCOREBOARD_PATTERNS: &[&str] = &[
    r"(?i)scoreboard.*?error",
    r"(?i)scoreboard.*?mismatch",
    r"(?i)compare\s+failed",
    r"(?i)data\s+mismatch",
];

const ASSERTION_PATTERNS: &[&str] = &[
    r"(?i)assertion\s+failed",
    r"(?i)error:.*?assertion",
    r"(?i)fatal:.*?assertion",
    r"(?i)\*\*\s*Error.*?assert",
];

const TIMEOUT_PATTERNS: &[&str] = &[
    r"(?i)timeout",
    r"(?i)time.*?limit.*?exceeded",
    r"(?i)simulation.*?killed",
];

const COMPILATION_PATTERNS: &[&str] = &[
    r"(?i)\*\*\s*Error:",
    r"(?i)compilation\s+failed",
    r"(?i)syntax\s+error",
];

/// Parse UVM simulation logs for health metrics.
pub struct UvmLogParser;

impl UvmLogParser {
    /// Parse health metrics from a UVM log.
    ///
    /// # Arguments
    ///
    /// * `log_path` - Path to the simulation log file.
    ///
    /// # Returns
    ///
    /// [`HealthMetrics`] with error/warning counts; all zeros when the log
    /// does not exist or cannot be read.
    pub fn parse_health(&self, log_path: &Path) -> HealthMetrics {
        let mut metrics = HealthMetrics::default();

        if !log_path.exists() {
            return metrics;
        }

        let content = match fs::read_to_string(log_path) {
            Ok(content) => content,
            Err(e) => {
                error!("Error reading log {}: {e}", log_path.display());
                return metrics;
            }
        };

        metrics.uvm_errors = count_matches(&content, &[UVM_ERROR_PATTERN]);
        metrics.uvm_fatals = count_matches(&content, &[UVM_FATAL_PATTERN]);
        metrics.uvm_warnings = count_matches(&content, &[UVM_WARNING_PATTERN]);
        metrics.scoreboard_errors = count_matches(&content, SCOREBOARD_PATTERNS);
        metrics.assertion_failures = count_matches(&content, ASSERTION_PATTERNS);
        metrics.simulation_timeout = matches_any(&content, TIMEOUT_PATTERNS);
        metrics.compilation_errors = count_matches(&content, COMPILATION_PATTERNS);

        metrics
    }

    /// Extract functional coverage counters from log messages.
    ///
    /// Useful for open-source simulators without full covergroup support
    /// (e.g. Verilator), where the testbench emits counter messages like:
    ///
    /// ```text
    /// [COUNTER] burst_type_incr: 15
    /// [COV] addr_aligned: 23
    /// ```
    ///
    /// # Returns
    ///
    /// A map of counter name to value; empty when the log does not exist.
    pub fn extract_coverage_counters(&self, log_path: &Path) -> BTreeMap<String, u64> {
        let mut counters = BTreeMap::new();

        if !log_path.exists() {
            return counters;
        }

        let content = match fs::read_to_string(log_path) {
            Ok(content) => content,
            Err(e) => {
                error!("Error reading log {}: {e}", log_path.display());
                return counters;
            }
        };

        let pattern = Regex::new(r"\[(COUNTER|COV)\]\s+(\w+):\s+(\d+)").unwrap();
        for caps in pattern.captures_iter(&content) {
            let name = caps[2].to_string();
            let value = caps[3].parse().unwrap_or(0);
            counters.insert(name, value);
        }

        counters
    }
}

/// Sum of non-overlapping matches across all patterns of one category.
fn count_matches(content: &str, patterns: &[&str]) -> u64 {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap().find_iter(content).count() as u64)
        .sum()
}

/// True if any pattern of the category matches (first match wins).
fn matches_any(content: &str, patterns: &[&str]) -> bool {
    patterns
        .iter()
        .any(|p| Regex::new(p).unwrap().is_match(content))
}
