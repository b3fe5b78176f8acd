//! Questa Coverage Report Parser
//!
//! This module provides the [`QuestaCoverageParser`] for normalizing
//! Questa/ModelSim `vcover report` text output into a [`CoverageReport`].
//!
//! # Report Format
//!
//! The functional section lists covergroups with two percentage columns
//! (metric, goal) followed by their coverpoints and bins:
//!
//! ```text
//! Covergroup Coverage:
//! =============================================
//! apb_master_coverage/apb_tx_cg      67.5%       100.0%   Uncovered
//!
//!   Coverpoint cp_paddr               75.0%       100.0%   Uncovered
//!     bin paddr_low                      10          1   Covered
//!     bin paddr_high                      0          1   ZERO
//! ```
//!
//! The code coverage summary uses labelled percentages
//! (`Statement Coverage: 75.3%`, Branch/Toggle/FSM/Expression likewise).
//!
//! # Parsing Strategy
//!
//! Functional coverage is scanned with a two-state line machine
//! ([`ScanState`]): `SeekingGroup` looks for a slash-qualified group header,
//! `InBinList` collects `bin <name> <hits> <goal>` lines until a line that is
//! neither a bin, a blank, nor a `Coverpoint`/`Cross` sub-header closes the
//! group. The closing line is re-examined as a potential next header, so
//! adjacent groups need no separator. Groups with zero bins are valid.

use crate::parsers::uvm_log::UvmLogParser;
use crate::report::{CodeCoverage, CoverageBin, CoverageGroup, CoverageReport};
use crate::traits::coverage_parser::CoverageParser;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::error;

/// Parse Questa vcover report output into a normalized [`CoverageReport`].
pub struct QuestaCoverageParser;

/// States of the functional coverage line machine.
enum ScanState {
    SeekingGroup,
    InBinList,
}

impl CoverageParser for QuestaCoverageParser {
    fn simulator(&self) -> util::simulators::Simulator {
        util::simulators::Simulator::Questa
    }

    /// Parse a Questa coverage report.
    ///
    /// # Arguments
    ///
    /// * `report_path` - Path to the vcover report text file.
    /// * `log_path` - Optional path to the simulation log for health metrics.
    ///
    /// Missing or unreadable reports yield an empty report; the error is
    /// logged, never raised.
    fn parse(&self, report_path: &Path, log_path: Option<&Path>) -> CoverageReport {
        let mut report = CoverageReport::empty(self.simulator(), Some(report_path.to_path_buf()));

        if report_path.exists() {
            match fs::read_to_string(report_path) {
                Ok(content) => {
                    report.functional_groups = parse_functional_coverage(&content);
                    report.code_coverage = parse_code_coverage(&content);
                }
                Err(e) => {
                    error!(
                        "Error reading Questa coverage report {}: {e}",
                        report_path.display()
                    );
                }
            }
        }

        if let Some(log) = log_path {
            if log.exists() {
                report.health = UvmLogParser.parse_health(log);
            }
        }

        report
    }
}

/// Parse functional coverage groups and bins from a vcover report.
fn parse_functional_coverage(content: &str) -> Vec<CoverageGroup> {
    // Group header: slash-qualified covergroup name followed by metric and
    // goal percentages. The slash requirement keeps coverpoint rows (which
    // also carry two percentages) from opening a group.
    let header_re = Regex::new(r"^(\S+/\S+)\s+(\d+\.?\d*)%\s+(\d+\.?\d*)%").unwrap();
    // Bin row: "bin name    hits    goal    status"
    let bin_re = Regex::new(r"^bin\s+(\w+)\s+(\d+)\s+(\d+)").unwrap();

    let mut groups = Vec::new();
    let mut state = ScanState::SeekingGroup;
    let mut current: Option<(String, f64, Vec<CoverageBin>)> = None;

    for raw_line in content.lines() {
        let line = raw_line.trim();

        if let Some(caps) = header_re.captures(line) {
            if let Some((name, overall_pct, bins)) = current.take() {
                groups.push(CoverageGroup {
                    name,
                    overall_pct,
                    bins,
                });
            }
            let overall_pct = caps[2].parse().unwrap_or(0.0);
            current = Some((caps[1].to_string(), overall_pct, Vec::new()));
            state = ScanState::InBinList;
            continue;
        }

        if let ScanState::InBinList = state {
            if let Some(caps) = bin_re.captures(line) {
                let hits = caps[2].parse().unwrap_or(0);
                let goal = caps[3].parse().unwrap_or(0);
                if let Some((_, _, bins)) = current.as_mut() {
                    bins.push(CoverageBin::new(&caps[1], hits, goal));
                }
            } else if line.starts_with("bin ") {
                // Alternative bin formats (arrays, transitions) are skipped.
            } else if !line.is_empty()
                && !line.starts_with("Coverpoint")
                && !line.starts_with("Cross")
            {
                if let Some((name, overall_pct, bins)) = current.take() {
                    groups.push(CoverageGroup {
                        name,
                        overall_pct,
                        bins,
                    });
                }
                state = ScanState::SeekingGroup;
            }
        }
    }

    if let Some((name, overall_pct, bins)) = current.take() {
        groups.push(CoverageGroup {
            name,
            overall_pct,
            bins,
        });
    }

    groups
}

/// Parse code coverage metrics from the labelled summary lines.
fn parse_code_coverage(content: &str) -> CodeCoverage {
    CodeCoverage {
        statements_pct: labelled_pct(content, r"(?i)Statement\s+Coverage:\s*(\d+\.?\d*)%"),
        branches_pct: labelled_pct(content, r"(?i)Branch\s+Coverage:\s*(\d+\.?\d*)%"),
        toggles_pct: labelled_pct(content, r"(?i)Toggle\s+Coverage:\s*(\d+\.?\d*)%"),
        fsm_pct: labelled_pct(content, r"(?i)FSM\s+Coverage:\s*(\d+\.?\d*)%"),
        expressions_pct: labelled_pct(content, r"(?i)Expression\s+Coverage:\s*(\d+\.?\d*)%"),
    }
}

/// First percentage captured by `pattern`, or 0.0 when absent.
fn labelled_pct(content: &str, pattern: &str) -> f64 {
    Regex::new(pattern)
        .unwrap()
        .captures(content)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0.0)
}
