//! Xcelium IMC Coverage Report Parser
//!
//! This module provides the [`XceliumCoverageParser`] for normalizing Xcelium
//! IMC report output into a [`CoverageReport`]. The artifact is either a
//! report directory (`functional.txt` + `code.txt`) or a single file holding
//! both sections.
//!
//! # Functional Format
//!
//! IMC reports functional coverage as one table row per covergroup instance,
//! prefixed with tree-drawing characters and carrying only aggregate counts:
//!
//! ```text
//! name                                     Functional Average   Functional Covered
//! | | | |--apb_master_cov_h                21.18%               4.83% (7/145)
//! ```
//!
//! Per-bin identity is not available, so bins are synthesized: `met` fully
//! covered placeholders plus `total - met` zero-coverage placeholders. The
//! same instance can appear in several summary sections; the first
//! occurrence of a group name wins and later ones are dropped.
//!
//! # Code Format
//!
//! The code table's rows don't align to fixed-width columns (the hierarchical
//! name prefix varies per row), so values are matched to columns by
//! *position*: each column keyword's character offset in the header row
//! claims every percentage token within [`COLUMN_PROXIMITY`] characters of
//! it, and the claimed values are averaged per column across all rows.

use crate::parsers::uvm_log::UvmLogParser;
use crate::report::{CodeCoverage, CoverageBin, CoverageGroup, CoverageReport};
use crate::traits::coverage_parser::CoverageParser;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::error;

/// Maximum distance (in characters) between a percentage token and a column
/// keyword for the token to be assigned to that column.
const COLUMN_PROXIMITY: usize = 20;

/// Code coverage table columns, in claim-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Block,
    Expression,
    Toggle,
    Statement,
    Fsm,
}

impl Column {
    /// Header keyword locating this column.
    fn keyword(self) -> &'static str {
        match self {
            Column::Block => "Block",
            Column::Expression => "Expression",
            Column::Toggle => "Toggle",
            Column::Statement => "Statement",
            Column::Fsm => "Fsm Average",
        }
    }
}

const COLUMNS: [Column; 5] = [
    Column::Block,
    Column::Expression,
    Column::Toggle,
    Column::Statement,
    Column::Fsm,
];

/// Parse Xcelium IMC coverage reports into a normalized [`CoverageReport`].
pub struct XceliumCoverageParser;

impl CoverageParser for XceliumCoverageParser {
    fn simulator(&self) -> util::simulators::Simulator {
        util::simulators::Simulator::Xcelium
    }

    /// Parse an Xcelium coverage report.
    ///
    /// # Arguments
    ///
    /// * `report_path` - Path to the IMC report directory or a single text file.
    /// * `log_path` - Optional path to the simulation log for health metrics.
    ///
    /// Missing or unreadable artifacts yield an empty report; errors are
    /// logged, never raised.
    fn parse(&self, report_path: &Path, log_path: Option<&Path>) -> CoverageReport {
        let mut report = CoverageReport::empty(self.simulator(), Some(report_path.to_path_buf()));

        if report_path.is_dir() {
            let functional_file = report_path.join("functional.txt");
            let code_file = report_path.join("code.txt");

            if functional_file.exists() {
                match fs::read_to_string(&functional_file) {
                    Ok(content) => {
                        report.functional_groups = parse_functional_coverage(&content);
                    }
                    Err(e) => error!(
                        "Error reading IMC functional report {}: {e}",
                        functional_file.display()
                    ),
                }
            }

            if code_file.exists() {
                match fs::read_to_string(&code_file) {
                    Ok(content) => {
                        report.code_coverage = parse_code_coverage(&content);
                    }
                    Err(e) => {
                        error!("Error reading IMC code report {}: {e}", code_file.display())
                    }
                }
            }
        } else if report_path.exists() {
            // Single file containing all coverage sections.
            match fs::read_to_string(report_path) {
                Ok(content) => {
                    report.functional_groups = parse_functional_coverage(&content);
                    report.code_coverage = parse_code_coverage(&content);
                }
                Err(e) => error!(
                    "Error reading IMC coverage report {}: {e}",
                    report_path.display()
                ),
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

/// Parse functional coverage rows, synthesizing placeholder bins from the
/// aggregate `(met/total)` counts.
fn parse_functional_coverage(content: &str) -> Vec<CoverageGroup> {
    // Trailing "pct% (met/total)" of the Functional Covered column.
    let covered_re = Regex::new(r"(\d+\.?\d*)%\s+\((\d+)/(\d+)\)\s*$").unwrap();

    let mut groups = Vec::new();

    for line in content.lines() {
        // Skip header and separator lines.
        if line.is_empty() || line.contains("---") || line.to_lowercase().contains("name") {
            continue;
        }

        // Data rows carry a percentage and a bin-count fraction.
        if !(line.contains('%') && line.contains('(') && line.contains('/')) {
            continue;
        }

        // Instance name: first token after the tree-drawing prefix.
        let stripped = line.trim_start_matches(['|', '-', ' ']);
        let Some(name) = stripped.split_whitespace().next() else {
            continue;
        };
        if name == "n/a" {
            continue;
        }

        let Some(caps) = covered_re.captures(line) else {
            continue;
        };
        let overall_pct: f64 = caps[1].parse().unwrap_or(0.0);
        let bins_met: u64 = caps[2].parse().unwrap_or(0);
        let bins_total: u64 = caps[3].parse().unwrap_or(0);

        let mut bins = Vec::with_capacity(bins_total as usize);
        for i in 0..bins_met {
            bins.push(CoverageBin::new(format!("bin_{i}"), 1, 1));
        }
        for i in bins_met..bins_total {
            bins.push(CoverageBin::new(format!("bin_{i}"), 0, 1));
        }

        // Instance "apb_master_cov_h" reports covergroup "apb_master"; keep
        // the instance prefix so criteria can address the exact row.
        let group_name = name.replace("_h", "").replace("_cov", "");
        groups.push(CoverageGroup {
            name: format!("{name}.{group_name}_covergroup"),
            overall_pct,
            bins,
        });
    }

    // Deduplicate by name, first occurrence wins.
    let mut seen = HashSet::new();
    groups.retain(|g| seen.insert(g.name.clone()));
    groups
}

/// Parse the code coverage table by column position.
fn parse_code_coverage(content: &str) -> CodeCoverage {
    let lines: Vec<&str> = content.lines().collect();

    let Some(header_idx) = lines
        .iter()
        .position(|l| l.contains("Block") && l.contains("Expression") && l.contains("Toggle"))
    else {
        return CodeCoverage::default();
    };
    let header_line = lines[header_idx];

    // Character offset of each column keyword present in the header.
    let offsets: Vec<(Column, usize)> = COLUMNS
        .iter()
        .filter_map(|&col| header_line.find(col.keyword()).map(|pos| (col, pos)))
        .collect();

    let pct_re = Regex::new(r"(\d+\.?\d*)%").unwrap();
    let mut samples: HashMap<Column, Vec<f64>> = HashMap::new();

    for (i, line) in lines.iter().enumerate() {
        // Skip the header, its separator, and tool chatter.
        if i <= header_idx + 1 {
            continue;
        }
        if line.is_empty() || line.to_lowercase().contains("batch mode") || line.contains("IMC(") {
            continue;
        }

        for caps in pct_re.captures_iter(line) {
            let value: f64 = caps[1].parse().unwrap_or(0.0);
            let pos = caps.get(0).unwrap().start();

            // First column whose keyword is within the proximity window
            // claims the token; priority follows COLUMNS order.
            let claimed = offsets
                .iter()
                .find(|(_, offset)| pos.abs_diff(*offset) < COLUMN_PROXIMITY);
            if let Some((col, _)) = claimed {
                samples.entry(*col).or_default().push(value);
            }
        }
    }

    let average = |col: Column| -> Option<f64> {
        samples
            .get(&col)
            .filter(|values| !values.is_empty())
            .map(|values| values.iter().sum::<f64>() / values.len() as f64)
    };

    let mut code = CodeCoverage::default();
    // IMC has no stable statement/branch summary across versions; the Block
    // column average stands in for both. Statement-column tokens are still
    // position-claimed above so they cannot leak into a neighboring window.
    if let Some(block) = average(Column::Block) {
        code.statements_pct = block;
        code.branches_pct = block;
    }
    if let Some(expressions) = average(Column::Expression) {
        code.expressions_pct = expressions;
    }
    if let Some(toggles) = average(Column::Toggle) {
        code.toggles_pct = toggles;
    }
    if let Some(fsm) = average(Column::Fsm) {
        code.fsm_pct = fsm;
    }
    code
}
