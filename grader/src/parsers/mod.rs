//!
//! Parsers Module
//!
//! This module contains the vendor coverage report parsers and the log health
//! parser, plus the [`ParserRegistry`] mapping each [`Simulator`] to its
//! parser.
//!
//! - [`questa`]: Questa/ModelSim vcover report parser.
//! - [`xcelium`]: Xcelium IMC report parser.
//! - [`uvm_log`]: vendor-independent UVM log health parser.

pub mod questa;
pub mod uvm_log;
pub mod xcelium;

use crate::traits::coverage_parser::CoverageParser;
use std::collections::HashMap;
use util::simulators::Simulator;

/// Immutable mapping from simulator to report parser.
///
/// Built explicitly once at process start and passed down to the evaluation
/// pipeline; there is no global registry mutated at import time, so parser
/// resolution never depends on initialization order.
pub struct ParserRegistry {
    parsers: HashMap<Simulator, Box<dyn CoverageParser + Send + Sync>>,
}

impl ParserRegistry {
    /// An empty registry; useful when wiring up a custom parser set.
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Registry with all built-in parsers.
    pub fn with_defaults() -> Self {
        Self::new()
            .register(Box::new(questa::QuestaCoverageParser))
            .register(Box::new(xcelium::XceliumCoverageParser))
    }

    /// Add a parser, keyed by the simulator it reports for. A later
    /// registration for the same simulator replaces the earlier one.
    pub fn register(mut self, parser: Box<dyn CoverageParser + Send + Sync>) -> Self {
        self.parsers.insert(parser.simulator(), parser);
        self
    }

    /// Parser for a simulator, if one is registered.
    pub fn get(&self, simulator: Simulator) -> Option<&(dyn CoverageParser + Send + Sync)> {
        self.parsers.get(&simulator).map(|p| p.as_ref())
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
