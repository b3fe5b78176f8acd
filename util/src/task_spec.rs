//! Typed task specifications.
//!
//! A [`TaskSpec`] is the structured form of one gym task: identity, the
//! verification goal, and the [`AcceptanceCriteria`] its solutions are graded
//! against. Rendering and parsing of the human-readable task documents lives
//! with the task generator; this module only deals in the typed object and
//! its JSON form.

use crate::acceptance_criteria::AcceptanceCriteria;
use crate::simulators::Simulator;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Task difficulty levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskLevel {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TaskSpec {
    pub id: String,
    pub name: String,

    #[serde(default = "default_level")]
    pub level: TaskLevel,

    pub bench_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub goal: String,

    pub acceptance: AcceptanceCriteria,

    #[serde(default)]
    pub hints: Vec<String>,

    /// Original test files removed from the gym, kept for auditing.
    #[serde(default)]
    pub original_test_files: Vec<PathBuf>,

    #[serde(default)]
    pub supported_simulators: Vec<Simulator>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl TaskSpec {
    /// Test name a solution is expected to register: the stem of the first
    /// original test file, falling back to `{id}_test`.
    pub fn infer_test_name(&self) -> String {
        if let Some(file) = self.original_test_files.first() {
            if let Some(stem) = file.file_stem().and_then(|s| s.to_str()) {
                return stem.to_string();
            }
        }
        format!("{}_test", self.id)
    }

    /// Parses a task from a JSON string, validating its acceptance criteria.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let task: TaskSpec =
            serde_json::from_str(raw).map_err(|e| format!("Invalid task JSON: {e}"))?;
        task.acceptance.validate()?;
        Ok(task)
    }

    /// Loads and validates a task from a JSON file.
    pub fn load(path: &std::path::Path) -> Result<Self, String> {
        use std::io::ErrorKind;

        let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => "Task file not found".to_string(),
            ErrorKind::PermissionDenied => "Permission denied reading task file".to_string(),
            _ => format!("Failed to read task file: {e}"),
        })?;
        Self::from_json(&raw)
    }
}

fn default_level() -> TaskLevel {
    TaskLevel::Medium
}
