//! Grader Error Types
//!
//! This module defines the [`GraderError`] enum, which covers the failure
//! modes of persisting and re-loading evaluation artifacts. Report parsing
//! deliberately has no error type: parsers degrade to an empty model instead
//! of failing, so a half-readable coverage report still produces a scorable
//! (if zero) result.

/// Represents all error types that can occur in the grader system.
#[derive(Debug)]
pub enum GraderError {
    /// I/O error (file not found, unreadable, not writable, etc.).
    IoError(String),
    /// JSON is malformed or does not match the expected schema.
    InvalidJson(String),
}
