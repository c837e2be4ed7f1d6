//! Error types for mygrader
//!
//! Configuration errors (the harness was called incorrectly) are kept
//! distinct from everything the candidate itself got wrong. Wrong answers,
//! panics and errors inside graded code never surface here; they are
//! recorded as failed cases in a [`RunResult`](crate::runner::RunResult).

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for mygrader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while grading
#[derive(Error, Debug)]
pub enum Error {
    /// No reference exercise with this name exists for the selected year
    #[error("invalid function name: {0}")]
    UnknownFunction(String),

    /// Candidate and reference disagree on their contract
    #[error("mismatched contract for {function}: expected {expected}, got {found}")]
    MismatchedContract {
        /// Exercise name
        function: String,
        /// Contract declared by the reference implementation
        expected: String,
        /// Contract declared by (or inferred from) the candidate
        found: String,
    },

    /// Requested case count is outside the accepted range
    #[error("invalid number of test cases: {requested} (must be between {min} and {max})")]
    InvalidCaseCount {
        /// Requested count
        requested: usize,
        /// Lower bound (inclusive)
        min: usize,
        /// Upper bound (inclusive)
        max: usize,
    },

    /// The whole batch exceeded the runtime limit
    #[error("function {function} timed out after {limit_ms}ms")]
    Timeout {
        /// Exercise name
        function: String,
        /// Configured limit in milliseconds
        limit_ms: u64,
    },

    /// Probing a function to infer its signature failed
    #[error("could not inspect {function}: {message}")]
    Probe {
        /// Function name
        function: String,
        /// Panic or shape message
        message: String,
    },

    /// The exercise generator produced malformed cases
    #[error("generation error: {0}")]
    Generation(String),

    /// The isolated worker process misbehaved
    #[error("worker error: {0}")]
    Worker(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Report destination could not be written
    #[error("cannot write report to {}: {source}", path.display())]
    Output {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether this error means the harness was invoked incorrectly
    ///
    /// These are raised before any case runs and are never the
    /// candidate's fault.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownFunction(_)
                | Self::MismatchedContract { .. }
                | Self::InvalidCaseCount { .. }
                | Self::Probe { .. }
                | Self::Generation(_)
                | Self::Configuration(_)
                | Self::Output { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
