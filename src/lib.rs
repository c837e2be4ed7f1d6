//! mygrader - Differential Grading Harness for Programming Exercises
//!
//! mygrader grades a learner's implementation of a small exercise by
//! running it side by side with a known-correct reference on randomly
//! generated inputs and reporting how many cases agreed.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MYGRADER                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Inspect   →   Generate   →   Run (supervised)   →   Report  │
//! │  contract      cases          candidate vs ref       summary │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mygrader::{Function, Tester, TesterConfig};
//!
//! let tester = Tester::new(TesterConfig::new(2023).with_show_table(true))?;
//! let candidate = Function::returning("calculate_sum", |(x, y): (i64, i64)| {
//!     (x..=y).sum::<i64>()
//! });
//! let summary = tester.run_test(&candidate, Some(100))?;
//! println!("{} passed", summary.result.passed_count);
//! # Ok::<(), mygrader::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`value`] - Dynamic argument and result values
//! - [`function`] - Callables with declared or inferred contracts
//! - [`capture`] - Printed output capture
//! - [`inspect`] - Contract inference and compatibility checks
//! - [`exercise`] - Reference implementations and case generators
//! - [`runner`] - Differential execution and comparison
//! - [`supervisor`] - Batch timeouts with thread or process isolation
//! - [`report`] - Summary rendering and emission
//! - [`tester`] - End-to-end grading entry point

// Note: Lint configuration is in Cargo.toml [lints]
#![forbid(unsafe_code)]

pub mod capture;
pub mod config;
pub mod error;
pub mod exercise;
pub mod function;
pub mod inspect;
pub mod report;
pub mod runner;
pub mod submissions;
pub mod supervisor;
pub mod tester;
pub mod value;

pub use config::{IsolationMode, LogOption, TesterConfig};
pub use error::{Error, Result};
pub use function::{Effect, Function, ReturnKind, Signature};
pub use runner::{FailedCase, FailureKind, Observation, RunResult};
pub use tester::{TestSummary, Tester};
pub use value::{TestCase, Value, ValueType};
