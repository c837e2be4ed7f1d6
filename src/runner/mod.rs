//! Differential runner
//!
//! Runs a candidate and the reference side by side on every generated
//! case and aggregates the verdicts into a [`RunResult`].
//!
//! # Guarantees
//!
//! 1. Cases run strictly in generation order, one at a time
//! 2. Each side gets its own deep copy of the case
//! 3. A panic on either side is recorded as an errored case; the batch
//!    always continues
//! 4. `passed_count + failed_count == total_cases`

mod compare;

pub use compare::{
    floats_match, observations_match, values_match, Observation, DEFAULT_REL_TOL,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::capture::capture;
use crate::function::{Function, Signature};
use crate::value::{TestCase, Value};

/// Why a case failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Both sides completed with different results
    Mismatch,
    /// Either side panicked
    Errored,
}

/// A retained failing case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedCase {
    /// Position in generation order (0-indexed)
    pub index: usize,
    /// Arguments the case was run with
    pub input: TestCase,
    /// Reference observation
    pub expected: Observation,
    /// Candidate observation
    pub actual: Observation,
    /// Failure classification
    pub kind: FailureKind,
}

/// Verdict for one case
#[derive(Debug, Clone, PartialEq)]
pub enum CaseVerdict {
    /// Outputs match
    Passed,
    /// Outputs differ or a side panicked
    Failed(FailedCase),
}

/// Aggregated statistics of one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Cases whose outputs matched
    pub passed_count: usize,
    /// Cases that mismatched or errored
    pub failed_count: usize,
    /// Cases run
    pub total_cases: usize,
    /// Wall-clock time of the batch in seconds
    pub total_time: f64,
    /// Seconds per case
    pub average_time: f64,
    /// Cases per second
    pub test_per_second: f64,
    /// Percentage of passed cases
    pub success_rate: f64,
    /// First failing cases, in generation order
    pub failed_cases: Vec<FailedCase>,
}

/// Shortest elapsed time used for throughput, so an unmeasurably fast
/// batch yields a very large rate instead of a division by zero
const MIN_ELAPSED_SECS: f64 = 1e-9;

impl RunResult {
    fn from_counts(
        passed_count: usize,
        failed_count: usize,
        elapsed: Duration,
        failed_cases: Vec<FailedCase>,
    ) -> Self {
        let total_cases = passed_count + failed_count;
        let total_time = elapsed.as_secs_f64();
        let total = total_cases.max(1) as f64;
        Self {
            passed_count,
            failed_count,
            total_cases,
            total_time,
            average_time: total_time / total,
            test_per_second: total_cases as f64 / total_time.max(MIN_ELAPSED_SECS),
            success_rate: passed_count as f64 / total * 100.0,
            failed_cases,
        }
    }

    /// Whether every case passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count == 0
    }
}

/// Options for a batch run
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Relative tolerance for float comparison
    pub rel_tol: f64,
    /// Number of failing cases retained for reporting
    pub failed_case_limit: usize,
    /// Show a progress bar
    pub show_progress: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            rel_tol: DEFAULT_REL_TOL,
            failed_case_limit: 10,
            show_progress: false,
        }
    }
}

/// Runs a candidate against a reference over a batch of cases
#[derive(Debug)]
pub struct DifferentialRunner<'a> {
    candidate: &'a Function,
    reference: &'a Function,
    signature: Signature,
    options: RunnerOptions,
}

impl<'a> DifferentialRunner<'a> {
    /// Create a runner comparing under `signature`
    #[must_use]
    pub fn new(candidate: &'a Function, reference: &'a Function, signature: Signature) -> Self {
        Self {
            candidate,
            reference,
            signature,
            options: RunnerOptions::default(),
        }
    }

    /// Set runner options
    #[must_use]
    pub fn with_options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }

    /// Run every case
    pub fn run(&self, cases: &[TestCase]) -> RunResult {
        let never = AtomicBool::new(false);
        match self.run_until(cases, &never) {
            Some(result) => result,
            None => unreachable!("batch cancelled without a cancel request"),
        }
    }

    /// Run every case, stopping between cases once `cancel` is set
    ///
    /// Returns `None` when cancelled; partial results are discarded.
    pub fn run_until(&self, cases: &[TestCase], cancel: &AtomicBool) -> Option<RunResult> {
        let progress = self.progress_bar(cases.len());
        let start = Instant::now();

        let mut passed_count = 0;
        let mut failed_count = 0;
        let mut failed_cases = Vec::new();

        for (index, case) in cases.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                progress.abandon();
                return None;
            }
            match self.run_case(index, case) {
                CaseVerdict::Passed => passed_count += 1,
                CaseVerdict::Failed(failed) => {
                    failed_count += 1;
                    if failed_cases.len() < self.options.failed_case_limit {
                        failed_cases.push(failed);
                    }
                }
            }
            progress.inc(1);
        }

        let elapsed = start.elapsed();
        progress.finish_and_clear();
        tracing::debug!(
            passed = passed_count,
            failed = failed_count,
            elapsed_ms = elapsed.as_millis() as u64,
            "batch finished"
        );

        Some(RunResult::from_counts(
            passed_count,
            failed_count,
            elapsed,
            failed_cases,
        ))
    }

    /// Run and classify a single case
    pub fn run_case(&self, index: usize, case: &TestCase) -> CaseVerdict {
        let actual = self.observe(self.candidate, case);
        let expected = self.observe(self.reference, case);

        let kind = if expected.is_error() || actual.is_error() {
            tracing::debug!(index, %expected, %actual, "case errored");
            FailureKind::Errored
        } else if observations_match(&expected, &actual, self.options.rel_tol) {
            return CaseVerdict::Passed;
        } else {
            FailureKind::Mismatch
        };

        CaseVerdict::Failed(FailedCase {
            index,
            input: case.clone(),
            expected,
            actual,
            kind,
        })
    }

    /// Call `function` on its own copy of `case`
    fn observe(&self, function: &Function, case: &TestCase) -> Observation {
        let mut args = case.clone();
        let captured = match capture(|args, out| function.call(args, out), &mut args) {
            Ok(captured) => captured,
            Err(message) => return Observation::Error(message),
        };

        let prints = self.signature.prints_text();
        if self.signature.is_destructive() {
            let output = if prints {
                Value::Str(captured.printed_text)
            } else {
                captured.result
            };
            Observation::Mutated {
                output,
                arguments: args,
            }
        } else if prints {
            Observation::Text(captured.printed_text)
        } else {
            Observation::Value(captured.result)
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        // Template is hardcoded and known to be valid
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Running test cases");
        pb
    }
}
