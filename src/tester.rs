//! Grading entry point
//!
//! [`Tester::run_test`] wires the pipeline together: the case count is
//! checked, the candidate is matched to its exercise by name and its
//! contract is checked, cases are generated, the batch runs under the
//! supervisor, and the report is rendered and emitted. Every
//! configuration problem surfaces before the first case runs.
//!
//! The default [`IsolationMode::Thread`] cannot stop a call that never
//! returns; the timeout is still reported, but that thread keeps running.
//! To reclaim it, use [`IsolationMode::Process`] with
//! [`TesterConfig::with_worker_program`] pointing at an executable that
//! answers through [`serve`](crate::supervisor::serve) with a resolver for
//! its own candidates.

use std::fmt;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{IsolationMode, TesterConfig};
use crate::exercise::Catalog;
use crate::function::Function;
use crate::inspect::check_candidate;
use crate::report::{self, format_report, Verbosity};
use crate::runner::{RunResult, RunnerOptions};
use crate::supervisor::{BatchJob, Isolation, Supervisor, WorkerCommand};
use crate::{Error, Result};

/// Smallest accepted case count
pub const MIN_CASES: usize = 1;

/// Largest accepted case count
pub const MAX_CASES: usize = 1_000_000;

/// Outcome of a graded invocation
#[derive(Debug, Clone, PartialEq)]
pub struct TestSummary {
    /// Aggregated statistics
    pub result: RunResult,
    /// Rendered report
    pub report: String,
    /// Summary file, when the report was written
    pub written_to: Option<PathBuf>,
}

/// Grades candidates against one year's exercises
#[derive(Debug, Clone)]
pub struct Tester {
    config: TesterConfig,
    catalog: Catalog,
}

impl Tester {
    /// Create a tester for the configured year
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config is invalid or the year
    /// has no exercises
    pub fn new(config: TesterConfig) -> Result<Self> {
        let catalog = Catalog::for_year(config.year)?;
        Self::with_catalog(config, catalog)
    }

    /// Create a tester over an explicit catalog
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config is invalid
    pub fn with_catalog(config: TesterConfig, catalog: Catalog) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, catalog })
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    /// Exercises available to this tester
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Names of the gradable functions
    #[must_use]
    pub fn available_functions(&self) -> Vec<&str> {
        self.catalog.names()
    }

    /// Grade `candidate` on `num_test_cases` generated cases
    ///
    /// Uses the configured default when no count is given.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCaseCount`] outside `1..=1_000_000`
    /// - [`Error::UnknownFunction`] when no exercise has the candidate's name
    /// - [`Error::MismatchedContract`] when the contracts disagree
    /// - [`Error::Timeout`] when the batch exceeds the runtime limit
    /// - [`Error::Output`] when the report cannot be written
    pub fn run_test(
        &self,
        candidate: &Function,
        num_test_cases: Option<usize>,
    ) -> Result<TestSummary> {
        let n = num_test_cases.unwrap_or(self.config.num_test_cases);
        check_case_count(n)?;

        let exercise = self.catalog.get(candidate.name())?;
        let mut rng = self.rng();
        let signature = check_candidate(candidate, exercise, &mut rng)?;
        let cases = exercise.generate(n, &mut rng)?;

        tracing::info!(
            function = candidate.name(),
            label = candidate.label(),
            cases = cases.len(),
            %signature,
            "testing candidate"
        );

        let job = BatchJob {
            year: self.catalog.year(),
            candidate: candidate.clone(),
            reference: exercise.reference().clone(),
            signature,
            cases,
            options: RunnerOptions {
                rel_tol: self.config.float_tolerance,
                failed_case_limit: self.config.failed_case_limit,
                show_progress: !self.config.debug,
            },
        };
        let result = self.supervisor()?.run(job)?;

        let report = format_report(
            &result,
            self.config.show_table,
            Verbosity::from_more_detail(self.config.more_detail),
        );
        let written_to = report::emit(
            &report,
            self.config.log_option,
            &self.config.output_dir,
            self.catalog.year(),
        )?;

        Ok(TestSummary {
            result,
            report,
            written_to,
        })
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn supervisor(&self) -> Result<Supervisor> {
        let isolation = match self.config.isolation {
            IsolationMode::Thread => Isolation::Thread,
            IsolationMode::Process => Isolation::Process(match &self.config.worker_program {
                Some(program) => WorkerCommand::new(program),
                None => WorkerCommand::current_exe()?,
            }),
        };
        Ok(Supervisor::new(self.config.runtime_limit(), isolation))
    }
}

impl fmt::Display for Tester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.catalog)
    }
}

/// Check a requested case count
///
/// # Errors
///
/// Returns [`Error::InvalidCaseCount`] outside `MIN_CASES..=MAX_CASES`
pub fn check_case_count(n: usize) -> Result<()> {
    if (MIN_CASES..=MAX_CASES).contains(&n) {
        Ok(())
    } else {
        Err(Error::InvalidCaseCount {
            requested: n,
            min: MIN_CASES,
            max: MAX_CASES,
        })
    }
}
