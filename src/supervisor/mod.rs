//! Timeout supervision for whole batches
//!
//! A batch either completes within the runtime limit and yields its
//! [`RunResult`], or the invocation fails with [`Error::Timeout`]. Partial
//! results are never reported.
//!
//! # Isolation
//!
//! - [`Isolation::Thread`]: the batch runs on a worker thread and the
//!   result comes back over a single-slot channel. On timeout the runner
//!   is told to stop before its next case. A call that never returns keeps
//!   its thread alive until the process exits.
//! - [`Isolation::Process`]: the batch runs in a child process that is
//!   killed and reaped on timeout, so even a runaway loop inside one call
//!   is reclaimed.

mod process;
mod worker;

pub use worker::{serve, WorkerRequest, WorkerResponse};

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crate::function::{Function, Signature};
use crate::runner::{DifferentialRunner, RunResult, RunnerOptions};
use crate::value::TestCase;
use crate::{Error, Result};

/// Command that starts a worker process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    /// Executable path
    pub program: PathBuf,
    /// Arguments selecting worker mode
    pub args: Vec<String>,
}

impl WorkerCommand {
    /// Run `program worker`
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec!["worker".to_string()],
        }
    }

    /// Re-run the current executable in worker mode
    ///
    /// # Errors
    ///
    /// Returns an error if the current executable cannot be located
    pub fn current_exe() -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }
}

/// Where a batch runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Isolation {
    /// On a worker thread of this process
    Thread,
    /// In a separate worker process
    Process(WorkerCommand),
}

/// Everything needed to run one batch
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Course year the exercise belongs to
    pub year: u16,
    /// Function under test
    pub candidate: Function,
    /// Reference implementation
    pub reference: Function,
    /// Contract the batch is compared under
    pub signature: Signature,
    /// Cases in generation order
    pub cases: Vec<TestCase>,
    /// Runner options
    pub options: RunnerOptions,
}

impl BatchJob {
    /// Run the batch on the current thread
    pub fn run(&self, cancel: &AtomicBool) -> Option<RunResult> {
        DifferentialRunner::new(&self.candidate, &self.reference, self.signature)
            .with_options(self.options.clone())
            .run_until(&self.cases, cancel)
    }
}

/// Runs batches under a wall-clock limit
#[derive(Debug, Clone)]
pub struct Supervisor {
    limit: Duration,
    isolation: Isolation,
}

impl Supervisor {
    /// Create a supervisor
    #[must_use]
    pub fn new(limit: Duration, isolation: Isolation) -> Self {
        Self { limit, isolation }
    }

    /// Runtime limit for a batch
    #[must_use]
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Run `job` to completion or fail with [`Error::Timeout`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] when the limit is exceeded, or
    /// [`Error::Worker`] when the isolated unit fails to deliver a result
    pub fn run(&self, job: BatchJob) -> Result<RunResult> {
        tracing::info!(
            function = job.candidate.name(),
            cases = job.cases.len(),
            limit_ms = self.limit_ms(),
            isolation = ?self.isolation,
            "running batch"
        );
        let function = job.candidate.name().to_string();
        let outcome = match &self.isolation {
            Isolation::Thread => self.run_in_thread(job),
            Isolation::Process(command) => {
                let request = WorkerRequest::from_job(&job);
                process::run_in_process(command, &request, self.limit)
            }
        };
        match outcome {
            Ok(Some(result)) => Ok(result),
            Ok(None) => {
                tracing::warn!(function, limit_ms = self.limit_ms(), "batch timed out");
                Err(Error::Timeout {
                    function,
                    limit_ms: self.limit_ms(),
                })
            }
            Err(err) => Err(err),
        }
    }

    fn limit_ms(&self) -> u64 {
        self.limit.as_millis() as u64
    }

    /// `Ok(None)` means the deadline passed
    fn run_in_thread(&self, job: BatchJob) -> Result<Option<RunResult>> {
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::sync_channel(1);

        let flag = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name("mygrader-batch".to_string())
            .spawn(move || {
                if let Some(result) = job.run(&flag) {
                    let _ = tx.send(result);
                }
            })?;

        match rx.recv_timeout(self.limit) {
            Ok(result) => {
                let _ = handle.join();
                Ok(Some(result))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // Stops the runner at its next case boundary; the receiver
                // is dropped so a late result is discarded
                cancel.store(true, Ordering::Relaxed);
                drop(handle);
                Ok(None)
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                let _ = handle.join();
                Err(Error::Worker(
                    "batch thread exited without a result".to_string(),
                ))
            }
        }
    }
}
