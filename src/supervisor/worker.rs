//! Worker side of process isolation
//!
//! Functions cannot cross a process boundary, so the request names the
//! candidate by label and the worker resolves it again on its side. The
//! reference comes from the worker's own catalog.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::BatchJob;
use crate::exercise::Catalog;
use crate::function::{Function, Signature};
use crate::runner::{DifferentialRunner, RunResult, RunnerOptions};
use crate::value::TestCase;
use crate::{Error, Result};

/// One batch sent to a worker process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    /// Course year of the exercise
    pub year: u16,
    /// Exercise (and reference) name
    pub exercise: String,
    /// Label the candidate is resolved by
    pub candidate: String,
    /// Contract checked by the parent
    pub signature: Signature,
    /// Cases in generation order
    pub cases: Vec<TestCase>,
    /// Relative float tolerance
    pub rel_tol: f64,
    /// Number of failing cases to retain
    pub failed_case_limit: usize,
}

impl WorkerRequest {
    /// Describe `job` for a worker process
    #[must_use]
    pub fn from_job(job: &BatchJob) -> Self {
        Self {
            year: job.year,
            exercise: job.reference.name().to_string(),
            candidate: job.candidate.label().to_string(),
            signature: job.signature,
            cases: job.cases.clone(),
            rel_tol: job.options.rel_tol,
            failed_case_limit: job.options.failed_case_limit,
        }
    }
}

/// Single response written by a worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerResponse {
    /// The batch ran to completion
    Completed(RunResult),
    /// The request could not be served
    Rejected(String),
}

/// Read one request from `input`, run it and write the response to `output`
///
/// `resolve` maps a candidate label to its function.
///
/// # Errors
///
/// Returns an error if the request cannot be decoded or the response
/// cannot be written. Problems with the request itself are reported in
/// a [`WorkerResponse::Rejected`].
pub fn serve<R, W, F>(input: R, mut output: W, resolve: F) -> Result<()>
where
    R: Read,
    W: Write,
    F: Fn(&str) -> Option<Function>,
{
    let request: WorkerRequest = serde_json::from_reader(input)?;
    tracing::debug!(
        exercise = %request.exercise,
        candidate = %request.candidate,
        cases = request.cases.len(),
        "worker received batch"
    );

    let response = match handle(&request, &resolve) {
        Ok(result) => WorkerResponse::Completed(result),
        Err(err) => {
            tracing::warn!(error = %err, "worker rejected batch");
            WorkerResponse::Rejected(err.to_string())
        }
    };
    serde_json::to_writer(&mut output, &response)?;
    output.flush()?;
    Ok(())
}

fn handle<F>(request: &WorkerRequest, resolve: &F) -> Result<RunResult>
where
    F: Fn(&str) -> Option<Function>,
{
    let catalog = Catalog::for_year(request.year)?;
    let exercise = catalog.get(&request.exercise)?;
    let candidate = resolve(&request.candidate).ok_or_else(|| {
        Error::Configuration(format!("unknown submission: {}", request.candidate))
    })?;
    if candidate.name() != exercise.name() {
        return Err(Error::Configuration(format!(
            "submission {} implements {}, not {}",
            request.candidate,
            candidate.name(),
            exercise.name()
        )));
    }

    let options = RunnerOptions {
        rel_tol: request.rel_tol,
        failed_case_limit: request.failed_case_limit,
        show_progress: false,
    };
    let runner = DifferentialRunner::new(&candidate, exercise.reference(), request.signature)
        .with_options(options);
    Ok(runner.run(&request.cases))
}
