//! Batch execution in a killable child process
//!
//! The request goes to the child's stdin as JSON and the single response
//! comes back on its stdout. The child is killed and reaped when the
//! deadline passes.

use std::io::{Read, Write};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::worker::{WorkerRequest, WorkerResponse};
use super::WorkerCommand;
use crate::runner::RunResult;
use crate::{Error, Result};

/// Longest stderr excerpt carried into a worker error
const STDERR_EXCERPT: usize = 2000;

/// Run `request` in a worker process; `Ok(None)` means the deadline passed
pub(super) fn run_in_process(
    command: &WorkerCommand,
    request: &WorkerRequest,
    timeout: Duration,
) -> Result<Option<RunResult>> {
    let payload = serde_json::to_vec(request)?;

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            Error::Worker(format!(
                "failed to spawn {}: {e}",
                command.program.display()
            ))
        })?;

    // A large batch can exceed the pipe buffer, so feed stdin from its
    // own thread. It ends when the child closes the pipe or is killed.
    let stdin = child.stdin.take();
    let writer = thread::spawn(move || {
        if let Some(mut stdin) = stdin {
            let _ = stdin.write_all(&payload);
        }
    });

    let output = wait_with_timeout(child, timeout);
    let _ = writer.join();

    match output? {
        Some(output) => parse_output(&output).map(Some),
        None => Ok(None),
    }
}

fn parse_output(output: &Output) -> Result<RunResult> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let excerpt: String = stderr.chars().take(STDERR_EXCERPT).collect();
        return Err(Error::Worker(format!(
            "worker exited with {}: {}",
            output.status,
            excerpt.trim()
        )));
    }
    match serde_json::from_slice::<WorkerResponse>(&output.stdout)? {
        WorkerResponse::Completed(result) => Ok(result),
        WorkerResponse::Rejected(message) => Err(Error::Worker(message)),
    }
}

/// Interval between exit checks while waiting on a worker
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Wait for a process with timeout using threaded output capture
///
/// Returns `Ok(None)` after killing and reaping the process when the
/// timeout expires.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> Result<Option<Output>> {
    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();

    // Drain both pipes concurrently so the child never blocks on a full pipe
    let stdout_thread = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stdout) = stdout_handle {
            let _ = stdout.read_to_end(&mut buf);
        }
        buf
    });

    let stderr_thread = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stderr) = stderr_handle {
            let _ = stderr.read_to_end(&mut buf);
        }
        buf
    });

    // No representable deadline means no deadline
    let deadline = Instant::now().checked_add(timeout);
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if deadline.is_some_and(|deadline| Instant::now() >= deadline) => {
                // Kill then reap so no zombie outlives the batch
                let _ = child.kill();
                let _ = child.wait();
                let _ = stdout_thread.join();
                let _ = stderr_thread.join();
                tracing::debug!(pid = child.id(), "killed worker after timeout");
                return Ok(None);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                let _ = stdout_thread.join();
                let _ = stderr_thread.join();
                return Err(Error::Worker(format!("wait error: {e}")));
            }
        }
    };

    let stdout = stdout_thread.join().unwrap_or_default();
    let stderr = stderr_thread.join().unwrap_or_default();
    Ok(Some(Output {
        status,
        stdout,
        stderr,
    }))
}
