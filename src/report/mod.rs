//! Report formatting and emission
//!
//! Formatting is a pure function of the [`RunResult`] and the display
//! flags, so the same result always renders to the same text.

mod table;

pub use table::EXPECTED_WIDTH;

use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::config::LogOption;
use crate::runner::RunResult;
use crate::{Error, Result};

/// Failing cases shown in the table
pub const TABLE_ROWS: usize = 3;

/// How much detail a report carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Counts and success rate
    #[default]
    Simple,
    /// Counts, success rate and timing
    Detailed,
}

impl Verbosity {
    /// Verbosity for the `more_detail` flag
    #[must_use]
    pub fn from_more_detail(more_detail: bool) -> Self {
        if more_detail {
            Self::Detailed
        } else {
            Self::Simple
        }
    }
}

/// Render `result` as report text
#[must_use]
pub fn format_report(result: &RunResult, show_table: bool, verbosity: Verbosity) -> String {
    match verbosity {
        Verbosity::Simple => simple(result, show_table),
        Verbosity::Detailed => detailed(result, show_table),
    }
}

fn simple(result: &RunResult, show_table: bool) -> String {
    let mut out = format!(
        "Test Results:\n\
         +-----------------+------------+\n\
         |  Passed         | {:>7}    |\n\
         |  Failed         | {:>7}    |\n\
         |  Success Rate   | {:>8.2}%  |\n\
         +-----------------+------------+",
        result.passed_count, result.failed_count, result.success_rate
    );
    if show_table {
        let _ = write!(out, "\n\n{}{}", failed_table(result), omitted(result));
    }
    out
}

fn detailed(result: &RunResult, show_table: bool) -> String {
    let (table, more_info) = if show_table {
        (failed_table(result), omitted(result))
    } else {
        (String::new(), "Table is disabled".to_string())
    };
    format!(
        "\n# Test Results\n\
         \n\
         ## Summary\n\
         \n\
         Test cases passed: {passed}\n\
         Test cases failed: {failed}\n\
         Success rate: {rate:.2}%\n\
         \n\
         ## Execution Time\n\
         \n\
         Average time per tests case: {average:.5} seconds\n\
         Total time taken: {total:.2} seconds\n\
         Tests conducted at a rate of: {throughput:.2} tests/second\n\
         \n\
         ## Failed Test Cases\n\
         \n\
         {table}\n\
         {more_info}\n",
        passed = result.passed_count,
        failed = result.failed_count,
        rate = result.success_rate,
        average = result.average_time,
        total = result.total_time,
        throughput = result.test_per_second,
    )
}

fn failed_table(result: &RunResult) -> String {
    let shown = result.failed_cases.len().min(TABLE_ROWS);
    table::render(&result.failed_cases[..shown])
}

/// Note about failures left out of the table, counted over all failures
fn omitted(result: &RunResult) -> String {
    let shown = result.failed_cases.len().min(TABLE_ROWS);
    let rest = result.failed_count.saturating_sub(shown);
    if rest > 0 {
        format!("\nand more...{rest} cases failed")
    } else {
        String::new()
    }
}

/// File a written report goes to
#[must_use]
pub fn summary_path(output_dir: &Path, year: u16) -> PathBuf {
    output_dir.join(format!("y{year}_test_summary.txt"))
}

/// Print `report` or write it to the summary file
///
/// Returns the path written to, if any. The output directory is not
/// created.
///
/// # Errors
///
/// Returns [`Error::Output`] if the summary file cannot be created or
/// written
pub fn emit(
    report: &str,
    log_option: LogOption,
    output_dir: &Path,
    year: u16,
) -> Result<Option<PathBuf>> {
    match log_option {
        LogOption::Print => {
            println!("{report}");
            Ok(None)
        }
        LogOption::Write => {
            let path = summary_path(output_dir, year);
            let written = File::create(&path).and_then(|mut file| {
                file.write_all(report.as_bytes())?;
                file.flush()
            });
            match written {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "wrote test summary");
                    Ok(Some(path))
                }
                Err(source) => Err(Error::Output { path, source }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{FailedCase, FailureKind, Observation};
    use crate::value::Value;

    fn failure(index: usize) -> FailedCase {
        FailedCase {
            index,
            input: vec![Value::Int(index as i64)],
            expected: Observation::Value(Value::Int(1)),
            actual: Observation::Value(Value::Int(2)),
            kind: FailureKind::Mismatch,
        }
    }

    fn result(passed: usize, failed: usize, retained: usize) -> RunResult {
        let total = passed + failed;
        RunResult {
            passed_count: passed,
            failed_count: failed,
            total_cases: total,
            total_time: 0.5,
            average_time: 0.5 / total as f64,
            test_per_second: total as f64 / 0.5,
            success_rate: passed as f64 / total as f64 * 100.0,
            failed_cases: (0..retained).map(failure).collect(),
        }
    }

    #[test]
    fn test_simple_report() {
        let report = format_report(&result(9, 1, 1), false, Verbosity::Simple);
        let expected = "\
Test Results:
+-----------------+------------+
|  Passed         |       9    |
|  Failed         |       1    |
|  Success Rate   |    90.00%  |
+-----------------+------------+";
        assert_eq!(report, expected);
    }

    #[test]
    fn test_simple_report_all_passed() {
        let report = format_report(&result(100, 0, 0), false, Verbosity::Simple);
        assert!(report.contains("|   100.00%  |"));
        assert!(report.contains("|       0    |"));
    }

    #[test]
    fn test_detailed_report_without_table() {
        let report = format_report(&result(3, 1, 1), false, Verbosity::Detailed);
        assert!(report.starts_with("\n# Test Results\n"));
        assert!(report.contains("Test cases passed: 3\n"));
        assert!(report.contains("Test cases failed: 1\n"));
        assert!(report.contains("Success rate: 75.00%\n"));
        assert!(report.contains("Average time per tests case: 0.12500 seconds\n"));
        assert!(report.contains("Total time taken: 0.50 seconds\n"));
        assert!(report.contains("Tests conducted at a rate of: 8.00 tests/second\n"));
        assert!(report.ends_with("## Failed Test Cases\n\n\nTable is disabled\n"));
        assert!(!report.contains("Input"));
    }

    #[test]
    fn test_table_shows_first_three_and_counts_the_rest() {
        let report = format_report(&result(0, 25, 10), true, Verbosity::Detailed);
        assert!(report.contains("| (0,)"));
        assert!(report.contains("| (2,)"));
        assert!(!report.contains("| (3,)"));
        assert!(report.contains("\nand more...22 cases failed\n"));
        assert!(!report.contains("Table is disabled"));
    }

    #[test]
    fn test_table_without_omitted_failures() {
        let report = format_report(&result(8, 2, 2), true, Verbosity::Simple);
        assert!(report.contains("| Input "));
        assert!(!report.contains("and more"));
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let run = result(7, 13, 10);
        for verbosity in [Verbosity::Simple, Verbosity::Detailed] {
            for show_table in [false, true] {
                assert_eq!(
                    format_report(&run, show_table, verbosity),
                    format_report(&run, show_table, verbosity)
                );
            }
        }
    }

    #[test]
    fn test_write_creates_summary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = emit("report body", LogOption::Write, dir.path(), 2023)
            .unwrap()
            .unwrap();
        assert_eq!(path, dir.path().join("y2023_test_summary.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "report body");
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = emit("report", LogOption::Write, &missing, 2023).unwrap_err();
        assert!(matches!(err, Error::Output { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_print_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(emit("report", LogOption::Print, dir.path(), 2023).unwrap(), None);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
