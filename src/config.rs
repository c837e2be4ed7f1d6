//! Tester configuration

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::runner::DEFAULT_REL_TOL;
use crate::{Error, Result};

/// Where the report goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOption {
    /// Standard output
    #[default]
    Print,
    /// `y<year>_test_summary.txt` in the output directory
    Write,
}

impl FromStr for LogOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "print" => Ok(Self::Print),
            "write" => Ok(Self::Write),
            other => Err(Error::Configuration(format!(
                "invalid log option: {other} (expected print or write)"
            ))),
        }
    }
}

impl fmt::Display for LogOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Print => write!(f, "print"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// How a batch is isolated from the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolationMode {
    /// Worker thread; a call that never returns leaks its thread
    #[default]
    Thread,
    /// Worker process, killed on timeout
    ///
    /// The worker resolves the candidate by label, so candidates outside
    /// the bundled submissions need a worker program of their own built
    /// around [`serve`](crate::supervisor::serve).
    Process,
}

impl FromStr for IsolationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "thread" => Ok(Self::Thread),
            "process" => Ok(Self::Process),
            other => Err(Error::Configuration(format!(
                "invalid isolation mode: {other} (expected thread or process)"
            ))),
        }
    }
}

impl fmt::Display for IsolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thread => write!(f, "thread"),
            Self::Process => write!(f, "process"),
        }
    }
}

/// Configuration for a [`Tester`](crate::Tester)
///
/// Every field has a default, so a JSON file only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TesterConfig {
    /// Course year whose exercises are graded
    pub year: u16,
    /// Report destination
    pub log_option: LogOption,
    /// Debug mode hides the progress bar
    pub debug: bool,
    /// Wall-clock limit for a whole batch, in seconds
    pub runtime_limit_secs: f64,
    /// Show the failed case table
    pub show_table: bool,
    /// Use the detailed report
    pub more_detail: bool,
    /// Cases generated when the caller does not ask for a count
    pub num_test_cases: usize,
    /// Batch isolation
    pub isolation: IsolationMode,
    /// Seed for case generation; random when unset
    pub seed: Option<u64>,
    /// Directory for written reports
    pub output_dir: PathBuf,
    /// Failing cases retained per batch
    pub failed_case_limit: usize,
    /// Relative tolerance for float comparison
    pub float_tolerance: f64,
    /// Worker executable for process isolation; the current executable
    /// when unset
    pub worker_program: Option<PathBuf>,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            year: 2023,
            log_option: LogOption::Print,
            debug: false,
            runtime_limit_secs: 1.0,
            show_table: false,
            more_detail: false,
            num_test_cases: 100,
            isolation: IsolationMode::Thread,
            seed: None,
            output_dir: PathBuf::from("."),
            failed_case_limit: 10,
            float_tolerance: DEFAULT_REL_TOL,
            worker_program: None,
        }
    }
}

impl TesterConfig {
    /// Default configuration for `year`
    #[must_use]
    pub fn new(year: u16) -> Self {
        Self {
            year,
            ..Self::default()
        }
    }

    /// Load and validate a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for
    /// this type, or fails validation
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            Error::Configuration(format!("invalid config {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first invalid field
    pub fn validate(&self) -> Result<()> {
        if !(self.runtime_limit_secs > 0.0
            && Duration::try_from_secs_f64(self.runtime_limit_secs).is_ok())
        {
            return Err(Error::Configuration(format!(
                "runtime_limit_secs must be a positive duration, got {}",
                self.runtime_limit_secs
            )));
        }
        if !(self.float_tolerance.is_finite() && self.float_tolerance >= 0.0) {
            return Err(Error::Configuration(format!(
                "float_tolerance must be finite and non-negative, got {}",
                self.float_tolerance
            )));
        }
        Ok(())
    }

    /// Batch runtime limit
    ///
    /// A limit that [`validate`](Self::validate) rejects saturates instead
    /// of panicking.
    #[must_use]
    pub fn runtime_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.runtime_limit_secs).unwrap_or(Duration::MAX)
    }

    /// Set the report destination
    #[must_use]
    pub fn with_log_option(mut self, log_option: LogOption) -> Self {
        self.log_option = log_option;
        self
    }

    /// Set debug mode
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the batch runtime limit in seconds
    #[must_use]
    pub fn with_runtime_limit_secs(mut self, secs: f64) -> Self {
        self.runtime_limit_secs = secs;
        self
    }

    /// Show the failed case table
    #[must_use]
    pub fn with_show_table(mut self, show_table: bool) -> Self {
        self.show_table = show_table;
        self
    }

    /// Use the detailed report
    #[must_use]
    pub fn with_more_detail(mut self, more_detail: bool) -> Self {
        self.more_detail = more_detail;
        self
    }

    /// Set the default case count
    #[must_use]
    pub fn with_num_test_cases(mut self, n: usize) -> Self {
        self.num_test_cases = n;
        self
    }

    /// Set batch isolation
    #[must_use]
    pub fn with_isolation(mut self, isolation: IsolationMode) -> Self {
        self.isolation = isolation;
        self
    }

    /// Fix the generation seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the output directory for written reports
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set how many failing cases are retained
    #[must_use]
    pub fn with_failed_case_limit(mut self, limit: usize) -> Self {
        self.failed_case_limit = limit;
        self
    }

    /// Set the relative float tolerance
    #[must_use]
    pub fn with_float_tolerance(mut self, rel_tol: f64) -> Self {
        self.float_tolerance = rel_tol;
        self
    }

    /// Set the worker executable for process isolation
    #[must_use]
    pub fn with_worker_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.worker_program = Some(program.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = TesterConfig::default();
        assert_eq!(config.year, 2023);
        assert_eq!(config.log_option, LogOption::Print);
        assert_eq!(config.num_test_cases, 100);
        assert_eq!(config.runtime_limit(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = TesterConfig::new(2023)
            .with_log_option(LogOption::Write)
            .with_runtime_limit_secs(2.5)
            .with_show_table(true)
            .with_more_detail(true)
            .with_seed(9)
            .with_isolation(IsolationMode::Process);
        assert_eq!(config.log_option, LogOption::Write);
        assert_eq!(config.runtime_limit(), Duration::from_millis(2500));
        assert!(config.show_table && config.more_detail);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.isolation, IsolationMode::Process);
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        assert!(TesterConfig::default().with_runtime_limit_secs(0.0).validate().is_err());
        assert!(TesterConfig::default()
            .with_runtime_limit_secs(f64::INFINITY)
            .validate()
            .is_err());
        assert!(TesterConfig::default().with_runtime_limit_secs(1e20).validate().is_err());
        assert!(TesterConfig::default().with_runtime_limit_secs(1e6).validate().is_ok());
        assert!(TesterConfig::default().with_float_tolerance(-1.0).validate().is_err());
        assert!(TesterConfig::default().with_float_tolerance(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_huge_runtime_limit_is_an_error_not_a_panic() {
        let config = TesterConfig::new(2023).with_runtime_limit_secs(1e20);
        assert!(matches!(
            crate::Tester::new(config.clone()),
            Err(Error::Configuration(msg)) if msg.contains("runtime_limit_secs")
        ));
        assert_eq!(config.runtime_limit(), Duration::MAX);
    }

    #[test]
    fn test_parse_options() {
        assert_eq!("write".parse::<LogOption>().unwrap(), LogOption::Write);
        assert!("email".parse::<LogOption>().is_err());
        assert_eq!("process".parse::<IsolationMode>().unwrap(), IsolationMode::Process);
        assert_eq!(IsolationMode::Thread.to_string(), "thread");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"log_option": "write", "show_table": true, "seed": 3}}"#).unwrap();
        let config = TesterConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.log_option, LogOption::Write);
        assert!(config.show_table);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.num_test_cases, 100);
    }

    #[test]
    fn test_json_rejects_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"runtime_limit": 3}}"#).unwrap();
        let err = TesterConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("runtime_limit")));
    }

    #[test]
    fn test_json_is_validated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"runtime_limit_secs": -1.0}}"#).unwrap();
        assert!(TesterConfig::from_json_file(file.path()).is_err());
    }
}
