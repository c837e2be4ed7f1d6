//! mygrader CLI - grade bundled submissions against reference exercises

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mygrader::exercise::Catalog;
use mygrader::supervisor;
use mygrader::{submissions, IsolationMode, LogOption, Tester, TesterConfig};
use tracing_subscriber::EnvFilter;

/// mygrader - Differential Grading Harness
#[derive(Parser)]
#[command(name = "mygrader")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log at debug level and hide the progress bar
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List gradable functions and bundled submissions
    List {
        /// Course year
        #[arg(short, long, default_value = "2023")]
        year: u16,
    },

    /// Grade a bundled submission
    Run {
        /// Submission label (see `mygrader list`)
        submission: String,

        /// JSON configuration file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Course year
        #[arg(short, long)]
        year: Option<u16>,

        /// Number of test cases
        #[arg(short = 'n', long)]
        cases: Option<usize>,

        /// Report destination (print, write)
        #[arg(long)]
        log_option: Option<String>,

        /// Runtime limit for the whole batch in seconds
        #[arg(long)]
        runtime_limit: Option<f64>,

        /// Show the failed case table
        #[arg(long)]
        show_table: bool,

        /// Use the detailed report
        #[arg(long)]
        more_detail: bool,

        /// Batch isolation (thread, process) [default: process]
        #[arg(long)]
        isolation: Option<String>,

        /// Random seed for reproducible cases
        #[arg(long)]
        seed: Option<u64>,

        /// Directory for written reports
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Failing cases retained per batch
        #[arg(long)]
        failed_case_limit: Option<usize>,

        /// Relative tolerance for float comparison
        #[arg(long)]
        float_tolerance: Option<f64>,
    },

    /// Serve one batch over stdin/stdout
    #[command(hide = true)]
    Worker,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // Panics in graded code are caught and reported as failed cases
    std::panic::set_hook(Box::new(|info| {
        tracing::debug!(panic = %info, "panic in graded code");
    }));
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Commands::List { year } => list(year),
        Commands::Run {
            submission,
            config,
            year,
            cases,
            log_option,
            runtime_limit,
            show_table,
            more_detail,
            isolation,
            seed,
            output_dir,
            failed_case_limit,
            float_tolerance,
        } => {
            let mut tester_config = match config {
                Some(path) => match TesterConfig::from_json_file(&path) {
                    Ok(config) => config,
                    Err(e) => exit_with(&e),
                },
                // The CLI can always re-run itself as a worker
                None => TesterConfig::default().with_isolation(IsolationMode::Process),
            };

            if let Some(year) = year {
                tester_config.year = year;
            }
            if let Some(log_option) = log_option {
                match log_option.parse::<LogOption>() {
                    Ok(option) => tester_config.log_option = option,
                    Err(e) => exit_with(&e),
                }
            }
            if let Some(isolation) = isolation {
                match isolation.parse::<IsolationMode>() {
                    Ok(mode) => tester_config.isolation = mode,
                    Err(e) => exit_with(&e),
                }
            }
            if let Some(secs) = runtime_limit {
                tester_config.runtime_limit_secs = secs;
            }
            if let Some(seed) = seed {
                tester_config.seed = Some(seed);
            }
            if let Some(dir) = output_dir {
                tester_config.output_dir = dir;
            }
            if let Some(limit) = failed_case_limit {
                tester_config.failed_case_limit = limit;
            }
            if let Some(rel_tol) = float_tolerance {
                tester_config.float_tolerance = rel_tol;
            }
            tester_config.debug |= cli.debug;
            tester_config.show_table |= show_table;
            tester_config.more_detail |= more_detail;

            run(&submission, tester_config, cases);
        }
        Commands::Worker => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            if let Err(e) = supervisor::serve(stdin.lock(), stdout.lock(), submissions::find) {
                exit_with(&e);
            }
        }
    }
}

fn list(year: u16) {
    match Catalog::for_year(year) {
        Ok(catalog) => println!("{catalog}"),
        Err(e) => exit_with(&e),
    }
    println!();
    println!("Bundled submissions:");
    for submission in submissions::all() {
        println!("  {:<32} {}", submission.label, submission.description);
    }
}

fn run(label: &str, config: TesterConfig, cases: Option<usize>) {
    let Some(candidate) = submissions::find(label) else {
        eprintln!("Error: unknown submission '{label}'");
        eprintln!("Run `mygrader list` to see the bundled submissions");
        std::process::exit(1);
    };

    let tester = match Tester::new(config) {
        Ok(tester) => tester,
        Err(e) => exit_with(&e),
    };

    let count = cases.unwrap_or(tester.config().num_test_cases);
    println!("Testing... {}() with {count} test cases.", candidate.name());

    match tester.run_test(&candidate, cases) {
        Ok(summary) => {
            if let Some(path) = summary.written_to {
                println!("Summary written to {}", path.display());
            }
            if !summary.result.all_passed() {
                std::process::exit(2);
            }
        }
        Err(e) => exit_with(&e),
    }
}

fn exit_with(error: &mygrader::Error) -> ! {
    eprintln!("Error: {error}");
    std::process::exit(1);
}
