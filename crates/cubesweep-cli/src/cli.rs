//! Command-line interface for running benchmark sweeps.
//!
//! ## Commands
//!
//! - `run` - Measure every sweep point and write the result table
//! - `plan` - Print the sweep points in execution order without running the solver
//!
//! ## Design
//!
//! Both commands resolve a [`SweepConfig`] the same way: an optional config
//! file, then command-line overrides, then validation. Command functions
//! return `CliResult<T>`; only [`run`] calls `process::exit`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use cubesweep_benchmark::{Corpus, CsvTable, ProcessSolver, SummaryReport, SweepController};
use cubesweep_config::{
    FailurePolicy, ParallelismSweepConfig, SizeSweepConfig, SweepConfig, SweepShape,
};
use owo_colors::OwoColorize;
use tracing::info;

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Carries a user-facing message and the exit code the process ends with.
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: ExitCode::FAILURE,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

fn failure(err: impl fmt::Display) -> CliError {
    CliError::failure(format!("Error: {}", err))
}

/// Benchmark sweeps for an external puzzle solver
#[derive(Parser, Debug)]
#[command(name = "cubesweep")]
#[command(version)]
#[command(about = "Benchmark sweeps for an external puzzle solver", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Measure every sweep point and write the result table
    Run(SweepArgs),

    /// Print the sweep points in execution order without running the solver
    Plan(SweepArgs),
}

/// Sweep shape selectable from the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeArg {
    Size,
    Parallelism,
}

/// Options shared by `run` and `plan`. Each one overrides the config file.
#[derive(Args, Debug, Default)]
pub struct SweepArgs {
    /// Configuration file (.toml, .yaml or .yml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Sweep shape
    #[arg(long, value_enum)]
    pub shape: Option<ShapeArg>,

    /// Solver executable
    #[arg(long, value_name = "PATH")]
    pub solver: Option<PathBuf>,

    /// Scramble corpus, one scramble per line
    #[arg(long, value_name = "PATH")]
    pub corpus: Option<PathBuf>,

    /// Result table path
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Also write a Markdown summary to this path
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,

    /// Measured trials per point
    #[arg(long, value_name = "N")]
    pub runs: Option<usize>,

    /// Unmeasured warmup trials per point
    #[arg(long, value_name = "N")]
    pub warmup: Option<usize>,

    /// Per-trial solver timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Algorithm identifier (repeatable)
    #[arg(short, long = "algorithm", value_name = "ID")]
    pub algorithms: Vec<String>,

    /// What to do when a point cannot be measured (abort or skip)
    #[arg(long, value_name = "POLICY")]
    pub on_failure: Option<FailurePolicy>,
}

impl SweepArgs {
    /// Loads the config file, if any, applies overrides and validates.
    pub fn resolve(&self) -> CliResult<SweepConfig> {
        let mut config = match &self.config {
            Some(path) => SweepConfig::load(path).map_err(|e| {
                CliError::failure(format!("Error loading {}: {}", path.display(), e))
            })?,
            None => SweepConfig::default(),
        };

        if let Some(shape) = self.shape {
            config.shape = select_shape(config.shape, shape);
        }
        if let Some(program) = &self.solver {
            config.solver.program = program.clone();
        }
        if let Some(corpus) = &self.corpus {
            config.corpus = corpus.clone();
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if let Some(summary) = &self.summary {
            config.summary = Some(summary.clone());
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(warmup) = self.warmup {
            config.warmup_runs = warmup;
        }
        if let Some(secs) = self.timeout_secs {
            config.solver.timeout_secs = Some(secs);
        }
        if !self.algorithms.is_empty() {
            config.algorithms = self.algorithms.clone();
        }
        if let Some(policy) = self.on_failure {
            config.on_failure = policy;
        }

        config.validate().map_err(failure)?;
        Ok(config)
    }
}

// Keeps a configured shape of the requested kind, otherwise uses its defaults.
fn select_shape(current: SweepShape, requested: ShapeArg) -> SweepShape {
    match (requested, current) {
        (ShapeArg::Size, shape @ SweepShape::Size(_)) => shape,
        (ShapeArg::Parallelism, shape @ SweepShape::Parallelism(_)) => shape,
        (ShapeArg::Size, _) => SweepShape::Size(SizeSweepConfig::default()),
        (ShapeArg::Parallelism, _) => SweepShape::Parallelism(ParallelismSweepConfig::default()),
    }
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => cubesweep_console::DEFAULT_FILTER,
        1 => "cubesweep_benchmark=debug,cubesweep=debug",
        _ => "cubesweep_benchmark=trace,cubesweep=trace",
    }
}

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();
    cubesweep_console::init_with_filter(log_filter(cli.verbose));

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code != ExitCode::SUCCESS {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            eprintln!("{}", e.message.bright_red());
            process::exit(e.exit_code.0);
        }
    }
}

fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Run(args) => execute_run(&args.resolve()?),
        Command::Plan(args) => execute_plan(&args.resolve()?),
    }
}

/// Runs the configured sweep, streaming rows to the result table.
fn execute_run(config: &SweepConfig) -> CliResult<ExitCode> {
    let corpus = Corpus::load(&config.corpus).map_err(failure)?;
    let solver = ProcessSolver::from_config(&config.solver);
    let controller = SweepController::from_config(config, solver);

    let output = config.output_path();
    let mut table = CsvTable::create(&output).map_err(|e| {
        CliError::failure(format!("Error creating {}: {}", output.display(), e))
    })?;

    let rows = controller.run_sweep(&corpus, &mut table).map_err(failure)?;
    info!("Wrote {} rows to {}", rows.len(), output.display());

    if let Some(summary) = &config.summary {
        SummaryReport::to_file(config.shape.name(), &rows, summary).map_err(|e| {
            CliError::failure(format!("Error writing {}: {}", summary.display(), e))
        })?;
        info!("Wrote summary to {}", summary.display());
    }

    Ok(ExitCode::SUCCESS)
}

/// Prints the sweep points without invoking the solver.
fn execute_plan(config: &SweepConfig) -> CliResult<ExitCode> {
    let corpus = Corpus::load(&config.corpus).map_err(failure)?;
    let solver = ProcessSolver::from_config(&config.solver);
    let controller = SweepController::from_config(config, solver);
    let points = controller.plan(&corpus).map_err(failure)?;

    let trials_per_point = config.runs + config.warmup_runs;
    println!(
        "{} sweep │ {} points │ {} trials │ output {}",
        config.shape.name().bold(),
        points.len().bright_yellow(),
        (points.len() * trials_per_point).bright_magenta(),
        config.output_path().display()
    );
    let width = points.len().to_string().len();
    for (index, point) in points.iter().enumerate() {
        println!(
            "{} {},{},{} │ {}",
            format!("[{:>width$}]", index + 1, width = width).bright_black(),
            point.axis,
            point.trial.algorithm,
            point.secondary,
            point
        );
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cubesweep_config::Mode;
    use std::fs;

    fn resolve(args: &[&str]) -> CliResult<SweepConfig> {
        let mut argv = vec!["cubesweep", "run"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Run(args) => args.resolve(),
            other => panic!("Expected Run command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::try_parse_from([
            "cubesweep",
            "run",
            "--shape",
            "parallelism",
            "--runs",
            "5",
            "-a",
            "bfs",
            "-a",
            "astar",
            "--on-failure",
            "skip",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.shape, Some(ShapeArg::Parallelism));
            assert_eq!(args.runs, Some(5));
            assert_eq!(args.algorithms, ["bfs", "astar"]);
            assert_eq!(args.on_failure, Some(FailurePolicy::Skip));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_plan_with_verbosity() {
        let cli =
            Cli::try_parse_from(["cubesweep", "plan", "-vv", "--config", "sweep.toml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Plan(SweepArgs { config: Some(_), .. })));
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["cubesweep", "run", "--on-failure", "retry"]).is_err());
        assert!(Cli::try_parse_from(["cubesweep", "run", "--shape", "depth"]).is_err());
        assert!(Cli::try_parse_from(["cubesweep", "run", "--runs", "-1"]).is_err());
        assert!(Cli::try_parse_from(["cubesweep"]).is_err());
    }

    #[test]
    fn test_resolve_defaults() {
        let config = resolve(&[]).unwrap();
        assert_eq!(config, SweepConfig::default());
        assert_eq!(config.output_path(), PathBuf::from("vary_size.csv"));
    }

    #[test]
    fn test_resolve_overrides() {
        let config = resolve(&[
            "--solver",
            "/opt/driver",
            "--corpus",
            "corpus.dat",
            "--output",
            "out.csv",
            "--runs",
            "7",
            "--warmup",
            "1",
            "--timeout-secs",
            "30",
            "-a",
            "idastar",
        ])
        .unwrap();
        assert_eq!(config.solver.program, PathBuf::from("/opt/driver"));
        assert_eq!(config.corpus, PathBuf::from("corpus.dat"));
        assert_eq!(config.output_path(), PathBuf::from("out.csv"));
        assert_eq!(config.runs, 7);
        assert_eq!(config.warmup_runs, 1);
        assert_eq!(config.solver.timeout_secs, Some(30));
        assert_eq!(config.algorithms, ["idastar"]);
    }

    #[test]
    fn test_shape_flag_switches_to_default_output() {
        let config = resolve(&["--shape", "parallelism"]).unwrap();
        assert_eq!(
            config.shape,
            SweepShape::Parallelism(ParallelismSweepConfig::default())
        );
        assert_eq!(config.output_path(), PathBuf::from("vary_p.csv"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.toml");
        fs::write(
            &path,
            r#"
runs = 4
algorithms = ["bfs"]

[shape]
type = "size"
parallelism = 16
modes = ["p"]
"#,
        )
        .unwrap();
        let path = path.display().to_string();

        let config = resolve(&["--config", &path, "--runs", "2"]).unwrap();
        assert_eq!(config.runs, 2);
        assert_eq!(config.algorithms, ["bfs"]);

        // Same-kind shape flag keeps the file's settings.
        let config = resolve(&["--config", &path, "--shape", "size"]).unwrap();
        assert_eq!(
            config.shape,
            SweepShape::Size(SizeSweepConfig {
                parallelism: 16,
                modes: vec![Mode::Parallel],
            })
        );
    }

    #[test]
    fn test_resolve_reports_invalid_config() {
        let err = resolve(&["--runs", "0"]).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.contains("runs"));

        let err = resolve(&["--config", "/nonexistent/sweep.toml"]).unwrap_err();
        assert!(err.message.contains("/nonexistent/sweep.toml"));
    }

    #[test]
    fn test_log_filter_levels() {
        assert_eq!(log_filter(0), cubesweep_console::DEFAULT_FILTER);
        assert!(log_filter(1).contains("debug"));
        assert!(log_filter(3).contains("trace"));
    }

    #[test]
    fn test_run_with_missing_corpus_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = SweepConfig::new()
            .with_corpus(dir.path().join("missing.dat"))
            .with_output(dir.path().join("out.csv"));
        let err = execute_run(&config).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.contains("corpus unavailable"));
    }

    #[test]
    fn test_plan_rejects_out_of_range_rows() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("scrambles.dat");
        fs::write(&corpus, "R U\nF2\n").unwrap();
        let config = SweepConfig::new()
            .with_corpus(&corpus)
            .with_shape(SweepShape::Parallelism(ParallelismSweepConfig::default()));
        let err = execute_plan(&config).unwrap_err();
        assert!(err.message.contains("out of range"));

        let config = SweepConfig::new().with_corpus(&corpus);
        assert_eq!(execute_plan(&config).unwrap(), ExitCode::SUCCESS);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_writes_table_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("scrambles.dat");
        fs::write(&corpus, "R U R' U'\nF2 B2\n").unwrap();
        let config_path = dir.path().join("sweep.toml");
        fs::write(
            &config_path,
            r#"
runs = 2
algorithms = ["bfs"]

[solver]
program = "/bin/sh"
args = ["-c", "cat > /dev/null; echo time 0.5", "stub"]
"#,
        )
        .unwrap();

        let output = dir.path().join("out.csv");
        let summary = dir.path().join("summary.md");
        let config = resolve(&[
            "--config",
            &config_path.display().to_string(),
            "--corpus",
            &corpus.display().to_string(),
            "--output",
            &output.display().to_string(),
            "--summary",
            &summary.display().to_string(),
        ])
        .unwrap();

        assert_eq!(execute_run(&config).unwrap(), ExitCode::SUCCESS);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "4,bfs,s,0.500\n2,bfs,s,0.500\n4,bfs,p,0.500\n2,bfs,p,0.500\n"
        );
        let summary = fs::read_to_string(&summary).unwrap();
        assert!(summary.contains("# Sweep: size"));
        assert!(summary.contains("| bfs | p | 2 | 0.500 | 0.500 | 0.500 |"));
    }
}
