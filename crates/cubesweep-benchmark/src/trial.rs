//! Single solver invocations.
//!
//! Logging levels:
//! - **WARN**: Solver exited unsuccessfully but still reported a time
//! - **TRACE**: One event per completed trial with its elapsed time

use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use cubesweep_config::{Mode, SolverCommandConfig};
use tracing::{trace, warn};

use crate::corpus::Scramble;
use crate::error::TrialError;
use crate::process::{self, ExchangeError};

/// One point of the parameter matrix as sent to the solver.
///
/// `parallelism` is only transmitted when `mode` is [`Mode::Parallel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialConfig<'a> {
    pub scramble: &'a Scramble,
    pub mode: Mode,
    pub algorithm: &'a str,
    pub parallelism: usize,
}

impl<'a> TrialConfig<'a> {
    /// Creates a sequential-mode trial.
    pub fn sequential(scramble: &'a Scramble, algorithm: &'a str) -> Self {
        Self {
            scramble,
            mode: Mode::Sequential,
            algorithm,
            parallelism: 1,
        }
    }

    /// Creates a parallel-mode trial with the given degree of parallelism.
    pub fn parallel(scramble: &'a Scramble, algorithm: &'a str, parallelism: usize) -> Self {
        Self {
            scramble,
            mode: Mode::Parallel,
            algorithm,
            parallelism,
        }
    }

    /// Builds the three-line request written to the solver's stdin.
    ///
    /// # Example
    ///
    /// ```
    /// use cubesweep_benchmark::{Scramble, TrialConfig};
    ///
    /// let scramble = Scramble::new("R U R' U'");
    /// assert_eq!(
    ///     TrialConfig::sequential(&scramble, "bfs").request(),
    ///     "R U R' U'\ns\nbfs"
    /// );
    /// assert_eq!(
    ///     TrialConfig::parallel(&scramble, "astar", 8).request(),
    ///     "R U R' U'\np\nastar 8"
    /// );
    /// ```
    pub fn request(&self) -> String {
        match self.mode {
            Mode::Sequential => format!(
                "{}\n{}\n{}",
                self.scramble.text(),
                self.mode,
                self.algorithm
            ),
            Mode::Parallel => format!(
                "{}\n{}\n{} {}",
                self.scramble.text(),
                self.mode,
                self.algorithm,
                self.parallelism
            ),
        }
    }
}

impl fmt::Display for TrialConfig<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "algorithm={} mode={}", self.algorithm, self.mode)?;
        if self.mode == Mode::Parallel {
            write!(f, " parallelism={}", self.parallelism)?;
        }
        write!(f, " scramble={:?}", self.scramble.text())
    }
}

/// Executes one trial and reports its elapsed time.
///
/// Implementations must not share state between calls: every call is an
/// independent measurement.
pub trait Solver {
    fn run(&self, config: &TrialConfig<'_>) -> Result<f64, TrialError>;
}

impl<S: Solver + ?Sized> Solver for &S {
    fn run(&self, config: &TrialConfig<'_>) -> Result<f64, TrialError> {
        (**self).run(config)
    }
}

/// Solver backed by a fresh external process per trial.
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessSolver {
    /// Creates a solver that runs `program` with no extra arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Creates a solver from its configuration section.
    pub fn from_config(config: &SolverCommandConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: config.timeout(),
        }
    }

    /// Adds command-line arguments.
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the per-trial timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the solver program.
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    /// Returns the per-trial timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Solver for ProcessSolver {
    fn run(&self, config: &TrialConfig<'_>) -> Result<f64, TrialError> {
        let program = self.program.display().to_string();
        let mut command = Command::new(&self.program);
        command.args(&self.args);

        let captured = process::exchange(&mut command, config.request().as_bytes(), self.timeout)
            .map_err(|e| match e {
                ExchangeError::TimedOut => TrialError::SolverTimeout {
                    timeout: self.timeout.unwrap_or_default(),
                },
                ExchangeError::Io(e) => TrialError::process(&program, e.to_string()),
            })?;

        if captured.stdout.is_empty() && !captured.status.success() {
            let stderr = String::from_utf8_lossy(&captured.stderr);
            return Err(TrialError::process(
                &program,
                format!("{} with no output: {}", captured.status, stderr.trim()),
            ));
        }

        let stdout = String::from_utf8_lossy(&captured.stdout);
        let elapsed = parse_elapsed(&stdout)?;
        if !captured.status.success() {
            warn!(
                event = "solver_exit_status",
                status = %captured.status,
                trial = %config,
            );
        }

        trace!(event = "trial", trial = %config, elapsed = elapsed);
        Ok(elapsed)
    }
}

/// Extracts the elapsed time from solver stdout.
///
/// The output is split into lines, the final (usually empty) line is
/// discarded, and the second whitespace-separated field of the line before it
/// is read as the elapsed time.
///
/// # Example
///
/// ```
/// use cubesweep_benchmark::parse_elapsed;
///
/// let out = "Scramble (WCA notation) ==> \nTime: 1.234567\n";
/// assert_eq!(parse_elapsed(out).unwrap(), 1.234567);
/// assert!(parse_elapsed("Time:\n").is_err());
/// ```
pub fn parse_elapsed(stdout: &str) -> Result<f64, TrialError> {
    let mut lines: Vec<&str> = stdout.split('\n').collect();
    if lines.len() < 2 {
        return Err(TrialError::malformed("expected at least two lines", stdout));
    }
    lines.pop();
    let line = lines.last().copied().unwrap_or_default();

    let field = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| TrialError::malformed("missing elapsed-time field", line))?;
    let elapsed: f64 = field
        .parse()
        .map_err(|_| TrialError::malformed(format!("{:?} is not a number", field), line))?;

    if !elapsed.is_finite() || elapsed < 0.0 {
        return Err(TrialError::malformed(
            format!("elapsed time {} is not a finite non-negative value", elapsed),
            line,
        ));
    }
    Ok(elapsed)
}
