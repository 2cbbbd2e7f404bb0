//! Configuration system for cubesweep.
//!
//! Load sweep configuration from TOML or YAML files to choose the sweep shape,
//! the solver command, trial counts and output paths without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use cubesweep_config::{SweepConfig, SweepShape};
//! use std::time::Duration;
//!
//! let config = SweepConfig::from_toml_str(r#"
//!     corpus = "scrambles.dat"
//!     runs = 5
//!
//!     [solver]
//!     program = "./driver"
//!     timeout_secs = 60
//!
//!     [shape]
//!     type = "parallelism"
//!     min_parallelism = 1
//!     max_parallelism = 4
//! "#).unwrap();
//!
//! assert_eq!(config.runs, 5);
//! assert_eq!(config.solver.timeout(), Some(Duration::from_secs(60)));
//! assert!(matches!(config.shape, SweepShape::Parallelism(_)));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use cubesweep_config::SweepConfig;
//!
//! let config = SweepConfig::load("sweep.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main sweep configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SweepConfig {
    /// Scramble corpus, one scramble per line.
    pub corpus: PathBuf,

    /// Result table path. Derived from the shape when unset.
    pub output: Option<PathBuf>,

    /// Optional Markdown summary written after a successful sweep.
    pub summary: Option<PathBuf>,

    /// Measured trials per sweep point.
    pub runs: usize,

    /// Unmeasured trials executed before the measured ones.
    pub warmup_runs: usize,

    /// Algorithm identifiers passed to the solver, in sweep order.
    pub algorithms: Vec<String>,

    /// What to do when a sweep point fails.
    pub on_failure: FailurePolicy,

    /// Solver executable configuration.
    pub solver: SolverCommandConfig,

    /// Which parameter matrix to enumerate.
    pub shape: SweepShape,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            corpus: PathBuf::from("scrambles.dat"),
            output: None,
            summary: None,
            runs: 3,
            warmup_runs: 0,
            algorithms: vec!["bfs".to_string(), "astar".to_string()],
            on_failure: FailurePolicy::default(),
            solver: SolverCommandConfig::default(),
            shape: SweepShape::default(),
        }
    }
}

impl SweepConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file, choosing the format by extension.
    ///
    /// `.yaml` and `.yml` files are parsed as YAML, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML/YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the corpus path.
    pub fn with_corpus(mut self, path: impl Into<PathBuf>) -> Self {
        self.corpus = path.into();
        self
    }

    /// Sets the result table path.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Sets the number of measured trials per point.
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    /// Sets the algorithms to sweep over.
    pub fn with_algorithms<I, A>(mut self, algorithms: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.algorithms = algorithms.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the sweep shape.
    pub fn with_shape(mut self, shape: SweepShape) -> Self {
        self.shape = shape;
        self
    }

    /// Sets the solver program.
    pub fn with_solver_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.solver.program = program.into();
        self
    }

    /// Returns the result table path, falling back to the shape's default.
    ///
    /// # Examples
    ///
    /// ```
    /// use cubesweep_config::{SweepConfig, SweepShape, ParallelismSweepConfig};
    /// use std::path::Path;
    ///
    /// let config = SweepConfig::new();
    /// assert_eq!(config.output_path(), Path::new("vary_size.csv"));
    ///
    /// let config = config.with_shape(SweepShape::Parallelism(ParallelismSweepConfig::default()));
    /// assert_eq!(config.output_path(), Path::new("vary_p.csv"));
    /// ```
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.shape.default_output()))
    }

    /// Checks the invariants the harness relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runs == 0 {
            return Err(invalid("runs must be at least 1"));
        }
        if self.algorithms.is_empty() {
            return Err(invalid("at least one algorithm is required"));
        }
        for algorithm in &self.algorithms {
            if algorithm.is_empty()
                || algorithm.contains(|c: char| c.is_whitespace() || c == ',')
            {
                return Err(invalid(format!(
                    "algorithm identifier {:?} must be non-empty without whitespace or commas",
                    algorithm
                )));
            }
        }
        if self.solver.program.as_os_str().is_empty() {
            return Err(invalid("solver program must not be empty"));
        }
        if self.solver.timeout_secs == Some(0) {
            return Err(invalid("solver timeout_secs must be positive"));
        }
        self.shape.validate()
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

/// Solver executable and per-trial limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SolverCommandConfig {
    /// Path of the solver executable.
    pub program: PathBuf,

    /// Extra arguments passed before the protocol is written to stdin.
    pub args: Vec<String>,

    /// Per-trial wall-clock limit. No limit when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for SolverCommandConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("./driver"),
            args: Vec::new(),
            timeout_secs: None,
        }
    }
}

impl SolverCommandConfig {
    /// Returns the per-trial timeout as a Duration, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Execution mode requested from the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Single-threaded search.
    #[serde(alias = "s")]
    Sequential,

    /// Multi-threaded search with an explicit degree of parallelism.
    #[serde(alias = "p")]
    Parallel,
}

impl Mode {
    /// Returns the discriminator written on the second protocol line.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Sequential => "s",
            Mode::Parallel => "p",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" | "sequential" => Ok(Mode::Sequential),
            "p" | "parallel" => Ok(Mode::Parallel),
            other => Err(invalid(format!("unknown mode {:?}", other))),
        }
    }
}

/// Policy applied when a sweep point cannot be measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole sweep on the first failed point.
    #[default]
    Abort,

    /// Log the failed point, write no row for it, and continue.
    Skip,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" => Ok(FailurePolicy::Skip),
            other => Err(invalid(format!("unknown failure policy {:?}", other))),
        }
    }
}

/// Parameter matrix enumerated by a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SweepShape {
    /// Vary problem size: every corpus scramble, every mode.
    Size(SizeSweepConfig),

    /// Vary the degree of parallelism over a fixed slice of the corpus.
    Parallelism(ParallelismSweepConfig),
}

impl Default for SweepShape {
    fn default() -> Self {
        SweepShape::Size(SizeSweepConfig::default())
    }
}

impl SweepShape {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            SweepShape::Size(_) => "size",
            SweepShape::Parallelism(_) => "parallelism",
        }
    }

    /// Result table file name used when none is configured.
    pub fn default_output(&self) -> &'static str {
        match self {
            SweepShape::Size(_) => "vary_size.csv",
            SweepShape::Parallelism(_) => "vary_p.csv",
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            SweepShape::Size(size) => {
                if size.parallelism == 0 {
                    return Err(invalid("size sweep parallelism must be at least 1"));
                }
                if size.modes.is_empty() {
                    return Err(invalid("size sweep requires at least one mode"));
                }
            }
            SweepShape::Parallelism(p) => {
                if p.min_parallelism == 0 {
                    return Err(invalid("min_parallelism must be at least 1"));
                }
                if p.min_parallelism > p.max_parallelism {
                    return Err(invalid(format!(
                        "min_parallelism {} exceeds max_parallelism {}",
                        p.min_parallelism, p.max_parallelism
                    )));
                }
                if p.first_row > p.last_row {
                    return Err(invalid(format!(
                        "first_row {} exceeds last_row {}",
                        p.first_row, p.last_row
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Size sweep configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SizeSweepConfig {
    /// Degree of parallelism used for parallel-mode trials.
    pub parallelism: usize,

    /// Modes to measure, in sweep order.
    pub modes: Vec<Mode>,
}

impl Default for SizeSweepConfig {
    fn default() -> Self {
        Self {
            parallelism: 8,
            modes: vec![Mode::Sequential, Mode::Parallel],
        }
    }
}

/// Parallelism sweep configuration.
///
/// Corpus rows are 0-based and both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ParallelismSweepConfig {
    pub min_parallelism: usize,
    pub max_parallelism: usize,
    pub first_row: usize,
    pub last_row: usize,
}

impl Default for ParallelismSweepConfig {
    fn default() -> Self {
        Self {
            min_parallelism: 1,
            max_parallelism: 8,
            first_row: 39,
            last_row: 49,
        }
    }
}

impl ParallelismSweepConfig {
    /// Degrees of parallelism to sweep.
    pub fn degrees(&self) -> RangeInclusive<usize> {
        self.min_parallelism..=self.max_parallelism
    }

    /// Corpus rows measured at every degree.
    pub fn rows(&self) -> RangeInclusive<usize> {
        self.first_row..=self.last_row
    }
}
