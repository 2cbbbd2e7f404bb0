//! Error types for the sweep harness.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use cubesweep_config::ConfigError;
use thiserror::Error;

/// Failure of a single solver invocation.
#[derive(Debug, Error)]
pub enum TrialError {
    /// The solver could not be spawned or terminated without usable output.
    #[error("solver process error ({program}): {reason}")]
    SolverProcess { program: String, reason: String },

    /// The solver's stdout did not carry a parseable timing line.
    #[error("malformed solver output: {reason} (line: {line:?})")]
    MalformedSolverOutput { reason: String, line: String },

    /// The solver did not exit within the per-trial limit.
    #[error("solver timed out after {}ms", .timeout.as_millis())]
    SolverTimeout { timeout: Duration },
}

impl TrialError {
    pub(crate) fn process(program: impl Into<String>, reason: impl Into<String>) -> Self {
        TrialError::SolverProcess {
            program: program.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>, line: impl Into<String>) -> Self {
        TrialError::MalformedSolverOutput {
            reason: reason.into(),
            line: line.into(),
        }
    }
}

/// Failure of a sweep run.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The scramble corpus could not be read.
    #[error("corpus unavailable at {}: {source}", .path.display())]
    CorpusUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configured corpus slice lies outside the loaded corpus.
    #[error("corpus rows {first}..={last} out of range for a corpus of {len} scrambles")]
    CorpusRange {
        first: usize,
        last: usize,
        len: usize,
    },

    /// A sweep point could not be measured.
    #[error("sweep point [{point}] failed: {source}")]
    Trial {
        point: String,
        #[source]
        source: TrialError,
    },

    /// The result table could not be written.
    #[error("failed to write result table: {0}")]
    OutputWrite(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for sweep operations.
pub type Result<T> = std::result::Result<T, SweepError>;
