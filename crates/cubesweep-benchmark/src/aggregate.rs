//! Multi-trial averaging.

use tracing::debug;

use crate::error::TrialError;
use crate::result::AggregateResult;
use crate::trial::{Solver, TrialConfig};

/// Runs a solver repeatedly for one configuration and reduces the timings.
///
/// Trials run strictly sequentially. Warmup trials run first and are never
/// part of the mean.
///
/// # Example
///
/// ```
/// use cubesweep_benchmark::{Aggregator, Scramble, Solver, TrialConfig, TrialError};
///
/// struct Fixed;
///
/// impl Solver for Fixed {
///     fn run(&self, _config: &TrialConfig<'_>) -> Result<f64, TrialError> {
///         Ok(0.25)
///     }
/// }
///
/// let scramble = Scramble::new("R U");
/// let aggregator = Aggregator::new(Fixed).with_runs(4);
/// let result = aggregator
///     .aggregate(&TrialConfig::sequential(&scramble, "bfs"))
///     .unwrap();
/// assert_eq!(result.mean, 0.25);
/// assert_eq!(result.runs, 4);
/// ```
#[derive(Debug, Clone)]
pub struct Aggregator<S> {
    solver: S,
    runs: usize,
    warmup_runs: usize,
}

impl<S: Solver> Aggregator<S> {
    /// Creates an aggregator with the defaults of 3 measured runs and no
    /// warmup.
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            runs: 3,
            warmup_runs: 0,
        }
    }

    /// Sets the number of measured runs. Values below 1 are raised to 1.
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs.max(1);
        self
    }

    /// Sets the number of warmup runs (not measured).
    pub fn with_warmup_runs(mut self, warmup_runs: usize) -> Self {
        self.warmup_runs = warmup_runs;
        self
    }

    /// Returns the number of measured runs.
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Returns the number of warmup runs.
    pub fn warmup_runs(&self) -> usize {
        self.warmup_runs
    }

    /// Returns the underlying solver.
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Measures `config` and returns the rounded mean over all measured runs.
    ///
    /// The first failing trial aborts the call; no partial average is ever
    /// returned.
    pub fn aggregate(&self, config: &TrialConfig<'_>) -> Result<AggregateResult, TrialError> {
        for _ in 0..self.warmup_runs {
            self.solver.run(config)?;
        }

        let mut measurements = Vec::with_capacity(self.runs);
        for run_index in 0..self.runs {
            let elapsed = self.solver.run(config)?;
            debug!(
                event = "trial_measured",
                run_index = run_index as u64,
                elapsed = elapsed,
            );
            measurements.push(elapsed);
        }

        AggregateResult::from_measurements(&measurements)
            .ok_or_else(|| TrialError::process("aggregator", "no measured trials"))
    }
}
