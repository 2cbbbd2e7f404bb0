//! Parameter-sweep orchestration.
//!
//! Logging levels:
//! - **INFO**: Sweep start/end and one event per written row
//! - **WARN**: Points skipped under [`FailurePolicy::Skip`]
//! - **DEBUG**: Point starts

use std::fmt;
use std::time::Instant;

use cubesweep_config::{FailurePolicy, Mode, SweepConfig, SweepShape};
use tracing::{debug, info, warn};

use crate::aggregate::Aggregator;
use crate::corpus::Corpus;
use crate::error::{Result, SweepError};
use crate::report::RowSink;
use crate::result::{ResultRow, SecondaryAxis};
use crate::trial::{Solver, TrialConfig};

/// One enumerated point of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPoint<'a> {
    /// 0-based corpus row of the scramble.
    pub row: usize,
    /// Value written in the first column.
    pub axis: usize,
    pub secondary: SecondaryAxis,
    pub trial: TrialConfig<'a>,
}

impl fmt::Display for SweepPoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corpus row {}: {}", self.row + 1, self.trial)
    }
}

/// Enumerates the points of `shape` in execution order.
///
/// The order is outer algorithm, then the swept axis, then corpus row. Row
/// positions in the output table depend on it.
pub fn plan<'a>(
    shape: &SweepShape,
    algorithms: &'a [String],
    corpus: &'a Corpus,
) -> Result<Vec<SweepPoint<'a>>> {
    let mut points = Vec::new();
    match shape {
        SweepShape::Size(size) => {
            for algorithm in algorithms {
                for &mode in &size.modes {
                    for (row, scramble) in corpus.iter().enumerate() {
                        let trial = match mode {
                            Mode::Sequential => TrialConfig::sequential(scramble, algorithm),
                            Mode::Parallel => {
                                TrialConfig::parallel(scramble, algorithm, size.parallelism)
                            }
                        };
                        points.push(SweepPoint {
                            row,
                            axis: scramble.move_count(),
                            secondary: SecondaryAxis::Mode(mode),
                            trial,
                        });
                    }
                }
            }
        }
        SweepShape::Parallelism(parallelism) => {
            let rows = parallelism.rows();
            corpus.check_rows(&rows)?;
            for algorithm in algorithms {
                for degree in parallelism.degrees() {
                    for row in rows.clone() {
                        let Some(scramble) = corpus.get(row) else {
                            continue;
                        };
                        points.push(SweepPoint {
                            row,
                            axis: row + 1,
                            secondary: SecondaryAxis::Parallelism(degree),
                            trial: TrialConfig::parallel(scramble, algorithm, degree),
                        });
                    }
                }
            }
        }
    }
    Ok(points)
}

/// Drives an [`Aggregator`] across every point of a sweep shape.
pub struct SweepController<S> {
    shape: SweepShape,
    algorithms: Vec<String>,
    aggregator: Aggregator<S>,
    on_failure: FailurePolicy,
}

impl<S: Solver> SweepController<S> {
    /// Creates a fail-fast controller.
    pub fn new(shape: SweepShape, algorithms: Vec<String>, aggregator: Aggregator<S>) -> Self {
        Self {
            shape,
            algorithms,
            aggregator,
            on_failure: FailurePolicy::Abort,
        }
    }

    /// Builds a controller from a validated configuration.
    pub fn from_config(config: &SweepConfig, solver: S) -> Self {
        let aggregator = Aggregator::new(solver)
            .with_runs(config.runs)
            .with_warmup_runs(config.warmup_runs);
        Self::new(config.shape.clone(), config.algorithms.clone(), aggregator)
            .with_failure_policy(config.on_failure)
    }

    /// Sets the policy for points that cannot be measured.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    pub fn shape(&self) -> &SweepShape {
        &self.shape
    }

    pub fn algorithms(&self) -> &[String] {
        &self.algorithms
    }

    pub fn aggregator(&self) -> &Aggregator<S> {
        &self.aggregator
    }

    /// Enumerates this controller's points over `corpus`.
    pub fn plan<'a>(&'a self, corpus: &'a Corpus) -> Result<Vec<SweepPoint<'a>>> {
        plan(&self.shape, &self.algorithms, corpus)
    }

    /// Measures every point in order, writing each row to `sink` as soon as
    /// it is produced.
    ///
    /// Under [`FailurePolicy::Abort`] the first failed point ends the sweep;
    /// rows already written stay in the sink.
    pub fn run_sweep<K: RowSink>(&self, corpus: &Corpus, sink: &mut K) -> Result<Vec<ResultRow>> {
        let points = self.plan(corpus)?;
        let started = Instant::now();
        info!(
            event = "sweep_start",
            shape = self.shape.name(),
            points = points.len() as u64,
            runs = self.aggregator.runs() as u64,
            algorithms = self.algorithms.len() as u64,
        );

        let mut rows = Vec::with_capacity(points.len());
        let mut skipped = 0u64;
        for (index, point) in points.iter().enumerate() {
            debug!(event = "point_start", index = index as u64, point = %point);

            let result = match self.aggregator.aggregate(&point.trial) {
                Ok(result) => result,
                Err(source) => match self.on_failure {
                    FailurePolicy::Abort => {
                        return Err(SweepError::Trial {
                            point: point.to_string(),
                            source,
                        });
                    }
                    FailurePolicy::Skip => {
                        warn!(event = "point_skipped", point = %point, error = %source);
                        skipped += 1;
                        continue;
                    }
                },
            };

            let row = ResultRow {
                axis: point.axis,
                algorithm: point.trial.algorithm.to_string(),
                secondary: point.secondary,
                time: result.mean,
            };
            sink.write_row(&row)?;
            info!(
                event = "row",
                index = index as u64,
                points = points.len() as u64,
                line = %row.to_csv_line(),
            );
            rows.push(row);
        }

        info!(
            event = "sweep_end",
            rows = rows.len() as u64,
            skipped = skipped,
            duration_ms = started.elapsed().as_millis() as u64,
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests;
