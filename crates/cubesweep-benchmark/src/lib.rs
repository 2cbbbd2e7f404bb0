//! Benchmark sweep harness for an external puzzle solver.
//!
//! This crate drives a black-box solver executable across a matrix of
//! configurations, repeats each configuration to average out noise, and
//! streams one CSV row per configuration.
//!
//! # Overview
//!
//! - [`Corpus`] loads the scramble corpus, one scramble per line
//! - [`ProcessSolver`] runs one trial in a fresh solver process and parses its
//!   elapsed time
//! - [`Aggregator`] repeats a trial and reduces the timings to a rounded mean
//! - [`SweepController`] enumerates a [`SweepShape`](cubesweep_config::SweepShape)
//!   and writes rows to a [`RowSink`] in enumeration order
//!
//! The harness itself is single-threaded: trials and points run strictly one
//! after another so that measurements never contend with each other.
//!
//! # Example
//!
//! ```
//! use cubesweep_benchmark::{
//!     Aggregator, Corpus, CsvTable, Solver, SweepController, TrialConfig, TrialError,
//! };
//! use cubesweep_config::SweepShape;
//!
//! struct Constant;
//!
//! impl Solver for Constant {
//!     fn run(&self, _config: &TrialConfig<'_>) -> Result<f64, TrialError> {
//!         Ok(0.5)
//!     }
//! }
//!
//! let corpus = Corpus::from_lines(["R U R'", "F2 B2"]);
//! let controller = SweepController::new(
//!     SweepShape::default(),
//!     vec!["bfs".to_string()],
//!     Aggregator::new(Constant).with_runs(1),
//! );
//!
//! let mut table = CsvTable::new(Vec::new());
//! let rows = controller.run_sweep(&corpus, &mut table).unwrap();
//! assert_eq!(rows.len(), 4);
//! assert_eq!(
//!     String::from_utf8(table.into_inner()).unwrap(),
//!     "3,bfs,s,0.500\n2,bfs,s,0.500\n3,bfs,p,0.500\n2,bfs,p,0.500\n"
//! );
//! ```

mod aggregate;
mod corpus;
mod error;
mod process;
mod report;
mod result;
mod sweep;
mod trial;

#[cfg(test)]
mod test_utils;

pub use aggregate::Aggregator;
pub use corpus::{Corpus, Scramble};
pub use error::{Result, SweepError, TrialError};
pub use report::{CsvTable, RowSink, SummaryReport};
pub use result::{round_to, AggregateResult, ResultRow, SecondaryAxis, TIME_DECIMALS};
pub use sweep::{plan, SweepController, SweepPoint};
pub use trial::{parse_elapsed, ProcessSolver, Solver, TrialConfig};
