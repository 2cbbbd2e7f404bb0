//! Sweep result types.

use std::fmt;

use cubesweep_config::Mode;

/// Decimal places kept in averaged timings.
pub const TIME_DECIMALS: u32 = 3;

/// Rounds `value` to `decimals` places, half away from zero.
///
/// # Example
///
/// ```
/// use cubesweep_benchmark::round_to;
///
/// assert_eq!(round_to(1.23456, 3), 1.235);
/// assert_eq!(round_to(2.0, 3), 2.0);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Reduced timing for one sweep point.
///
/// `mean` is rounded to [`TIME_DECIMALS`] places and computed over exactly
/// `runs` measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    /// Number of measured trials (always at least 1).
    pub runs: usize,
    /// Rounded arithmetic mean.
    pub mean: f64,
    /// Fastest measured trial.
    pub min: f64,
    /// Slowest measured trial.
    pub max: f64,
}

impl AggregateResult {
    /// Reduces a non-empty set of measurements. Returns `None` when empty.
    ///
    /// # Example
    ///
    /// ```
    /// use cubesweep_benchmark::AggregateResult;
    ///
    /// let result = AggregateResult::from_measurements(&[1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(result.mean, 2.0);
    /// assert_eq!(result.runs, 3);
    /// assert!(AggregateResult::from_measurements(&[]).is_none());
    /// ```
    pub fn from_measurements(measurements: &[f64]) -> Option<Self> {
        if measurements.is_empty() {
            return None;
        }
        let total: f64 = measurements.iter().sum();
        let mean = round_to(total / measurements.len() as f64, TIME_DECIMALS);
        let min = measurements.iter().copied().fold(f64::INFINITY, f64::min);
        let max = measurements.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            runs: measurements.len(),
            mean,
            min,
            max,
        })
    }
}

/// Third column of a result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SecondaryAxis {
    /// Size sweeps record the mode discriminator.
    Mode(Mode),
    /// Parallelism sweeps record the degree.
    Parallelism(usize),
}

impl From<Mode> for SecondaryAxis {
    fn from(mode: Mode) -> Self {
        SecondaryAxis::Mode(mode)
    }
}

impl fmt::Display for SecondaryAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecondaryAxis::Mode(mode) => write!(f, "{}", mode),
            SecondaryAxis::Parallelism(p) => write!(f, "{}", p),
        }
    }
}

/// One line of the result table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// Swept-axis value: move count (size sweep) or 1-based corpus row
    /// (parallelism sweep).
    pub axis: usize,
    pub algorithm: String,
    pub secondary: SecondaryAxis,
    /// Averaged elapsed time.
    pub time: f64,
}

impl ResultRow {
    /// Formats the row as a CSV line without the trailing newline.
    ///
    /// # Example
    ///
    /// ```
    /// use cubesweep_benchmark::{ResultRow, SecondaryAxis};
    /// use cubesweep_config::Mode;
    ///
    /// let row = ResultRow {
    ///     axis: 3,
    ///     algorithm: "bfs".to_string(),
    ///     secondary: SecondaryAxis::from(Mode::Sequential),
    ///     time: 0.5,
    /// };
    /// assert_eq!(row.to_csv_line(), "3,bfs,s,0.500");
    /// ```
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{:.prec$}",
            self.axis,
            self.algorithm,
            self.secondary,
            self.time,
            prec = TIME_DECIMALS as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_divides_by_actual_count() {
        let r = AggregateResult::from_measurements(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(r.mean, 2.5);
        assert_eq!(r.runs, 4);

        let r = AggregateResult::from_measurements(&[0.9]).unwrap();
        assert_eq!(r.mean, 0.9);
        assert_eq!(r.runs, 1);
    }

    #[test]
    fn test_mean_rounds_to_three_places() {
        let r = AggregateResult::from_measurements(&[0.1, 0.2, 0.2]).unwrap();
        assert_eq!(r.mean, 0.167);
        assert_eq!(r.min, 0.1);
        assert_eq!(r.max, 0.2);
    }

    #[test]
    fn test_parallelism_row() {
        let row = ResultRow {
            axis: 40,
            algorithm: "astar".to_string(),
            secondary: SecondaryAxis::Parallelism(8),
            time: 12.3456,
        };
        assert_eq!(row.to_csv_line(), "40,astar,8,12.346");
    }

    #[test]
    fn test_secondary_axis_display() {
        assert_eq!(SecondaryAxis::from(Mode::Parallel).to_string(), "p");
        assert_eq!(SecondaryAxis::Parallelism(3).to_string(), "3");
    }
}
