//! Result table output and summary reports.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::result::{ResultRow, SecondaryAxis};

/// Destination for result rows, written in sweep order as they are produced.
pub trait RowSink {
    fn write_row(&mut self, row: &ResultRow) -> io::Result<()>;
}

impl<K: RowSink + ?Sized> RowSink for &mut K {
    fn write_row(&mut self, row: &ResultRow) -> io::Result<()> {
        (**self).write_row(row)
    }
}

impl RowSink for Vec<ResultRow> {
    fn write_row(&mut self, row: &ResultRow) -> io::Result<()> {
        self.push(row.clone());
        Ok(())
    }
}

/// Append-only CSV result table without a header row.
///
/// Every row is flushed as soon as it is written, so rows produced before a
/// failure survive it.
///
/// # Example
///
/// ```
/// use cubesweep_benchmark::{CsvTable, ResultRow, RowSink, SecondaryAxis};
///
/// let mut table = CsvTable::new(Vec::new());
/// table
///     .write_row(&ResultRow {
///         axis: 2,
///         algorithm: "astar".to_string(),
///         secondary: SecondaryAxis::Parallelism(4),
///         time: 1.5,
///     })
///     .unwrap();
///
/// assert_eq!(table.rows_written(), 1);
/// assert_eq!(String::from_utf8(table.into_inner()).unwrap(), "2,astar,4,1.500\n");
/// ```
#[derive(Debug)]
pub struct CsvTable<W: Write> {
    writer: W,
    rows_written: usize,
}

impl CsvTable<BufWriter<File>> {
    /// Creates (or truncates) the table file at `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> CsvTable<W> {
    /// Wraps an existing writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            rows_written: 0,
        }
    }

    /// Returns the number of rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RowSink for CsvTable<W> {
    fn write_row(&mut self, row: &ResultRow) -> io::Result<()> {
        writeln!(self.writer, "{}", row.to_csv_line())?;
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }
}

/// Markdown summary of a completed sweep.
///
/// Rows are grouped by algorithm and secondary axis, in first-appearance
/// order.
///
/// # Example
///
/// ```
/// use cubesweep_benchmark::{ResultRow, SecondaryAxis, SummaryReport};
/// use cubesweep_config::Mode;
///
/// let rows = vec![
///     ResultRow { axis: 3, algorithm: "bfs".into(), secondary: Mode::Sequential.into(), time: 1.0 },
///     ResultRow { axis: 2, algorithm: "bfs".into(), secondary: Mode::Sequential.into(), time: 3.0 },
/// ];
/// let md = SummaryReport::to_string("size", &rows);
/// assert!(md.contains("# Sweep: size"));
/// assert!(md.contains("| bfs | s | 2 | 2.000 | 1.000 | 3.000 |"));
/// ```
pub struct SummaryReport;

struct Group<'a> {
    algorithm: &'a str,
    secondary: SecondaryAxis,
    times: Vec<f64>,
}

impl SummaryReport {
    /// Generates the Markdown summary.
    pub fn to_string(title: &str, rows: &[ResultRow]) -> String {
        let mut groups: Vec<Group<'_>> = Vec::new();
        for row in rows {
            match groups
                .iter_mut()
                .find(|g| g.algorithm == row.algorithm && g.secondary == row.secondary)
            {
                Some(group) => group.times.push(row.time),
                None => groups.push(Group {
                    algorithm: &row.algorithm,
                    secondary: row.secondary,
                    times: vec![row.time],
                }),
            }
        }

        let mut output = format!("# Sweep: {}\n\n", title);
        output.push_str(&format!("- **Rows**: {}\n\n", rows.len()));

        if groups.is_empty() {
            output.push_str("*No rows recorded.*\n");
            return output;
        }

        output.push_str("## Summary\n\n");
        output.push_str("| Algorithm | Secondary | Points | Mean | Min | Max |\n");
        output.push_str("|-----------|-----------|--------|------|-----|-----|\n");
        for group in &groups {
            let total: f64 = group.times.iter().sum();
            let mean = total / group.times.len() as f64;
            let min = group.times.iter().copied().fold(f64::INFINITY, f64::min);
            let max = group.times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            output.push_str(&format!(
                "| {} | {} | {} | {:.3} | {:.3} | {:.3} |\n",
                group.algorithm,
                group.secondary,
                group.times.len(),
                mean,
                min,
                max
            ));
        }

        output
    }

    /// Writes the Markdown summary to a file.
    pub fn to_file(title: &str, rows: &[ResultRow], path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, Self::to_string(title, rows))
    }
}
