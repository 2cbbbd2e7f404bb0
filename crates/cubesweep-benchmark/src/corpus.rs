//! Scramble corpus loading.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::RangeInclusive;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SweepError};

/// One puzzle instance as a line of whitespace-separated move tokens.
///
/// # Example
///
/// ```
/// use cubesweep_benchmark::Scramble;
///
/// let scramble = Scramble::new("R U R' U'");
/// assert_eq!(scramble.move_count(), 4);
/// assert_eq!(scramble.text(), "R U R' U'");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scramble {
    text: String,
}

impl Scramble {
    /// Creates a scramble from one corpus line.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the raw scramble text sent to the solver.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the move tokens.
    pub fn moves(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }

    /// Returns the problem size: the number of move tokens.
    pub fn move_count(&self) -> usize {
        self.moves().count()
    }
}

/// Ordered, read-only sequence of scrambles.
///
/// Row indices are stable for the life of the process; sweeps refer to
/// scrambles by their 0-based row.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    scrambles: Vec<Scramble>,
}

impl Corpus {
    /// Loads a corpus file, one scramble per line, preserving file order.
    ///
    /// A missing or unreadable file is fatal: a partial corpus would shift
    /// the row numbers sweeps refer to.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let unavailable = |source| SweepError::CorpusUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(unavailable)?;
        let mut scrambles = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(unavailable)?;
            scrambles.push(Scramble::new(line.trim_end_matches('\r')));
        }

        debug!(
            event = "corpus_loaded",
            path = %path.display(),
            scrambles = scrambles.len() as u64,
        );
        Ok(Self { scrambles })
    }

    /// Builds a corpus from in-memory lines.
    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            scrambles: lines.into_iter().map(Scramble::new).collect(),
        }
    }

    /// Returns the number of scrambles.
    pub fn len(&self) -> usize {
        self.scrambles.len()
    }

    /// Returns true if the corpus holds no scrambles.
    pub fn is_empty(&self) -> bool {
        self.scrambles.is_empty()
    }

    /// Returns the scramble at a 0-based row.
    pub fn get(&self, row: usize) -> Option<&Scramble> {
        self.scrambles.get(row)
    }

    /// Iterates scrambles in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, Scramble> {
        self.scrambles.iter()
    }

    /// Checks that every row of an inclusive range exists.
    pub fn check_rows(&self, rows: &RangeInclusive<usize>) -> Result<()> {
        if rows.is_empty() || *rows.end() >= self.len() {
            return Err(SweepError::CorpusRange {
                first: *rows.start(),
                last: *rows.end(),
                len: self.len(),
            });
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Scramble;
    type IntoIter = std::slice::Iter<'a, Scramble>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
