//! the append-only history log.
//!
//! every successful observation is appended to the log as one line, regardless of whether it has
//! since been evicted from the rolling window:
//!
//! ```text
//! 2024-05-01 12:00:00,12.5,3.0,100.0,0.0
//! ```

use {
    chrono::NaiveDateTime,
    std::{
        collections::BTreeSet,
        fmt::{self, Display},
        fs::{File, OpenOptions},
        io::{self, Write},
        num::ParseFloatError,
        path::{Path, PathBuf},
        str::FromStr,
    },
    thiserror::Error,
    tracing::debug,
};

#[cfg(test)]
mod tests;

/// a durable sink for observations.
pub trait History {
    /// records the observation `values`, made at the wall-clock time `timestamp`.
    fn write(&mut self, timestamp: NaiveDateTime, values: &[f64]) -> Result<(), PersistenceError>;
}

/// appends records to a history file.
///
/// each record is formatted in full, then handed to the operating system with a single write and
/// flushed before [`History::write()`] returns. the file is never synced to disk explicitly; a
/// record survives a crash of this process, but not necessarily of the machine.
#[derive(Debug)]
pub struct HistoryWriter {
    path: PathBuf,
    file: File,
}

/// one line of the history file.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryRecord {
    /// the local wall-clock time of the observation, to the second.
    pub timestamp: NaiveDateTime,
    /// the utilization of each core, in percent.
    pub values: Vec<f64>,
}

/// a record could not be persisted.
#[derive(Debug, Error)]
#[error("failed to write history to {}: {source}", .path.display())]
pub struct PersistenceError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

#[derive(Debug, Error, PartialEq)]
pub enum RecordParseError {
    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("invalid percentage: {0}")]
    Value(#[from] ParseFloatError),
    #[error("record holds no values")]
    NoValues,
}

/// a mock history, which keeps its records in memory.
#[derive(Debug, Default)]
#[allow(dead_code, reason = "this is a testing utility.")]
pub struct MockHistory {
    records: Vec<HistoryRecord>,
    /// zero-based indices of the writes that should fail.
    failures: BTreeSet<usize>,
    writes: usize,
}

// === impl HistoryWriter ===

impl HistoryWriter {
    /// opens the history file at `path` for appending, creating it if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_owned();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| PersistenceError::new(&path, source))?;

        debug!(path = %path.display(), "opened history file");
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl History for HistoryWriter {
    fn write(&mut self, timestamp: NaiveDateTime, values: &[f64]) -> Result<(), PersistenceError> {
        let Self { path, file } = self;

        let line = format!("{}\n", Line { timestamp, values });
        file.write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|source| PersistenceError::new(path, source))
    }
}

// === impl HistoryRecord ===

impl HistoryRecord {
    /// the format of a record's timestamp.
    pub const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";
}

impl Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { timestamp, values } = self;
        Line {
            timestamp: *timestamp,
            values,
        }
        .fmt(f)
    }
}

impl FromStr for HistoryRecord {
    type Err = RecordParseError;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.trim_end().split(',');

        let timestamp = fields.next().unwrap_or_default();
        let timestamp = NaiveDateTime::parse_from_str(timestamp, Self::TIMESTAMP)?;

        let values = fields
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()?;
        if values.is_empty() {
            return Err(RecordParseError::NoValues);
        }

        Ok(Self { timestamp, values })
    }
}

/// a borrowed record, formatted as one line of the history file (without its newline).
struct Line<'a> {
    timestamp: NaiveDateTime,
    values: &'a [f64],
}

impl Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { timestamp, values } = self;

        write!(f, "{}", timestamp.format(HistoryRecord::TIMESTAMP))?;
        for value in values.iter() {
            write!(f, ",{value:?}")?;
        }

        Ok(())
    }
}

// === impl PersistenceError ===

impl PersistenceError {
    fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_owned(),
            source,
        }
    }
}

// === impl MockHistory ===

impl MockHistory {
    /// makes the `n`th write (counting from zero) fail.
    #[allow(dead_code, reason = "this is a testing utility.")]
    pub fn fail_on(mut self, n: usize) -> Self {
        self.failures.insert(n);
        self
    }

    /// the records written so far.
    #[allow(dead_code, reason = "this is a testing utility.")]
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }
}

impl History for MockHistory {
    fn write(&mut self, timestamp: NaiveDateTime, values: &[f64]) -> Result<(), PersistenceError> {
        let Self {
            records,
            failures,
            writes,
        } = self;

        let n = *writes;
        *writes += 1;
        if failures.contains(&n) {
            let source = io::Error::new(io::ErrorKind::StorageFull, "mock history is full");
            return Err(PersistenceError::new(Path::new("mock"), source));
        }

        records.push(HistoryRecord {
            timestamp,
            values: values.to_vec(),
        });
        Ok(())
    }
}
