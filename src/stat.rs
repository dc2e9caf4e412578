use {
    crate::source::{Clock, StatsSource},
    std::{
        collections::BTreeMap,
        io::{self, BufRead, BufReader},
        num::ParseIntError,
        str::FromStr,
        time::Instant,
    },
    thiserror::Error,
    tracing::trace,
};

pub use self::{
    cpu_time::{CpuTime, Measurement},
    user_hz::UserHz,
};

mod cpu_time;
mod user_hz;


/// a reading of the cpus' statistics at a moment in time.
#[derive(Clone, Debug)]
pub struct Reading {
    pub cpus: BTreeMap<CpuId, CpuTime>,
    pub time: Instant,
}

/// one row of `/proc/stat`, identified by its leading keyword.
///
/// only the `cpu` rows carry data that tach uses. the other well-known rows are recognized so
/// that they can be told apart from garbage, and their contents are ignored. see `proc_stat(5)`.
#[derive(Debug, Eq, PartialEq)]
pub enum Entry {
    /// the `cpu` row, summed over every cpu.
    AllCpu { time: CpuTime },
    /// a `cpuN` row.
    Cpu { id: CpuId, time: CpuTime },
    Page,
    Swap,
    Intr,
    DiskIo,
    Ctxt,
    Btime,
    Processes,
    ProcsRunning,
    ProcsBlocked,
    SoftIrq,
}

/// the index of a cpu, as in the `cpuN` rows of `/proc/stat`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CpuId(u16);

#[derive(Debug, Eq, Error, PartialEq)]
pub enum EntryParseError {
    #[error("empty entry")]
    Empty,
    #[error("unrecognized entry kind: {kind}")]
    UnrecognizedEntry { kind: String },
    #[error("invalid cpu id: {0}")]
    CpuIdParse(#[source] ParseIntError),
    #[error("invalid time value: {0}")]
    UserHzParse(#[source] ParseIntError),
    #[error("cpu entry has {0} time fields, expected {expected}", expected = CpuTime::FIELDS)]
    CpuTime(usize),
}

#[derive(Debug, Error)]
pub enum StatReadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Entry(#[from] EntryParseError),
}

enum Either<'a> {
    Cpu(&'a str),
    Entry(Entry),
}

// === impl Reading ===

impl Reading {
    /// uses the given source to parse a reading of the cpu statistics.
    ///
    /// rows of a kind this parser does not know about are skipped, newer kernels are free to
    /// add them.
    pub(crate) fn read(
        stats: &impl StatsSource,
        clock: &impl Clock,
    ) -> Result<Reading, StatReadError> {
        let time = clock.now();
        let reader = stats.open().map(BufReader::new)?;

        let mut cpus = BTreeMap::new();
        for line in reader.lines() {
            let line = line?;
            match line.parse::<Entry>() {
                Ok(Entry::Cpu { id, time }) => {
                    cpus.insert(id, time);
                }
                Ok(_) => {}
                Err(EntryParseError::UnrecognizedEntry { kind }) => {
                    trace!(%kind, "skipping unrecognized stat entry");
                }
                Err(error) => return Err(error.into()),
            }
        }

        Ok(Reading { cpus, time })
    }
}

// === impl Entry ===

impl FromStr for Entry {
    type Err = EntryParseError;
    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let mut tokens = entry.split_whitespace();
        let kind = tokens.next().ok_or(EntryParseError::Empty)?;

        let id = match Self::parse_entry_kind(kind) {
            Either::Cpu(cpu) => Self::parse_cpu_id(cpu)?,
            Either::Entry(entry) => return Ok(entry),
        };

        let time = tokens
            .map(str::parse::<UserHz>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(EntryParseError::UserHzParse)
            .and_then(CpuTime::try_from)?;

        Ok(if let Some(id) = id {
            Self::Cpu { id, time }
        } else {
            Self::AllCpu { time }
        })
    }
}

impl Entry {
    fn parse_entry_kind(kind: &str) -> Either<'_> {
        use Entry::*;

        match kind {
            "page" => Either::Entry(Page),
            "swap" => Either::Entry(Swap),
            "intr" => Either::Entry(Intr),
            "disk_io" => Either::Entry(DiskIo),
            "ctxt" => Either::Entry(Ctxt),
            "btime" => Either::Entry(Btime),
            "processes" => Either::Entry(Processes),
            "procs_running" => Either::Entry(ProcsRunning),
            "procs_blocked" => Either::Entry(ProcsBlocked),
            "softirq" => Either::Entry(SoftIrq),
            cpu => Either::Cpu(cpu),
        }
    }

    fn parse_cpu_id(token: &str) -> Result<Option<CpuId>, EntryParseError> {
        use EntryParseError::{CpuIdParse, UnrecognizedEntry};

        // strip the token of its "cpu" prefix.
        let suffix = token.strip_prefix("cpu").ok_or_else(|| UnrecognizedEntry {
            kind: token.to_owned(),
        })?;

        // if there is no suffix, return `None`.
        if suffix.is_empty() {
            return Ok(None);
        }

        // parse the id into an integer.
        suffix
            .parse::<u16>()
            .map(CpuId)
            .map(Some)
            .map_err(CpuIdParse)
    }
}

// === impl CpuId ===

impl CpuId {
    pub fn new(id: u16) -> Self {
        Self(id)
    }
}
