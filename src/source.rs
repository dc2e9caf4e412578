//! seams between the monitor and the outside world.
//!
//! kernel statistics and the passage of time are both read through a trait here, so that the
//! sampling logic can be driven by canned data in tests.

use std::{
    cell::RefCell,
    collections::VecDeque,
    fs::File,
    io::{self, BufReader, Cursor, Read},
    time::{Duration, Instant},
};

pub use self::{clock::*, stats::*};

mod clock {
    use super::*;

    /// a source of monotonic time.
    pub trait Clock {
        fn now(&self) -> Instant;
    }

    #[derive(Clone, Copy, Debug, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> Instant {
            Instant::now()
        }
    }

    /// a mock clock, which advances by a fixed step each time it is read.
    #[allow(dead_code, reason = "this is a testing utility.")]
    pub struct MockClock {
        next: RefCell<Instant>,
        step: Duration,
    }

    impl MockClock {
        /// returns a clock that advances by `step` every time it is read.
        #[allow(dead_code, reason = "this is a testing utility.")]
        pub fn stepping(step: Duration) -> Self {
            Self {
                next: RefCell::new(Instant::now()),
                step,
            }
        }
    }

    impl Default for MockClock {
        fn default() -> Self {
            Self::stepping(Duration::from_secs(1))
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> Instant {
            let Self { next, step } = self;
            let mut next = next.borrow_mut();
            let now = *next;
            *next += *step;
            now
        }
    }
}

/// abstracts over providers of statistics.
mod stats {
    use super::*;

    /// a source of kernel statistics.
    pub trait StatsSource {
        /// returns a reader.
        fn open(&self) -> io::Result<impl Read>;
    }

    /// stats backed by `/proc/stat`.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct ProcStatFile;

    /// a mock stat source.
    ///
    /// each call to [`StatsSource::open()`] yields the next queued table. once the queue is
    /// exhausted, opening fails with [`io::ErrorKind::NotFound`].
    #[derive(Default)]
    #[allow(dead_code, reason = "this is a testing utility.")]
    pub struct MockStatFile {
        stats: RefCell<VecDeque<String>>,
    }

    // === impl ProcStatFile ===

    impl StatsSource for ProcStatFile {
        fn open(&self) -> io::Result<impl Read> {
            File::open(Self::STAT).map(BufReader::new)
        }
    }

    impl ProcStatFile {
        const STAT: &str = "/proc/stat";
    }

    // === impl MockStatFile ===

    impl MockStatFile {
        /// queues another table to be returned by the source.
        #[allow(dead_code, reason = "this is a testing utility.")]
        pub fn push(&self, table: impl Into<String>) {
            self.stats.borrow_mut().push_back(table.into());
        }
    }

    impl<T: Into<String>> FromIterator<T> for MockStatFile {
        fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
            let stats = iter.into_iter().map(Into::into).collect();
            Self {
                stats: RefCell::new(stats),
            }
        }
    }

    impl StatsSource for MockStatFile {
        fn open(&self) -> io::Result<impl Read> {
            let Self { stats } = self;

            stats
                .borrow_mut()
                .pop_front()
                .map(Cursor::new)
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "mock stats are exhausted"))
        }
    }
}
