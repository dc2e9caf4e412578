use {
    crate::{
        sampler::{SampleUnavailable, Sampler},
        series::CardinalityMismatch,
        source::{Clock, ProcStatFile, StatsSource, SystemClock},
        stat::{CpuId, CpuTime, Measurement, Reading, StatReadError},
    },
    tracing::{debug, trace},
};

/// observes kernel statistics.
///
/// a sentinel samples the first `cores` cpus listed in `/proc/stat`. each observation covers the
/// time since the previous one; the first covers the time since the sentinel was created.
pub struct Sentinel<C = SystemClock, S = ProcStatFile> {
    /// the clock being used to measure time.
    clock: C,
    /// the underlying source of kernel statistics.
    source: S,
    /// the number of cpus being observed.
    cores: usize,
    /// the last observed reading.
    last: Reading,
}

#[derive(Debug, thiserror::Error)]
pub enum SentinelError {
    #[error("failed to take a baseline reading: {0}")]
    Baseline(#[from] StatReadError),
    #[error(transparent)]
    Cardinality(#[from] CardinalityMismatch),
}

// === impl Sentinel ===

impl Sentinel {
    /// creates a new [`Sentinel`] observing `/proc/stat`.
    pub fn new(cores: usize) -> Result<Self, SentinelError> {
        Self::with_source(SystemClock, ProcStatFile, cores)
    }
}

impl<C, S> Sentinel<C, S>
where
    C: Clock,
    S: StatsSource,
{
    /// creates a new [`Sentinel`] with the given clock and statistics source.
    ///
    /// this takes a baseline reading, and fails if fewer than `cores` cpus are listed.
    pub fn with_source(clock: C, source: S, cores: usize) -> Result<Self, SentinelError> {
        let last = Reading::read(&source, &clock)?;
        let available = last.cpus.len();
        if available < cores {
            return Err(CardinalityMismatch {
                expected: cores,
                actual: available,
            }
            .into());
        }

        debug!(cores, available, "took baseline cpu reading");
        Ok(Self {
            clock,
            source,
            cores,
            last,
        })
    }

    /// returns the [`CpuTime`] of each observed cpu, in order.
    fn observed(cores: usize, reading: &Reading) -> Result<Vec<&CpuTime>, SampleUnavailable> {
        (0..cores)
            .map(|i| {
                u16::try_from(i)
                    .ok()
                    .map(CpuId::new)
                    .and_then(|id| reading.cpus.get(&id))
                    .ok_or(SampleUnavailable::MissingCpu(i))
            })
            .collect()
    }
}

impl<C, S> Sampler for Sentinel<C, S>
where
    C: Clock,
    S: StatsSource,
{
    fn cores(&self) -> usize {
        self.cores
    }

    /// NB: the previous reading is only replaced once a new one was parsed in full, so a failed
    /// read does not lose the baseline.
    fn read(&mut self) -> Result<Vec<f64>, SampleUnavailable> {
        let Self {
            clock,
            source,
            cores,
            last,
        } = self;

        let new = Reading::read(&*source, &*clock)?;
        let percentages = {
            let prev = Self::observed(*cores, last)?;
            let next = Self::observed(*cores, &new)?;
            prev.into_iter()
                .zip(next)
                .map(|(a, b)| Measurement::new(a, b).percentage())
                .collect::<Vec<_>>()
        };

        trace!(
            elapsed_ms = new.time.saturating_duration_since(last.time).as_millis(),
            "observed cpu utilization"
        );
        *last = new;

        Ok(percentages)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::source::{MockClock, MockStatFile},
    };

    fn table(rows: &[[u64; 4]]) -> String {
        rows.iter()
            .enumerate()
            .map(|(i, [user, nice, system, idle])| {
                format!("cpu{i} {user} {nice} {system} {idle} 0 0 0 0 0 0\n")
            })
            .collect()
    }

    fn sentinel(tables: Vec<String>, cores: usize) -> Sentinel<MockClock, MockStatFile> {
        let source = MockStatFile::from_iter(tables);
        Sentinel::with_source(MockClock::default(), source, cores).unwrap()
    }

    #[test]
    fn first_read_is_since_baseline() {
        let mut sentinel = sentinel(
            vec![
                table(&[[100, 0, 100, 800], [0, 0, 0, 1000]]),
                table(&[[150, 0, 150, 900], [100, 0, 0, 1000]]),
            ],
            2,
        );
        assert_eq!(sentinel.read().unwrap(), vec![50.0, 100.0]);
    }

    #[test]
    fn successive_reads_are_deltas() {
        let mut sentinel = sentinel(
            vec![
                table(&[[0, 0, 0, 0]]),
                table(&[[10, 0, 0, 30]]),
                table(&[[10, 0, 0, 40]]),
            ],
            1,
        );
        assert_eq!(sentinel.read().unwrap(), vec![25.0]);
        assert_eq!(sentinel.read().unwrap(), vec![0.0]);
    }

    #[test]
    fn observes_only_the_requested_cores() {
        let mut sentinel = sentinel(
            vec![
                table(&[[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]),
                table(&[[1, 0, 0, 1], [2, 0, 0, 0], [0, 0, 0, 2]]),
            ],
            2,
        );
        assert_eq!(sentinel.cores(), 2);
        assert_eq!(sentinel.read().unwrap(), vec![50.0, 100.0]);
    }

    #[test]
    fn guest_and_iowait_do_not_inflate_utilization() {
        let source = MockStatFile::from_iter([
            "cpu0 0 0 0 0 0 0 0 0 0 0\ncpu1 0 0 0 0 0 0 0 0 0 0\n",
            "cpu0 100 0 0 100 0 0 0 0 100 0\ncpu1 0 0 0 100 100 0 0 0 0 0\n",
        ]);
        let mut sentinel = Sentinel::with_source(MockClock::default(), source, 2).unwrap();
        assert_eq!(sentinel.read().unwrap(), vec![50.0, 0.0]);
    }

    #[test]
    fn too_few_cores_is_a_startup_fault() {
        let source = MockStatFile::from_iter([table(&[[0, 0, 0, 0]])]);
        let err = Sentinel::with_source(MockClock::default(), source, 4).err().unwrap();
        assert!(matches!(
            err,
            SentinelError::Cardinality(CardinalityMismatch {
                expected: 4,
                actual: 1
            })
        ));
    }

    #[test]
    fn missing_core_is_unavailable() {
        let mut sentinel = sentinel(
            vec![
                table(&[[0, 0, 0, 0], [0, 0, 0, 0]]),
                table(&[[1, 0, 0, 1]]),
            ],
            2,
        );
        let err = sentinel.read().unwrap_err();
        assert!(matches!(err, SampleUnavailable::MissingCpu(1)));
    }

    #[test]
    fn failed_read_keeps_the_baseline() {
        let mut sentinel = sentinel(vec![table(&[[0, 0, 0, 0]])], 1);
        assert!(matches!(sentinel.read(), Err(SampleUnavailable::Stat(_))));

        sentinel.source.push(table(&[[5, 0, 0, 15]]));
        assert_eq!(sentinel.read().unwrap(), vec![25.0]);
    }
}
