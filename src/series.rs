//! a bounded, rolling window of per-core observations.

use {std::collections::VecDeque, thiserror::Error};

#[cfg(test)]
mod tests;

/// retains the most recent observations of each core.
///
/// the store holds one sequence of tick indices, and one sequence of percentages per core. all of
/// these sequences are index-aligned and always have the same length, which never exceeds the
/// store's capacity. once the window is full, each append evicts the oldest entry.
#[derive(Clone, Debug)]
pub struct SeriesStore {
    /// the maximum number of ticks retained.
    capacity: usize,
    /// the tick index of each retained observation.
    ticks: VecDeque<u64>,
    /// the retained percentages, one series per core.
    cores: Vec<VecDeque<f64>>,
}

/// an immutable copy of a [`SeriesStore`]'s window.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// the tick index of each retained observation, oldest first.
    pub ticks: Vec<u64>,
    /// the retained percentages, one series per core, aligned with `ticks`.
    pub cores: Vec<Vec<f64>>,
}

/// an observation did not cover the number of cores being monitored.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("expected values for {expected} cores, got {actual}")]
pub struct CardinalityMismatch {
    pub expected: usize,
    pub actual: usize,
}

// === impl SeriesStore ===

impl SeriesStore {
    /// returns an empty store for `cores` cores, retaining at most `capacity` ticks.
    ///
    /// # panics
    ///
    /// panics if `capacity` or `cores` is zero. [`Config`][crate::Config] guarantees neither is.
    pub fn new(capacity: usize, cores: usize) -> Self {
        assert!(capacity > 0, "window capacity must be at least one");
        assert!(cores > 0, "core count must be at least one");

        Self {
            capacity,
            ticks: Self::ring(capacity),
            cores: (0..cores).map(|_| Self::ring(capacity)).collect(),
        }
    }

    /// one spare slot holds the newest entry until the oldest is evicted.
    fn ring<T>(capacity: usize) -> VecDeque<T> {
        VecDeque::with_capacity(capacity + 1)
    }

    /// appends an observation made at `tick`.
    ///
    /// `values` must hold one percentage per core; otherwise the store is left untouched and a
    /// [`CardinalityMismatch`] is returned.
    pub fn append(&mut self, tick: u64, values: &[f64]) -> Result<(), CardinalityMismatch> {
        let Self {
            capacity,
            ticks,
            cores,
        } = self;

        if values.len() != cores.len() {
            return Err(CardinalityMismatch {
                expected: cores.len(),
                actual: values.len(),
            });
        }

        ticks.push_back(tick);
        for (series, value) in cores.iter_mut().zip(values) {
            series.push_back(*value);
        }

        if ticks.len() > *capacity {
            ticks.pop_front();
            for series in cores.iter_mut() {
                series.pop_front();
            }
        }

        debug_assert!(cores.iter().all(|series| series.len() == ticks.len()));
        Ok(())
    }

    /// returns a copy of the current window.
    pub fn snapshot(&self) -> Snapshot {
        let Self { ticks, cores, .. } = self;

        Snapshot {
            ticks: ticks.iter().copied().collect(),
            cores: cores
                .iter()
                .map(|series| series.iter().copied().collect())
                .collect(),
        }
    }

    /// the number of ticks currently retained.
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// the maximum number of ticks retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// the number of cores being monitored.
    pub fn cores(&self) -> usize {
        self.cores.len()
    }
}

// === impl Snapshot ===

impl Snapshot {
    /// the number of cores in this snapshot.
    pub fn core_count(&self) -> usize {
        self.cores.len()
    }

    /// the oldest and newest tick in the window, if any.
    pub fn span(&self) -> Option<(u64, u64)> {
        let Self { ticks, .. } = self;
        ticks.first().copied().zip(ticks.last().copied())
    }

    /// the newest percentage of each core, if any.
    pub fn latest(&self) -> Option<Vec<f64>> {
        self.cores
            .iter()
            .map(|series| series.last().copied())
            .collect()
    }
}
