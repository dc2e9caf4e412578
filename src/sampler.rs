//! per-core utilization sampling.

use {
    crate::stat::StatReadError,
    std::collections::VecDeque,
    thiserror::Error,
};

/// a source of per-core utilization observations.
pub trait Sampler {
    /// the number of cores each observation covers.
    fn cores(&self) -> usize;

    /// returns the utilization of each core, in percent, since the previous read.
    ///
    /// the returned vector holds exactly [`Sampler::cores()`] values in `[0, 100]`. a sampler
    /// that cannot report every core must fail rather than fill in the gaps.
    fn read(&mut self) -> Result<Vec<f64>, SampleUnavailable>;
}

/// the sampler could not produce an observation this tick.
#[derive(Debug, Error)]
pub enum SampleUnavailable {
    #[error("failed to read kernel statistics: {0}")]
    Stat(#[from] StatReadError),
    #[error("cpu{0} is missing from the kernel statistics")]
    MissingCpu(usize),
    #[error("{0}")]
    Other(String),
}

/// a mock sampler, which replays a script of observations.
///
/// once the script runs out, every read fails.
#[allow(dead_code, reason = "this is a testing utility.")]
pub struct MockSampler {
    cores: usize,
    script: VecDeque<Result<Vec<f64>, String>>,
}

// === impl MockSampler ===

impl MockSampler {
    #[allow(dead_code, reason = "this is a testing utility.")]
    pub fn new(cores: usize) -> Self {
        Self {
            cores,
            script: VecDeque::new(),
        }
    }

    /// queues a successful observation.
    #[allow(dead_code, reason = "this is a testing utility.")]
    pub fn then(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.script.push_back(Ok(values.into()));
        self
    }

    /// queues a failed observation.
    #[allow(dead_code, reason = "this is a testing utility.")]
    pub fn then_fail(mut self, reason: impl Into<String>) -> Self {
        self.script.push_back(Err(reason.into()));
        self
    }
}

impl Sampler for MockSampler {
    fn cores(&self) -> usize {
        self.cores
    }

    fn read(&mut self) -> Result<Vec<f64>, SampleUnavailable> {
        match self.script.pop_front() {
            Some(Ok(values)) => Ok(values),
            Some(Err(reason)) => Err(SampleUnavailable::Other(reason)),
            None => Err(SampleUnavailable::Other("mock script is exhausted".to_owned())),
        }
    }
}
