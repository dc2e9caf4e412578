use {
    crate::{
        config::Config,
        display::DisplayAdapter,
        history::History,
        sampler::Sampler,
        series::{CardinalityMismatch, SeriesStore},
    },
    chrono::Local,
    tracing::{error, trace, warn},
};

/// the work done on each tick.
///
/// a ticker samples, appends the observation to its window, and hands the result to the history
/// and the display. it is the only writer of its [`SeriesStore`].
pub struct Ticker<S, H, D> {
    sampler: S,
    store: SeriesStore,
    history: H,
    display: D,
    /// the index of the next tick.
    next: u64,
    stats: TickStats,
}

/// counts what became of each tick.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TickStats {
    /// ticks fired.
    pub fired: u64,
    /// ticks whose observation was appended to the window.
    pub sampled: u64,
    /// ticks skipped because the sampler failed.
    pub unavailable: u64,
    /// ticks skipped because the observation had the wrong number of cores.
    pub rejected: u64,
    /// observations recorded in the history.
    pub persisted: u64,
    /// observations the history failed to record.
    pub persist_failures: u64,
    /// snapshots handed to the display.
    pub rendered: u64,
    /// snapshots the display failed to draw.
    pub render_failures: u64,
}

// === impl Ticker ===

impl<S, H, D> Ticker<S, H, D>
where
    S: Sampler,
    H: History,
    D: DisplayAdapter,
{
    /// returns a new ticker, with an empty window sized by `config`.
    ///
    /// fails if the sampler does not observe exactly as many cores as `config` asks for.
    pub fn new(
        config: &Config,
        sampler: S,
        history: H,
        display: D,
    ) -> Result<Self, CardinalityMismatch> {
        let cores = config.core_count();
        if sampler.cores() != cores {
            return Err(CardinalityMismatch {
                expected: cores,
                actual: sampler.cores(),
            });
        }

        Ok(Self {
            sampler,
            store: SeriesStore::new(config.window_capacity(), cores),
            history,
            display,
            next: 0,
            stats: TickStats::default(),
        })
    }

    /// fires one tick.
    ///
    /// nothing that goes wrong here is fatal. a failed sample skips the tick, but its index is
    /// still used up. history and display failures are logged, and neither affects the other.
    pub fn tick(&mut self) {
        let Self {
            sampler,
            store,
            history,
            display,
            next,
            stats,
        } = self;

        let tick = *next;
        *next += 1;
        stats.fired += 1;

        let values = match sampler.read() {
            Ok(values) => values,
            Err(error) => {
                warn!(tick, %error, "sample unavailable, skipping tick");
                stats.unavailable += 1;
                return;
            }
        };

        if let Err(error) = store.append(tick, &values) {
            error!(tick, %error, "rejected observation");
            stats.rejected += 1;
            return;
        }
        stats.sampled += 1;
        let snapshot = store.snapshot();

        match history.write(Local::now().naive_local(), &values) {
            Ok(()) => stats.persisted += 1,
            Err(error) => {
                error!(tick, %error, "failed to record observation, it is lost");
                stats.persist_failures += 1;
            }
        }

        match display.render(&snapshot) {
            Ok(()) => stats.rendered += 1,
            Err(error) => {
                warn!(tick, %error, "failed to render snapshot");
                stats.render_failures += 1;
            }
        }

        trace!(tick, retained = snapshot.ticks.len(), "tick complete");
    }

    /// the number of ticks fired so far.
    pub fn fired(&self) -> u64 {
        self.stats.fired
    }
}

impl<S, H, D> Ticker<S, H, D> {
    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }
}
