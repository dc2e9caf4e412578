//! the fixed-cadence tick loop.

use {
    crate::{
        config::Config,
        display::DisplayAdapter,
        history::History,
        sampler::Sampler,
        series::CardinalityMismatch,
        source::{Clock, SystemClock},
    },
    crossbeam_channel::{Receiver, RecvTimeoutError, Sender},
    std::{
        io,
        thread::{self, JoinHandle},
        time::Duration,
    },
    thiserror::Error,
    tracing::{debug, error, info},
};

pub use self::ticker::{TickStats, Ticker};

mod ticker;


/// fires ticks at a fixed interval, on a thread of its own.
///
/// a scheduler starts out idle. [`Scheduler::start()`] begins ticking, and [`Scheduler::stop()`]
/// ends it for good. dropping a running scheduler stops it too.
///
/// ticks are never dropped. each tick is due one interval after the previous one fired; a tick
/// that is already overdue when the previous one finishes fires straight away, so a handler that
/// keeps overrunning the interval sees its ticks back-to-back. no attempt is made to catch up on
/// the lost time.
pub struct Scheduler<S, H, D, C = SystemClock> {
    state: State<S, H, D, C>,
}

enum State<S, H, D, C> {
    Idle {
        ticker: Ticker<S, H, D>,
        cadence: Cadence<C>,
    },
    Running {
        /// dropped to ask the tick thread to stop.
        stop: Sender<()>,
        worker: JoinHandle<Ticker<S, H, D>>,
    },
    Stopped,
}

/// when ticks fire.
struct Cadence<C> {
    clock: C,
    interval: Duration,
    limit: Option<u64>,
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("the scheduler is already running")]
    AlreadyRunning,
    #[error("the scheduler has not been started")]
    NotRunning,
    #[error("the scheduler has stopped, and cannot be restarted")]
    Stopped,
    #[error("failed to spawn the tick thread: {0}")]
    Spawn(#[source] io::Error),
    #[error("the tick thread panicked")]
    Panicked,
}

// === impl Scheduler ===

impl<S, H, D> Scheduler<S, H, D>
where
    S: Sampler + Send + 'static,
    H: History + Send + 'static,
    D: DisplayAdapter + Send + 'static,
{
    /// returns an idle scheduler.
    ///
    /// fails if the sampler does not observe exactly as many cores as `config` asks for.
    pub fn new(
        config: &Config,
        sampler: S,
        history: H,
        display: D,
    ) -> Result<Self, CardinalityMismatch> {
        Self::with_clock(config, sampler, history, display, SystemClock)
    }
}

impl<S, H, D, C> Scheduler<S, H, D, C>
where
    S: Sampler + Send + 'static,
    H: History + Send + 'static,
    D: DisplayAdapter + Send + 'static,
    C: Clock + Send + 'static,
{
    /// returns an idle scheduler, measuring its cadence with `clock`.
    pub fn with_clock(
        config: &Config,
        sampler: S,
        history: H,
        display: D,
        clock: C,
    ) -> Result<Self, CardinalityMismatch> {
        let ticker = Ticker::new(config, sampler, history, display)?;
        let cadence = Cadence {
            clock,
            interval: config.tick_interval(),
            limit: config.tick_limit(),
        };

        Ok(Self {
            state: State::Idle { ticker, cadence },
        })
    }

    /// begins firing ticks.
    ///
    /// the first tick fires immediately. if the tick thread cannot be spawned, the scheduler is
    /// left stopped.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        let Self { state } = self;

        match std::mem::replace(state, State::Stopped) {
            State::Idle { ticker, cadence } => {
                let (stop, stopped) = crossbeam_channel::bounded::<()>(0);
                let interval = cadence.interval;
                let worker = thread::Builder::new()
                    .name("tach-scheduler".to_owned())
                    .spawn(move || cadence.run(ticker, stopped))
                    .map_err(SchedulerError::Spawn)?;

                info!(interval_ms = interval.as_millis(), "scheduler started");
                *state = State::Running { stop, worker };
                Ok(())
            }
            running @ State::Running { .. } => {
                *state = running;
                Err(SchedulerError::AlreadyRunning)
            }
            State::Stopped => Err(SchedulerError::Stopped),
        }
    }

    /// stops firing ticks, and returns the [`Ticker`].
    ///
    /// a tick that is in flight is allowed to finish. once this returns, the window will not change
    /// and nothing more is written to the history.
    pub fn stop(&mut self) -> Result<Ticker<S, H, D>, SchedulerError> {
        self.finish(true)
    }

    /// waits for a scheduler with a tick limit to stop by itself, and returns the [`Ticker`].
    ///
    /// NB: without a tick limit, this blocks forever.
    pub fn wait(&mut self) -> Result<Ticker<S, H, D>, SchedulerError> {
        self.finish(false)
    }

    /// returns `true` once the tick thread has exited.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            State::Idle { .. } => false,
            State::Running { worker, .. } => worker.is_finished(),
            State::Stopped => true,
        }
    }

    fn finish(&mut self, signal: bool) -> Result<Ticker<S, H, D>, SchedulerError> {
        let Self { state } = self;

        match std::mem::replace(state, State::Stopped) {
            State::Running { stop, worker } => {
                if signal {
                    drop(stop);
                    worker.join().map_err(|_| SchedulerError::Panicked)
                } else {
                    let ticker = worker.join().map_err(|_| SchedulerError::Panicked);
                    drop(stop);
                    ticker
                }
            }
            idle @ State::Idle { .. } => {
                *state = idle;
                Err(SchedulerError::NotRunning)
            }
            State::Stopped => Err(SchedulerError::Stopped),
        }
    }
}

impl<S, H, D, C> Drop for Scheduler<S, H, D, C> {
    /// a running scheduler is stopped, so that its tick thread never outlives it.
    fn drop(&mut self) {
        let Self { state } = self;

        if let State::Running { stop, worker } = std::mem::replace(state, State::Stopped) {
            drop(stop);
            if worker.join().is_err() {
                error!("the tick thread panicked");
            }
        }
    }
}

// === impl Cadence ===

impl<C: Clock> Cadence<C> {
    /// fires ticks until asked to stop, or until the tick limit is reached.
    fn run<S, H, D>(self, mut ticker: Ticker<S, H, D>, stopped: Receiver<()>) -> Ticker<S, H, D>
    where
        S: Sampler,
        H: History,
        D: DisplayAdapter,
    {
        let Self {
            clock,
            interval,
            limit,
        } = self;

        let mut due = clock.now();
        loop {
            if limit.is_some_and(|limit| ticker.fired() >= limit) {
                info!(limit, "tick limit reached");
                break;
            }

            // sleep until the next tick is due, waking early if asked to stop.
            let wait = due.saturating_duration_since(clock.now());
            match stopped.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    debug!("scheduler asked to stop");
                    break;
                }
            }

            let fired = clock.now();
            ticker.tick();
            due = fired + interval;
        }

        let TickStats {
            fired,
            sampled,
            unavailable,
            rejected,
            persisted,
            persist_failures,
            rendered,
            render_failures,
        } = ticker.stats();
        info!(
            fired,
            sampled,
            unavailable,
            rejected,
            persisted,
            persist_failures,
            rendered,
            render_failures,
            "scheduler stopped"
        );

        ticker
    }
}
