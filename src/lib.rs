//! a compact per-core cpu monitor.
//!
//! tach samples the utilization of each cpu core at a fixed interval, keeps a rolling window of
//! the most recent observations, draws that window, and appends every observation to a history
//! file.
//!
//! the pieces fit together like so:
//!
//! * a [`Sampler`] produces one observation per tick. [`Sentinel`] is the sampler backed by
//!   `/proc/stat`.
//! * a [`SeriesStore`] keeps the rolling window, evicting the oldest tick once it is full.
//! * a [`History`] records each observation. [`HistoryWriter`] appends them to a file.
//! * a [`DisplayAdapter`] draws a [`Snapshot`] of the window. [`RenderWorker`] moves a display
//!   onto its own thread, so that slow drawing never delays a tick.
//! * a [`Scheduler`] drives all of the above, once per tick, on a thread of its own.

pub use self::{
    config::{Config, ConfigError},
    display::{DisplayAdapter, NullDisplay, RenderError, RenderWorker, TerminalDisplay},
    history::{History, HistoryRecord, HistoryWriter, PersistenceError, RecordParseError},
    sampler::{SampleUnavailable, Sampler},
    scheduler::{Scheduler, SchedulerError, TickStats, Ticker},
    sentinel::{Sentinel, SentinelError},
    series::{CardinalityMismatch, SeriesStore, Snapshot},
};

pub mod config;
pub mod display;
pub mod history;
pub mod sampler;
pub mod scheduler;
pub mod sentinel;
pub mod series;
pub mod source;

/// kernel statistics facilities.
///
/// this file provides tools to interact with `/proc/stat`.
pub mod stat;
