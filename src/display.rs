//! consumers of the rolling window.
//!
//! a [`DisplayAdapter`] redraws from a [`Snapshot`] once per tick. adapters are free to fail; the
//! scheduler logs their errors and moves on. slow adapters should be wrapped in a
//! [`RenderWorker`], so that drawing happens off the scheduler's thread.

use {
    crate::series::Snapshot,
    crossbeam_channel::{Sender, TrySendError},
    std::{
        collections::BTreeSet,
        io,
        sync::{Arc, Mutex},
        thread::{self, JoinHandle},
        time::Duration,
    },
    thiserror::Error,
    tracing::{debug, error, trace, warn},
};

pub use self::terminal::TerminalDisplay;

mod meter;
mod terminal;

#[cfg(test)]
mod tests;

/// draws a view of the rolling window.
pub trait DisplayAdapter {
    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError>;
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("the render worker has shut down")]
    WorkerGone,
    #[error("{0}")]
    Other(String),
}

/// a display that draws nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDisplay;

/// runs a [`DisplayAdapter`] on its own thread.
///
/// snapshots are handed over through a single-slot mailbox. if the adapter is still busy drawing
/// the previous frame when a new one arrives, the new one is dropped; the next tick brings a
/// fresher one anyway.
///
/// dropping the worker waits for the adapter to draw any frame still in the mailbox, and then
/// drops the adapter on the worker's thread.
pub struct RenderWorker {
    mailbox: Option<Sender<Snapshot>>,
    worker: Option<JoinHandle<()>>,
    /// how many frames were dropped because the adapter was busy.
    dropped: u64,
}

/// a mock display, which remembers every frame it was asked to draw.
///
/// clones share their frames, so a clone kept by a test can observe a display that was moved
/// onto another thread.
#[derive(Clone, Debug, Default)]
#[allow(dead_code, reason = "this is a testing utility.")]
pub struct MockDisplay {
    frames: Arc<Mutex<Vec<Snapshot>>>,
    /// zero-based indices of the renders that should fail.
    failures: BTreeSet<usize>,
    /// how long each render takes.
    delay: Duration,
    renders: usize,
}

// === impl NullDisplay ===

impl DisplayAdapter for NullDisplay {
    fn render(&mut self, _: &Snapshot) -> Result<(), RenderError> {
        Ok(())
    }
}

// === impl RenderWorker ===

impl RenderWorker {
    /// moves `display` onto a new thread.
    pub fn spawn<D>(mut display: D) -> io::Result<Self>
    where
        D: DisplayAdapter + Send + 'static,
    {
        let (mailbox, frames) = crossbeam_channel::bounded::<Snapshot>(1);
        let worker = thread::Builder::new()
            .name("tach-render".to_owned())
            .spawn(move || {
                for snapshot in frames {
                    if let Err(error) = display.render(&snapshot) {
                        warn!(%error, "failed to render snapshot");
                    }
                }
                debug!("render worker is shutting down");
            })?;

        Ok(Self {
            mailbox: Some(mailbox),
            worker: Some(worker),
            dropped: 0,
        })
    }

    /// how many frames were dropped because the adapter was busy.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl DisplayAdapter for RenderWorker {
    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError> {
        let Self {
            mailbox, dropped, ..
        } = self;
        let mailbox = mailbox.as_ref().ok_or(RenderError::WorkerGone)?;

        match mailbox.try_send(snapshot.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                *dropped += 1;
                trace!(dropped = *dropped, "display is busy, dropping frame");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(RenderError::WorkerGone),
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        let Self {
            mailbox, worker, ..
        } = self;

        // closing the mailbox ends the worker's loop.
        drop(mailbox.take());
        if let Some(worker) = worker.take() {
            if worker.join().is_err() {
                error!("render worker panicked");
            }
        }
    }
}

// === impl MockDisplay ===

impl MockDisplay {
    /// makes the `n`th render (counting from zero) fail.
    #[allow(dead_code, reason = "this is a testing utility.")]
    pub fn fail_on(mut self, n: usize) -> Self {
        self.failures.insert(n);
        self
    }

    /// makes every render take at least `delay`.
    #[allow(dead_code, reason = "this is a testing utility.")]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// the frames drawn so far, by this display or any of its clones.
    #[allow(dead_code, reason = "this is a testing utility.")]
    pub fn frames(&self) -> Vec<Snapshot> {
        self.frames
            .lock()
            .map(|frames| frames.clone())
            .unwrap_or_default()
    }
}

impl DisplayAdapter for MockDisplay {
    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError> {
        let Self {
            frames,
            failures,
            delay,
            renders,
        } = self;

        let n = *renders;
        *renders += 1;
        if !delay.is_zero() {
            thread::sleep(*delay);
        }
        if failures.contains(&n) {
            return Err(RenderError::Other(format!("mock render {n} failed")));
        }

        frames
            .lock()
            .map_err(|_| RenderError::Other("mock frames are poisoned".to_owned()))?
            .push(snapshot.clone());
        Ok(())
    }
}
