//! monitor configuration.

use {
    std::{
        path::{Path, PathBuf},
        time::Duration,
    },
    thiserror::Error,
};

/// how the monitor samples, retains, and records utilization.
///
/// a configuration is validated when it is built, and does not change afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// the number of ticks kept in the rolling window.
    window_capacity: usize,
    /// the time between two ticks.
    tick_interval: Duration,
    /// the number of cores being monitored.
    core_count: usize,
    /// where observations are recorded.
    history_path: PathBuf,
    /// how many core rows the display may use, if capped. the monitor itself ignores this.
    plot_height: Option<usize>,
    /// stop after this many ticks, if set.
    tick_limit: Option<u64>,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("plot width must be a number of at least 1, got {0}")]
    PlotWidth(f64),
    #[error("the rolling window must hold at least one tick")]
    WindowCapacity,
    #[error("the tick interval must be at least 1ms")]
    TickInterval,
    #[error("at least one core must be monitored")]
    CoreCount,
    #[error("plot height must be at least 1")]
    PlotHeight,
}

// === impl Config ===

impl Config {
    pub fn new(
        window_capacity: usize,
        tick_interval: Duration,
        core_count: usize,
        history_path: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if window_capacity == 0 {
            return Err(ConfigError::WindowCapacity);
        }
        if tick_interval < Duration::from_millis(1) {
            return Err(ConfigError::TickInterval);
        }
        if core_count == 0 {
            return Err(ConfigError::CoreCount);
        }

        Ok(Self {
            window_capacity,
            tick_interval,
            core_count,
            history_path: history_path.into(),
            plot_height: None,
            tick_limit: None,
        })
    }

    /// derives the window capacity from a plot width, one tick per unit of width.
    ///
    /// fractional widths are truncated toward zero.
    pub fn window_from_width(width: f64) -> Result<usize, ConfigError> {
        if !width.is_finite() || width < 1.0 {
            return Err(ConfigError::PlotWidth(width));
        }

        Ok(width.trunc() as usize)
    }

    /// caps the number of core rows drawn. without a cap, the display uses every row it has.
    pub fn with_plot_height(self, plot_height: Option<usize>) -> Result<Self, ConfigError> {
        if plot_height == Some(0) {
            return Err(ConfigError::PlotHeight);
        }

        Ok(Self {
            plot_height,
            ..self
        })
    }

    pub fn with_tick_limit(self, tick_limit: Option<u64>) -> Self {
        Self { tick_limit, ..self }
    }

    pub fn window_capacity(&self) -> usize {
        self.window_capacity
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn core_count(&self) -> usize {
        self.core_count
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    pub fn plot_height(&self) -> Option<usize> {
        self.plot_height
    }

    pub fn tick_limit(&self) -> Option<u64> {
        self.tick_limit
    }
}
