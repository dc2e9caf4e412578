//! command-line arguments.

use {
    clap::Parser,
    std::{path::PathBuf, time::Duration},
    tach::{Config, ConfigError},
};

/// a compact per-core cpu monitor.
///
/// samples the utilization of each core, draws a rolling window of recent samples, and appends
/// every sample to a history file.
#[derive(Debug, Parser)]
#[command(name = "tach", version, about)]
pub struct Args {
    /// number of cpu cores to monitor.
    #[arg(long, default_value_t = num_cpus::get())]
    pub cores: usize,

    /// width of the plot; one tick of history is kept per unit of width.
    #[arg(long, default_value_t = 10.0)]
    pub width: f64,

    /// cap the plot at this many core rows. by default, every core that fits is drawn.
    #[arg(long)]
    pub height: Option<f64>,

    /// refresh interval, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub refresh: u64,

    /// file that every sample is appended to.
    #[arg(long, default_value = "cpu_history.txt")]
    pub history: PathBuf,

    /// stop after this many ticks.
    #[arg(long)]
    pub ticks: Option<u64>,

    /// do not draw anything; only record history.
    #[arg(long)]
    pub no_display: bool,

    /// log filter (trace, debug, info, warn, error), overridden by `RUST_LOG`.
    #[arg(long, default_value = "info", env = "TACH_LOG")]
    pub log_level: String,

    /// write logs to this file. defaults to `tach.log` while the terminal display is drawing, and
    /// to stderr with `--no-display`.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// where logs go while the terminal display is drawing, unless `--log-file` says otherwise.
    const LOG_FILE: &str = "tach.log";

    /// the file to write logs to, or `None` for stderr.
    ///
    /// the terminal display owns the screen, so logs written to stderr would be drawn over.
    pub fn log_file(&self) -> Option<PathBuf> {
        let Self {
            log_file,
            no_display,
            ..
        } = self;

        match log_file {
            Some(path) => Some(path.clone()),
            None if *no_display => None,
            None => Some(PathBuf::from(Self::LOG_FILE)),
        }
    }

    /// validates the arguments, producing the monitor's configuration.
    pub fn config(&self) -> Result<Config, ConfigError> {
        let Self {
            cores,
            width,
            height,
            refresh,
            history,
            ticks,
            ..
        } = self;

        let window = Config::window_from_width(*width)?;
        let height = height.map(|height| {
            if height.is_finite() && height >= 1.0 {
                height.round() as usize
            } else {
                0
            }
        });

        Ok(Config::new(window, Duration::from_millis(*refresh), *cores, history)?
            .with_plot_height(height)?
            .with_tick_limit(*ticks))
    }
}
