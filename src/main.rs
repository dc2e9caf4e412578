//! a compact per-core cpu monitor.

use {
    self::cli::Args,
    anyhow::{Context, Result},
    clap::Parser,
    crossterm::{
        event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
        terminal,
    },
    std::{io, time::Duration},
    tach::{
        Config, History, HistoryWriter, NullDisplay, RenderWorker, Sampler, Scheduler, Sentinel,
        TerminalDisplay,
    },
    tracing::{error, info},
    tracing_appender::non_blocking::WorkerGuard,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

mod cli;

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(&args)?;
    let config = args.config().context("invalid configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        cores = config.core_count(),
        window = config.window_capacity(),
        interval_ms = config.tick_interval().as_millis(),
        history = %config.history_path().display(),
        "starting tach"
    );

    let sentinel =
        Sentinel::new(config.core_count()).context("failed to start sampling cpu utilization")?;
    let history = HistoryWriter::open(config.history_path()).context("failed to open history")?;

    if args.no_display {
        headless(&config, sentinel, history)
    } else {
        interactive(&config, sentinel, history)
    }
}

/// initializes logging to stderr, or to a file. see [`Args::log_file()`].
///
/// the returned guard flushes buffered logs when dropped.
fn init_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    let registry = tracing_subscriber::registry().with(filter);

    let Some(path) = args.log_file() else {
        registry
            .with(fmt::layer().with_writer(io::stderr))
            .try_init()
            .context("failed to initialize logging")?;
        return Ok(None);
    };

    let dir = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    let name = path.file_name().context("log file must name a file")?;
    let appender = tracing_appender::rolling::never(dir.unwrap_or(".".as_ref()), name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    registry
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("failed to initialize logging")?;

    Ok(Some(guard))
}

/// records history without drawing anything, until the tick limit is reached.
///
/// without a tick limit, this runs until the process is killed. each record is flushed as it is
/// written, so nothing is lost by that.
fn headless<S, H>(config: &Config, sampler: S, history: H) -> Result<()>
where
    S: Sampler + Send + 'static,
    H: History + Send + 'static,
{
    let mut scheduler = Scheduler::new(config, sampler, history, NullDisplay)?;
    scheduler.start()?;
    scheduler.wait()?;

    Ok(())
}

/// draws the rolling window to the terminal until the user quits, or the tick limit is reached.
fn interactive<S, H>(config: &Config, sampler: S, history: H) -> Result<()>
where
    S: Sampler + Send + 'static,
    H: History + Send + 'static,
{
    let display = TerminalDisplay::new(config.plot_height())?;
    let worker = RenderWorker::spawn(display)?;
    let mut scheduler = Scheduler::new(config, sampler, history, worker)?;

    terminal::enable_raw_mode()?;
    let watched = scheduler
        .start()
        .map_err(anyhow::Error::from)
        .and_then(|()| watch(|| scheduler.is_finished()).map_err(anyhow::Error::from));

    // stopping the scheduler drops the render worker, which restores the screen.
    let stopped = scheduler.stop().map(drop);
    if let Err(error) = terminal::disable_raw_mode() {
        error!(%error, "failed to restore the terminal");
    }

    watched?;
    stopped?;
    Ok(())
}

/// waits for the user to quit, or for `finished` to return `true`.
fn watch(finished: impl Fn() -> bool) -> io::Result<()> {
    const POLL: Duration = Duration::from_millis(100);

    while !finished() {
        if !event::poll(POLL)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if quits(&key) {
                info!("quitting");
                break;
            }
        }
    }

    Ok(())
}

fn quits(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
