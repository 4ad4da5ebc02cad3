/// Weatherbot - a scheduled Telegram bot that republishes Caiyun weather data.
///
/// Each invocation is a single, sequential batch triggered externally (cron
/// or an AWS Lambda schedule):
/// 1. The fetcher serves weather data from a fresh on-disk cache, or calls the
///    provider with bounded retries and refreshes the cache
/// 2. The notifier renders summaries, charts and alerts and hands them to the
///    messaging client; alerts are deduplicated with a persisted watermark
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use weatherbot::core::config::AppConfig;
/// use weatherbot::worker::{Action, Runner};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     weatherbot::setup_cli_logging(weatherbot::Verbosity::Info);
///
///     let config = AppConfig::load(Path::new("config.json"))?;
///     let runner = Runner::from_config(config)?;
///     runner.run(Action::Cron).await?;
///     Ok(())
/// }
/// ```
pub mod core;
pub mod errors;
pub mod notify;
pub mod storage;
pub mod telegram;
pub mod utils;
pub mod weather;
pub mod worker;

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{Registry, reload};

pub use errors::BotError;

/// Log verbosity accepted on the command line and in Lambda events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Verbosity {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
    Critical,
}

impl Verbosity {
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Verbosity::Debug => Level::DEBUG,
            Verbosity::Info => Level::INFO,
            Verbosity::Warning => Level::WARN,
            Verbosity::Error | Verbosity::Critical => Level::ERROR,
        }
    }
}

impl FromStr for Verbosity {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Verbosity::Debug),
            "info" => Ok(Verbosity::Info),
            "warning" | "warn" => Ok(Verbosity::Warning),
            "error" => Ok(Verbosity::Error),
            "critical" => Ok(Verbosity::Critical),
            other => Err(BotError::GeneralError(format!(
                "Unknown verbosity level {other:?}"
            ))),
        }
    }
}

/// Handle for changing the log level after [`setup_logging`].
pub struct LogHandle {
    inner: reload::Handle<LevelFilter, Registry>,
}

impl LogHandle {
    pub fn set_level(&self, verbosity: Verbosity) {
        let filter = LevelFilter::from_level(verbosity.level());
        if let Err(e) = self.inner.modify(|current| *current = filter) {
            tracing::warn!("Could not change log level: {}", e);
        }
    }
}

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// The level can be changed per invocation through the returned handle.
/// Calling this more than once keeps the first subscriber.
///
/// # Example
///
/// ```
/// let handle = weatherbot::setup_logging(weatherbot::Verbosity::Info);
/// handle.set_level(weatherbot::Verbosity::Debug);
/// ```
pub fn setup_logging(verbosity: Verbosity) -> LogHandle {
    use tracing_subscriber::prelude::*;
    let (filter, inner) = reload::Layer::new(LevelFilter::from_level(verbosity.level()));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
    LogHandle { inner }
}

/// Human-readable logging to stderr for command-line runs.
pub fn setup_cli_logging(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(verbosity.level())
        .with_writer(std::io::stderr)
        .try_init();
}
