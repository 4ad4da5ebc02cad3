use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::warn;
use weatherbot::core::config::AppConfig;
use weatherbot::worker::{Action, Runner};
use weatherbot::{Verbosity, setup_cli_logging};

/// A Telegram weather bot
#[derive(Debug, Parser)]
#[command(name = "weatherbot", version)]
struct Cli {
    /// Sub-routine to run
    #[arg(value_enum)]
    action: Option<Action>,

    /// Logging/verbosity level
    #[arg(
        short,
        long,
        value_enum,
        value_name = "LEVEL",
        num_args = 0..=1,
        default_value = "warning",
        default_missing_value = "debug"
    )]
    verbose: Verbosity,

    /// Config file (defaults to $WEATHERBOT_CONFIG, then ./config.json)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_cli_logging(cli.verbose);

    let Some(action) = cli.action else {
        warn!("No action specified, exiting");
        return Ok(());
    };

    let path = cli.config.unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&path)
        .with_context(|| format!("cannot start without a valid config ({})", path.display()))?;

    let runner = Runner::from_config(config)?;
    runner.run(action).await?;
    Ok(())
}
