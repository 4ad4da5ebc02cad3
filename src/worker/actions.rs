use std::fmt;
use std::str::FromStr;

use crate::errors::BotError;

/// Sub-routine selected on the command line or in the Lambda event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Action {
    /// Post tomorrow's forecast
    Forecast,
    /// Edit the realtime summary in place
    Realtime,
    /// Send weather alerts not seen before
    Alert,
    /// Edit the two-hour precipitation chart in place
    Precipitation,
    /// Post the hourly temperature chart
    Temperature,
    /// List recent Bot API updates
    Updates,
    /// Run the scheduled batch with per-action failure isolation
    Cron,
}

impl Action {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Forecast => "forecast",
            Action::Realtime => "realtime",
            Action::Alert => "alert",
            Action::Precipitation => "precipitation",
            Action::Temperature => "temperature",
            Action::Updates => "updates",
            Action::Cron => "cron",
        }
    }

    /// Sub-actions of the cron batch, in execution order.
    #[must_use]
    pub fn cron_batch(include_temperature: bool) -> Vec<Action> {
        let mut batch = vec![Action::Realtime, Action::Alert, Action::Precipitation];
        if include_temperature {
            batch.push(Action::Temperature);
        }
        batch
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forecast" => Ok(Action::Forecast),
            "realtime" => Ok(Action::Realtime),
            "alert" => Ok(Action::Alert),
            "precipitation" => Ok(Action::Precipitation),
            "temperature" => Ok(Action::Temperature),
            "updates" => Ok(Action::Updates),
            "cron" => Ok(Action::Cron),
            other => Err(BotError::GeneralError(format!("Unknown action {other:?}"))),
        }
    }
}

/// What a sub-action did when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Published(String),
    Skipped(String),
}

impl ActionOutcome {
    pub fn published(detail: impl Into<String>) -> Self {
        ActionOutcome::Published(detail.into())
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        ActionOutcome::Skipped(reason.into())
    }
}

/// Per-sub-action results of one cron batch.
#[derive(Debug, Default)]
pub struct CronReport {
    pub results: Vec<(Action, Result<ActionOutcome, BotError>)>,
}

impl CronReport {
    #[must_use]
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_err()).count()
    }

    #[must_use]
    pub fn outcome(&self, action: Action) -> Option<&Result<ActionOutcome, BotError>> {
        self.results
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, r)| r)
    }
}
