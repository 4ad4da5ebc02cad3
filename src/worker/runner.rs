//! Orchestrates one invocation: fetch, render, deliver.

use tracing::{error, info, warn};

use super::actions::{Action, ActionOutcome, CronReport};
use crate::core::config::AppConfig;
use crate::core::models::WeatherResponse;
use crate::errors::BotError;
use crate::notify::{self, chart};
use crate::storage::{ALERT_WATERMARK, WatermarkStore};
use crate::telegram::{Messenger, SendOptions, TelegramClient, ignore_not_modified};
use crate::weather::Fetcher;

/// Hours of hourly temperature drawn on the chart.
const TEMPERATURE_HOURS: usize = 48;
const UPDATES_LIMIT: u8 = 20;

pub struct Runner {
    config: AppConfig,
    fetcher: Fetcher,
    messenger: Box<dyn Messenger>,
}

impl Runner {
    /// Runner wired to the real weather API and Telegram.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be built.
    pub fn from_config(config: AppConfig) -> Result<Self, BotError> {
        let fetcher = Fetcher::from_config(&config.caiyun)?;
        let messenger = TelegramClient::new(&config.telegram)?;
        Ok(Self::new(config, fetcher, Box::new(messenger)))
    }

    #[must_use]
    pub fn new(config: AppConfig, fetcher: Fetcher, messenger: Box<dyn Messenger>) -> Self {
        Self {
            config,
            fetcher,
            messenger,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run `action`. The cron batch never fails as a whole; its sub-action
    /// errors are logged and reported individually.
    ///
    /// # Errors
    ///
    /// Returns the error of a failed single action.
    pub async fn run(&self, action: Action) -> Result<(), BotError> {
        info!("Action: {}", action);
        if action == Action::Cron {
            let report = self.run_cron().await;
            info!(
                sub_actions = report.results.len(),
                failures = report.failures(),
                "Cron batch finished"
            );
            return Ok(());
        }

        let outcome = self.run_action(action).await?;
        log_outcome(action, &outcome);
        Ok(())
    }

    pub async fn run_cron(&self) -> CronReport {
        let mut report = CronReport::default();
        for action in Action::cron_batch(self.config.telegram.features.cron_temperature) {
            let result = self.run_step(action).await;
            match &result {
                Ok(outcome) => log_outcome(action, outcome),
                Err(e) => error!("Cron sub-action {} failed: {}", action, e),
            }
            report.results.push((action, result));
        }
        report
    }

    /// # Errors
    ///
    /// Returns configuration, rendering, storage or delivery errors.
    pub async fn run_action(&self, action: Action) -> Result<ActionOutcome, BotError> {
        if action == Action::Cron {
            let report = self.run_cron().await;
            return Ok(ActionOutcome::published(format!(
                "cron batch: {} failure(s)",
                report.failures()
            )));
        }
        self.run_step(action).await
    }

    async fn run_step(&self, action: Action) -> Result<ActionOutcome, BotError> {
        match action {
            Action::Forecast => self.send_forecast().await,
            Action::Realtime => self.update_realtime().await,
            Action::Alert => self.update_alert().await,
            Action::Precipitation => self.update_precipitation().await,
            Action::Temperature => self.send_temperature().await,
            Action::Updates => self.list_updates().await,
            Action::Cron => Ok(ActionOutcome::skipped("nested cron batch ignored")),
        }
    }

    /// Weather data for this cycle, or `None` when the fetch gave up.
    async fn weather(&self) -> Result<Option<WeatherResponse>, BotError> {
        match self.fetcher.fetch().await {
            Ok(data) => Ok(Some(data)),
            Err(e @ BotError::FetchExhausted { .. }) => {
                warn!("No weather data this cycle: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn precipitation_link(&self) -> Option<String> {
        let telegram = &self.config.telegram;
        if !telegram.features.realtime_precipitation_link {
            return None;
        }
        let channel = telegram.channel_name.as_deref()?.trim_start_matches('@');
        let message_id = telegram.precipitation_id?;
        Some(format!("https://t.me/{channel}/{message_id}"))
    }

    async fn update_realtime(&self) -> Result<ActionOutcome, BotError> {
        let Some(data) = self.weather().await? else {
            return Ok(no_data());
        };
        let Some(realtime) = data.realtime().filter(|r| r.is_ok()) else {
            return Ok(ActionOutcome::skipped("realtime section unavailable"));
        };
        let message_id = self
            .config
            .telegram
            .realtime_id
            .ok_or_else(|| BotError::ConfigError("telegram.realtime_id is not set".to_string()))?;

        let link = self.precipitation_link();
        let text = notify::render_summary(
            &realtime,
            data.server_time,
            self.config.timezone,
            link.as_deref(),
        );
        ignore_not_modified(
            self.messenger
                .edit_message_text(&self.config.telegram.target, message_id, &text)
                .await,
        )?;
        Ok(ActionOutcome::published("realtime summary updated"))
    }

    async fn update_precipitation(&self) -> Result<ActionOutcome, BotError> {
        let Some(data) = self.weather().await? else {
            return Ok(no_data());
        };
        let Some(minutely) = data.minutely().filter(|m| m.is_ok()) else {
            return Ok(ActionOutcome::skipped("minutely section unavailable"));
        };
        let message_id = self.config.telegram.precipitation_id.ok_or_else(|| {
            BotError::ConfigError("telegram.precipitation_id is not set".to_string())
        })?;

        let photo = chart::precipitation_chart(&minutely.precipitation_2h)?;
        let caption = notify::render_precipitation_caption(
            data.forecast_keypoint(),
            data.server_time,
            self.config.timezone,
        );
        ignore_not_modified(
            self.messenger
                .edit_message_photo(&self.config.telegram.target, message_id, photo, &caption)
                .await,
        )?;
        Ok(ActionOutcome::published("precipitation chart updated"))
    }

    async fn update_alert(&self) -> Result<ActionOutcome, BotError> {
        let Some(data) = self.weather().await? else {
            return Ok(no_data());
        };
        let Some(alerts) = data.alert().filter(|a| a.is_ok()) else {
            return Ok(ActionOutcome::skipped("alert section unavailable"));
        };

        let mut store = WatermarkStore::load(&self.config.data_file)?;
        let report = notify::deliver_alerts(
            self.messenger.as_ref(),
            &self.config.telegram.target,
            &alerts.content,
            &mut store,
            ALERT_WATERMARK,
            self.config.timezone,
        )
        .await?;

        if let Some((publish_timestamp, e)) = report.failure {
            warn!(
                sent = report.sent,
                watermark = report.watermark,
                "Alert delivery stopped at {}", publish_timestamp
            );
            return Err(e);
        }
        if report.sent == 0 {
            return Ok(ActionOutcome::skipped("no new alerts"));
        }
        Ok(ActionOutcome::published(format!(
            "{} alert(s) sent, watermark {}",
            report.sent, report.watermark
        )))
    }

    async fn send_forecast(&self) -> Result<ActionOutcome, BotError> {
        let Some(data) = self.weather().await? else {
            return Ok(no_data());
        };
        let Some(tomorrow) = data.daily(1).filter(|d| d.is_ok()) else {
            return Ok(ActionOutcome::skipped("daily section unavailable"));
        };

        let text = notify::render_forecast(&tomorrow);
        let options = SendOptions {
            disable_notification: self.config.telegram.features.silent_forecast,
        };
        let message_id = self
            .messenger
            .send_message(&self.config.telegram.target, &text, &options)
            .await?;
        Ok(ActionOutcome::published(format!(
            "forecast posted as message {message_id}"
        )))
    }

    async fn send_temperature(&self) -> Result<ActionOutcome, BotError> {
        let Some(data) = self.weather().await? else {
            return Ok(no_data());
        };
        let Some(hourly) = data.hourly().filter(|h| h.is_ok()) else {
            return Ok(ActionOutcome::skipped("hourly section unavailable"));
        };

        let series: Vec<f64> = hourly
            .temperature
            .iter()
            .take(TEMPERATURE_HOURS)
            .map(|point| point.value)
            .collect();
        let photo = chart::temperature_chart(&series)?;
        let caption =
            notify::render_temperature_caption(&hourly, data.server_time, self.config.timezone);
        let message_id = self
            .messenger
            .send_photo(&self.config.telegram.target, photo, &caption)
            .await?;
        Ok(ActionOutcome::published(format!(
            "temperature chart posted as message {message_id}"
        )))
    }

    async fn list_updates(&self) -> Result<ActionOutcome, BotError> {
        let updates = self.messenger.get_updates(None, UPDATES_LIMIT).await?;
        for update in &updates {
            info!("Update: {}", update);
        }
        Ok(ActionOutcome::published(format!(
            "{} update(s) listed",
            updates.len()
        )))
    }
}

fn no_data() -> ActionOutcome {
    ActionOutcome::skipped("no weather data this cycle")
}

fn log_outcome(action: Action, outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Published(detail) => info!("{}: {}", action, detail),
        ActionOutcome::Skipped(reason) => info!("{} skipped: {}", action, reason),
    }
}
