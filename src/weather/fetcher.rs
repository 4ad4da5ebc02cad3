use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, info, warn};

use super::cache::ResponseCache;
use super::client::{CaiyunClient, WeatherSource};
use super::credentials::{CredentialSelector, selector_for};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::WeatherConfig;
use crate::core::models::WeatherResponse;
use crate::errors::BotError;

/// Cache-validated, retrying weather fetch.
pub struct Fetcher {
    source: Box<dyn WeatherSource>,
    selector: Box<dyn CredentialSelector>,
    clock: Arc<dyn Clock>,
    cache: ResponseCache,
    tokens: Vec<String>,
    retry: u32,
    retry_delay: Duration,
}

impl Fetcher {
    /// Fetcher backed by the real Caiyun client and the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &WeatherConfig) -> Result<Self, BotError> {
        let source = CaiyunClient::new(config)?;
        Ok(Self::new(
            config,
            Box::new(source),
            selector_for(config.credential_strategy),
            Arc::new(SystemClock),
        ))
    }

    #[must_use]
    pub fn new(
        config: &WeatherConfig,
        source: Box<dyn WeatherSource>,
        selector: Box<dyn CredentialSelector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            selector,
            clock,
            cache: ResponseCache::new(config.cache_file.clone(), config.cache_ttl),
            tokens: config.tokens.clone(),
            retry: config.retry,
            retry_delay: config.retry_delay,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Serve a fresh cached response, or fetch, cache and return a new one.
    ///
    /// # Errors
    ///
    /// Returns `FetchExhausted` once every attempt has failed; callers skip
    /// the cycle rather than abort.
    pub async fn fetch(&self) -> Result<WeatherResponse, BotError> {
        if let Some(cached) = self.cache.load_fresh(self.clock.now()) {
            debug!(server_time = cached.server_time, "Serving weather from cache");
            return Ok(cached);
        }

        let response = self.fetch_remote().await?;
        if let Err(e) = self.cache.store(&response) {
            warn!("Fetched weather but could not cache it: {}", e);
        }
        Ok(response)
    }

    async fn fetch_remote(&self) -> Result<WeatherResponse, BotError> {
        if self.retry == 0 || self.tokens.is_empty() {
            return Err(BotError::FetchExhausted {
                attempts: 0,
                last_error: "no attempts configured".to_string(),
            });
        }

        let attempts = AtomicU32::new(0);
        let strategy = FixedInterval::new(self.retry_delay).take((self.retry - 1) as usize);

        let result = Retry::spawn(strategy, || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            self.attempt(attempt)
        })
        .await;

        match result {
            Ok(response) => Ok(response),
            Err(e) => Err(BotError::FetchExhausted {
                attempts: attempts.load(Ordering::SeqCst),
                last_error: e.to_string(),
            }),
        }
    }

    async fn attempt(&self, attempt: u32) -> Result<WeatherResponse, BotError> {
        let index = self
            .selector
            .select(self.tokens.len())
            .min(self.tokens.len() - 1);

        match self.source.request(&self.tokens[index]).await {
            Ok(response) => {
                info!(attempt, credential = index, "Fetched fresh weather data");
                Ok(response)
            }
            Err(e) => {
                warn!(
                    attempt,
                    max_attempts = self.retry,
                    credential = index,
                    "Weather fetch attempt failed: {}",
                    e
                );
                Err(e)
            }
        }
    }
}
