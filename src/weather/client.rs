//! Caiyun weather API client
//!
//! One GET per attempt; the credential travels in the URL path, so URLs are
//! stripped from errors before they reach the logs.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::core::config::WeatherConfig;
use crate::core::models::{STATUS_OK, WeatherResponse};
use crate::errors::BotError;

/// Remote weather provider, one request per call.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// # Errors
    ///
    /// Network failures, timeouts, non-2xx replies and replies whose
    /// `status` is not `"ok"` are all errors.
    async fn request(&self, token: &str) -> Result<WeatherResponse, BotError>;
}

pub struct CaiyunClient {
    http: Client,
    api_base: String,
    longitude: f64,
    latitude: f64,
}

impl CaiyunClient {
    /// # Errors
    ///
    /// Returns `HttpError` if the HTTP client cannot be built.
    pub fn new(config: &WeatherConfig) -> Result<Self, BotError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            longitude: config.longitude,
            latitude: config.latitude,
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the configured base URL is not a valid URL.
    pub fn endpoint(&self, token: &str) -> Result<Url, BotError> {
        let raw = format!(
            "{}/{}/{},{}/weather.json",
            self.api_base, token, self.longitude, self.latitude
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| BotError::ConfigError(format!("invalid weather API base: {e}")))?;
        url.query_pairs_mut()
            .append_pair("lang", "zh_CN")
            .append_pair("alert", "true");
        Ok(url)
    }
}

#[async_trait]
impl WeatherSource for CaiyunClient {
    async fn request(&self, token: &str) -> Result<WeatherResponse, BotError> {
        let url = self.endpoint(token)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| BotError::from(e.without_url()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| BotError::from(e.without_url()))?;

        let status = body.get("status").and_then(Value::as_str).unwrap_or("missing");
        if status != STATUS_OK {
            return Err(BotError::ApiStatus(status.to_string()));
        }

        let parsed: WeatherResponse = serde_json::from_value(body)
            .map_err(|e| BotError::HttpError(format!("unexpected weather payload: {e}")))?;
        debug!(server_time = parsed.server_time, "Weather API responded");
        Ok(parsed)
    }
}
