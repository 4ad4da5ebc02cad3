use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::BotError;

pub const CONFIG_PATH_ENV: &str = "WEATHERBOT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
const DEFAULT_DATA_FILE: &str = "data.json";
const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";
const DEFAULT_CAIYUN_API_BASE: &str = "https://api.caiyunapp.com/v2.6";
const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// How the fetcher picks a credential for each attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStrategy {
    #[default]
    Random,
    RoundRobin,
    Fixed,
}

/// Chat identifier accepted by the Bot API: a numeric id or an `@username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatTarget {
    Id(i64),
    Username(String),
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatTarget::Id(id) => write!(f, "{id}"),
            ChatTarget::Username(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Send the daily forecast without a notification sound.
    pub silent_forecast: bool,
    /// Include the hourly temperature chart in the cron batch.
    pub cron_temperature: bool,
    /// Link the realtime summary to the precipitation message.
    pub realtime_precipitation_link: bool,
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub tokens: Vec<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub timeout: Duration,
    pub retry: u32,
    pub retry_delay: Duration,
    pub cache_file: PathBuf,
    /// Cache time-to-live in seconds.
    pub cache_ttl: i64,
    pub credential_strategy: CredentialStrategy,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub target: ChatTarget,
    pub realtime_id: Option<i64>,
    pub precipitation_id: Option<i64>,
    pub channel_name: Option<String>,
    pub api_base: String,
    pub features: FeatureFlags,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub caiyun: WeatherConfig,
    pub telegram: TelegramConfig,
    /// Watermark store location.
    pub data_file: PathBuf,
    pub timezone: Tz,
}

#[derive(Deserialize)]
struct RawConfig {
    caiyun: RawCaiyun,
    telegram: RawTelegram,
    data_file: Option<String>,
    timezone: Option<String>,
}

#[derive(Deserialize)]
struct RawCaiyun {
    token: Option<String>,
    tokens: Option<Vec<String>>,
    longitude: f64,
    latitude: f64,
    timeout: f64,
    retry: u32,
    cache_file: String,
    cache_ttl: u64,
    retry_delay_ms: Option<u64>,
    #[serde(default)]
    credential_strategy: CredentialStrategy,
    api_base: Option<String>,
}

#[derive(Deserialize)]
struct RawTelegram {
    token: String,
    target: ChatTarget,
    realtime_id: Option<i64>,
    precipitation_id: Option<i64>,
    channel_name: Option<String>,
    api_base: Option<String>,
    #[serde(default)]
    features: FeatureFlags,
}

impl AppConfig {
    /// Path from `WEATHERBOT_CONFIG`, falling back to `config.json`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load and validate a config file. Relative paths inside it resolve
    /// against the file's own directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, malformed or invalid.
    pub fn load(path: &Path) -> Result<Self, BotError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| BotError::ConfigError(format!("{}: {e}", path.display())))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json(&text, base_dir)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the JSON is malformed or fails validation.
    pub fn from_json(text: &str, base_dir: &Path) -> Result<Self, BotError> {
        let raw: RawConfig = serde_json::from_str(text)
            .map_err(|e| BotError::ConfigError(format!("invalid config JSON: {e}")))?;

        let tokens = match (raw.caiyun.tokens, raw.caiyun.token) {
            (Some(tokens), _) if !tokens.is_empty() => tokens,
            (_, Some(token)) => vec![token],
            _ => {
                return Err(BotError::ConfigError(
                    "caiyun: either `token` or a non-empty `tokens` list is required".to_string(),
                ));
            }
        };

        let timeout = Duration::try_from_secs_f64(raw.caiyun.timeout)
            .ok()
            .filter(|t| !t.is_zero())
            .ok_or_else(|| {
                BotError::ConfigError(format!(
                    "caiyun.timeout must be a positive number of seconds, got {}",
                    raw.caiyun.timeout
                ))
            })?;

        let cache_ttl = i64::try_from(raw.caiyun.cache_ttl)
            .map_err(|_| BotError::ConfigError("caiyun.cache_ttl is too large".to_string()))?;

        let timezone_name = raw.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE);
        let timezone: Tz = timezone_name
            .parse()
            .map_err(|e| BotError::ConfigError(format!("timezone {timezone_name:?}: {e}")))?;

        Ok(Self {
            caiyun: WeatherConfig {
                tokens,
                longitude: raw.caiyun.longitude,
                latitude: raw.caiyun.latitude,
                timeout,
                retry: raw.caiyun.retry,
                retry_delay: Duration::from_millis(
                    raw.caiyun.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS),
                ),
                cache_file: resolve(base_dir, &raw.caiyun.cache_file),
                cache_ttl,
                credential_strategy: raw.caiyun.credential_strategy,
                api_base: raw
                    .caiyun
                    .api_base
                    .unwrap_or_else(|| DEFAULT_CAIYUN_API_BASE.to_string()),
            },
            telegram: TelegramConfig {
                token: raw.telegram.token,
                target: raw.telegram.target,
                realtime_id: raw.telegram.realtime_id,
                precipitation_id: raw.telegram.precipitation_id,
                channel_name: raw.telegram.channel_name,
                api_base: raw
                    .telegram
                    .api_base
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
                features: raw.telegram.features,
            },
            data_file: resolve(base_dir, raw.data_file.as_deref().unwrap_or(DEFAULT_DATA_FILE)),
            timezone,
        })
    }
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
