use thiserror::Error;

/// Telegram's description for an edit whose content equals the current one.
const NOT_MODIFIED_MARKER: &str = "message is not modified";

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Weather API reported status {0:?}")]
    ApiStatus(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Telegram API error {code}: {description}")]
    TelegramError { code: i64, description: String },

    #[error("Failed to render: {0}")]
    RenderError(String),

    #[error("Weather fetch failed after {attempts} attempt(s): {last_error}")]
    FetchExhausted { attempts: u32, last_error: String },

    #[error("{0}")]
    GeneralError(String),
}

impl BotError {
    /// True for the Bot API's "message is not modified" reply, which callers
    /// treat as a successful no-op.
    #[must_use]
    pub fn is_not_modified(&self) -> bool {
        matches!(
            self,
            BotError::TelegramError { description, .. } if description.contains(NOT_MODIFIED_MARKER)
        )
    }
}

impl From<reqwest::Error> for BotError {
    fn from(error: reqwest::Error) -> Self {
        BotError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(error: serde_json::Error) -> Self {
        BotError::GeneralError(format!("JSON error: {error}"))
    }
}

impl From<std::io::Error> for BotError {
    fn from(error: std::io::Error) -> Self {
        BotError::StorageError(error.to_string())
    }
}
