use std::error::Error;
use weatherbot::errors::BotError;

#[test]
fn test_bot_error_implements_error_trait() {
    fn assert_error<T: Error + Send + Sync + 'static>(_: &T) {}

    let error = BotError::CacheError("test error".to_string());
    assert_error(&error);
}

#[test]
fn test_bot_error_display() {
    let error = BotError::HttpError("Connection error".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to send HTTP request: Connection error"
    );

    let error = BotError::TelegramError {
        code: 400,
        description: "Bad Request: chat not found".to_string(),
    };
    assert_eq!(
        format!("{error}"),
        "Telegram API error 400: Bad Request: chat not found"
    );

    let error = BotError::FetchExhausted {
        attempts: 3,
        last_error: "timed out".to_string(),
    };
    assert_eq!(
        format!("{error}"),
        "Weather fetch failed after 3 attempt(s): timed out"
    );

    let error = BotError::ApiStatus("failed".to_string());
    assert_eq!(format!("{error}"), "Weather API reported status \"failed\"");
}

#[test]
fn test_not_modified_detection() {
    let benign = BotError::TelegramError {
        code: 400,
        description: "Bad Request: message is not modified".to_string(),
    };
    assert!(benign.is_not_modified());

    let other = BotError::TelegramError {
        code: 400,
        description: "Bad Request: message to edit not found".to_string(),
    };
    assert!(!other.is_not_modified());
    assert!(!BotError::HttpError("message is not modified".to_string()).is_not_modified());
}

#[test]
fn test_bot_error_from_conversions() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    match BotError::from(json_err) {
        BotError::GeneralError(msg) => assert!(msg.starts_with("JSON error")),
        other => panic!("Unexpected error type: {other:?}"),
    }

    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    assert!(matches!(BotError::from(io_err), BotError::StorageError(_)));

    #[allow(unused)]
    #[allow(clippy::items_after_statements)]
    fn _check_reqwest_conversion(err: reqwest::Error) -> BotError {
        BotError::from(err)
    }
}
