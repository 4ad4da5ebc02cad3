use std::path::Path;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use super::actions::Action;
use super::runner::Runner;
use crate::core::config::AppConfig;
use crate::errors::BotError;
use crate::{LogHandle, Verbosity};

/// Payload of a scheduled Lambda invocation, e.g. `{"action": "cron"}`.
#[derive(Debug, Default, Deserialize)]
pub struct BotEvent {
    pub action: Option<String>,
    pub verbose: Option<String>,
}

/// Handle one scheduled invocation and build the Lambda response.
///
/// # Errors
///
/// Returns an error if the event is malformed, the config cannot be loaded,
/// the action is unknown, or a single (non-cron) action fails.
pub async fn handle_event(
    payload: Value,
    config_path: &Path,
    log: Option<&LogHandle>,
) -> Result<Value, BotError> {
    let event: BotEvent = if payload.is_null() {
        BotEvent::default()
    } else {
        serde_json::from_value(payload)
            .map_err(|e| BotError::GeneralError(format!("Invalid event payload: {e}")))?
    };

    if let (Some(handle), Some(level)) = (log, event.verbose.as_deref()) {
        match level.parse::<Verbosity>() {
            Ok(verbosity) => handle.set_level(verbosity),
            Err(e) => warn!("Ignoring verbosity {:?}: {}", level, e),
        }
    }

    let Some(action) = event.action.as_deref() else {
        warn!("No action specified, exiting");
        return Ok(ok_response());
    };
    let action: Action = action.parse()?;

    let config = AppConfig::load(config_path).map_err(|e| {
        error!("Config error: {}", e);
        e
    })?;
    let runner = Runner::from_config(config)?;
    runner.run(action).await?;

    info!("Invocation finished");
    Ok(ok_response())
}

fn ok_response() -> Value {
    json!({
        "statusCode": 200,
        "body": "OK\n",
    })
}
