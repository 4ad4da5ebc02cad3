// Lambda bootstrap entry point; the schedule passes {"action": "...", "verbose": "..."}

use std::env;
use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;
use tracing::error;
use weatherbot::core::config::AppConfig;
use weatherbot::worker::handle_event;
use weatherbot::{Verbosity, setup_logging};

const LOG_LEVEL_ENV: &str = "WEATHERBOT_LOG_LEVEL";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    let verbosity = env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|level| level.parse::<Verbosity>().ok())
        .unwrap_or(Verbosity::Info);
    let log = Arc::new(setup_logging(verbosity));
    let config_path = Arc::new(AppConfig::default_path());

    run(service_fn(move |event: LambdaEvent<Value>| {
        let log = Arc::clone(&log);
        let config_path = Arc::clone(&config_path);
        async move {
            let result = handle_event(event.payload, config_path.as_path(), Some(&*log)).await;
            // Restore the baseline level for the next warm invocation.
            log.set_level(verbosity);
            result.map_err(|e| {
                error!("Invocation failed: {}", e);
                Error::from(e.to_string())
            })
        }
    }))
    .await
}
