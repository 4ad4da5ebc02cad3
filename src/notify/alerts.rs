//! Watermark-based alert deduplication
//!
//! An alert is new iff its publish timestamp is strictly greater than the
//! stored watermark. Items are compared one by one in arrival order; an old
//! item never hides a newer one that follows it.
//!
//! Delivery is at-least-once: sending stops at the first failure and the
//! watermark is held strictly below the failed item, so it is retried on the
//! next run. The watermark never moves backwards.

use chrono_tz::Tz;
use tracing::{error, info};

use super::render::render_alert;
use crate::core::config::ChatTarget;
use crate::core::models::AlertItem;
use crate::errors::BotError;
use crate::storage::WatermarkStore;
use crate::telegram::{Messenger, SendOptions};

/// Items that still need sending, and the watermark once all of them are sent.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPlan {
    pub pending: Vec<AlertItem>,
    pub watermark: i64,
}

#[must_use]
pub fn process_alerts(items: &[AlertItem], watermark: i64) -> AlertPlan {
    let mut next = watermark;
    let mut pending = Vec::new();

    for item in items {
        if item.publish_timestamp <= watermark {
            continue;
        }
        next = next.max(item.publish_timestamp);
        pending.push(item.clone());
    }

    AlertPlan {
        pending,
        watermark: next,
    }
}

#[derive(Debug)]
pub struct AlertReport {
    pub sent: usize,
    pub skipped: usize,
    pub watermark: i64,
    /// Publish timestamp and error of the item that stopped delivery.
    pub failure: Option<(i64, BotError)>,
}

/// Send every new alert to `chat` and persist the advanced watermark.
///
/// # Errors
///
/// Returns an error only if the watermark store cannot be saved; delivery
/// failures are reported in [`AlertReport::failure`].
pub async fn deliver_alerts(
    messenger: &dyn Messenger,
    chat: &ChatTarget,
    items: &[AlertItem],
    store: &mut WatermarkStore,
    key: &str,
    tz: Tz,
) -> Result<AlertReport, BotError> {
    let previous = store.get(key);
    let plan = process_alerts(items, previous);
    let skipped = items.len() - plan.pending.len();

    let mut delivered = previous;
    let mut sent = 0;
    let mut failure = None;

    for item in &plan.pending {
        let text = render_alert(item, tz);
        match messenger
            .send_message(chat, &text, &SendOptions::default())
            .await
        {
            Ok(message_id) => {
                info!(
                    publish_timestamp = item.publish_timestamp,
                    message_id, "Alert sent: {}", item.title
                );
                delivered = delivered.max(item.publish_timestamp);
                sent += 1;
            }
            Err(e) => {
                error!(
                    publish_timestamp = item.publish_timestamp,
                    "Failed to send alert {}: {}", item.title, e
                );
                failure = Some((item.publish_timestamp, e));
                break;
            }
        }
    }

    let target = match &failure {
        Some((failed_at, _)) => delivered.min(failed_at - 1),
        None => delivered,
    };
    if store.advance(key, target) {
        store.save()?;
    }

    Ok(AlertReport {
        sent,
        skipped,
        watermark: store.get(key),
        failure,
    })
}
