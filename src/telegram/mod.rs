//! Messaging collaborator: the `Messenger` seam and its Bot API implementation

pub mod client;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

pub use client::{SendOptions, TelegramClient};

use crate::core::config::ChatTarget;
use crate::errors::BotError;

/// Delivery operations the notifier needs from a chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Post a new MarkdownV2 message; returns its message id.
    async fn send_message(
        &self,
        chat: &ChatTarget,
        text: &str,
        options: &SendOptions,
    ) -> Result<i64, BotError>;

    async fn edit_message_text(
        &self,
        chat: &ChatTarget,
        message_id: i64,
        text: &str,
    ) -> Result<(), BotError>;

    /// Post a new PNG photo with a MarkdownV2 caption; returns its message id.
    async fn send_photo(
        &self,
        chat: &ChatTarget,
        photo: Vec<u8>,
        caption: &str,
    ) -> Result<i64, BotError>;

    async fn edit_message_photo(
        &self,
        chat: &ChatTarget,
        message_id: i64,
        photo: Vec<u8>,
        caption: &str,
    ) -> Result<(), BotError>;

    /// Recent updates addressed to the bot, oldest first. Used to discover
    /// chat and message ids.
    async fn get_updates(&self, offset: Option<i64>, limit: u8) -> Result<Vec<Value>, BotError>;
}

/// Treat "message is not modified" as success; any other error passes through.
///
/// # Errors
///
/// Returns the error unchanged unless it is the benign not-modified reply.
pub fn ignore_not_modified(result: Result<(), BotError>) -> Result<(), BotError> {
    match result {
        Err(e) if e.is_not_modified() => {
            debug!("Message content unchanged, nothing to edit");
            Ok(())
        }
        other => other,
    }
}
