//! Telegram Bot API client
//!
//! Thin wrapper over the HTTP methods the bot needs. The bot token is part of
//! every URL, so URLs are stripped from transport errors before logging.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::Messenger;
use crate::core::config::{ChatTarget, TelegramConfig};
use crate::errors::BotError;

const PARSE_MODE: &str = "MarkdownV2";
const PHOTO_FILE_NAME: &str = "chart.png";
const PHOTO_ATTACHMENT: &str = "chart";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-message delivery switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions {
    pub disable_notification: bool,
}

#[derive(Debug, Deserialize)]
struct ApiReply<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

pub struct TelegramClient {
    http: Client,
    base_url: String,
}

impl TelegramClient {
    /// # Errors
    ///
    /// Returns `HttpError` if the HTTP client cannot be built.
    pub fn new(config: &TelegramConfig) -> Result<Self, BotError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: format!(
                "{}/bot{}",
                config.api_base.trim_end_matches('/'),
                config.token
            ),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BotError> {
        let response = request
            .send()
            .await
            .map_err(|e| BotError::from(e.without_url()))?;
        let status = response.status();
        let reply: ApiReply<T> = response.json().await.map_err(|e| {
            BotError::HttpError(format!("{method}: unreadable reply ({status}): {}", e.without_url()))
        })?;

        if !reply.ok {
            return Err(BotError::TelegramError {
                code: reply.error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                description: reply
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        debug!("Telegram {} succeeded", method);
        reply
            .result
            .ok_or_else(|| BotError::HttpError(format!("{method}: reply without result")))
    }

    async fn post_json<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, BotError> {
        let request = self.http.post(self.method_url(method)).json(body);
        self.call(method, request).await
    }

    async fn post_form<T: DeserializeOwned>(&self, method: &str, form: Form) -> Result<T, BotError> {
        let request = self.http.post(self.method_url(method)).multipart(form);
        self.call(method, request).await
    }

    fn photo_part(photo: Vec<u8>) -> Result<Part, BotError> {
        Ok(Part::bytes(photo)
            .file_name(PHOTO_FILE_NAME)
            .mime_str("image/png")?)
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(
        &self,
        chat: &ChatTarget,
        text: &str,
        options: &SendOptions,
    ) -> Result<i64, BotError> {
        let body = json!({
            "chat_id": chat,
            "text": text,
            "parse_mode": PARSE_MODE,
            "disable_web_page_preview": true,
            "disable_notification": options.disable_notification,
        });
        let sent: SentMessage = self.post_json("sendMessage", &body).await?;
        Ok(sent.message_id)
    }

    async fn edit_message_text(
        &self,
        chat: &ChatTarget,
        message_id: i64,
        text: &str,
    ) -> Result<(), BotError> {
        let body = json!({
            "chat_id": chat,
            "message_id": message_id,
            "text": text,
            "parse_mode": PARSE_MODE,
            "disable_web_page_preview": true,
        });
        let _: Value = self.post_json("editMessageText", &body).await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat: &ChatTarget,
        photo: Vec<u8>,
        caption: &str,
    ) -> Result<i64, BotError> {
        let form = Form::new()
            .text("chat_id", chat.to_string())
            .text("caption", caption.to_string())
            .text("parse_mode", PARSE_MODE)
            .part("photo", Self::photo_part(photo)?);
        let sent: SentMessage = self.post_form("sendPhoto", form).await?;
        Ok(sent.message_id)
    }

    async fn edit_message_photo(
        &self,
        chat: &ChatTarget,
        message_id: i64,
        photo: Vec<u8>,
        caption: &str,
    ) -> Result<(), BotError> {
        let media = json!({
            "type": "photo",
            "media": format!("attach://{PHOTO_ATTACHMENT}"),
            "caption": caption,
            "parse_mode": PARSE_MODE,
        });
        let form = Form::new()
            .text("chat_id", chat.to_string())
            .text("message_id", message_id.to_string())
            .text("media", media.to_string())
            .part(PHOTO_ATTACHMENT, Self::photo_part(photo)?);
        let _: Value = self.post_form("editMessageMedia", form).await?;
        Ok(())
    }

    async fn get_updates(&self, offset: Option<i64>, limit: u8) -> Result<Vec<Value>, BotError> {
        let mut body = json!({ "limit": limit });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        let updates: Vec<Value> = self.post_json("getUpdates", &body).await?;
        info!("Fetched {} Telegram update(s)", updates.len());
        Ok(updates)
    }
}
