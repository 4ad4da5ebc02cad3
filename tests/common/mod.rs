#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use weatherbot::BotError;
use weatherbot::core::clock::{Clock, ManualClock};
use weatherbot::core::config::{
    AppConfig, ChatTarget, CredentialStrategy, FeatureFlags, TelegramConfig, WeatherConfig,
};
use weatherbot::core::models::WeatherResponse;
use weatherbot::telegram::{Messenger, SendOptions};
use weatherbot::weather::WeatherSource;

pub const T0: i64 = 1_700_000_000;

pub fn weather_config(dir: &Path) -> WeatherConfig {
    WeatherConfig {
        tokens: vec!["token-a".to_string(), "token-b".to_string()],
        longitude: 121.47,
        latitude: 31.23,
        timeout: Duration::from_secs(5),
        retry: 3,
        retry_delay: Duration::ZERO,
        cache_file: dir.join("cache.json"),
        cache_ttl: 300,
        credential_strategy: CredentialStrategy::Fixed,
        api_base: "http://127.0.0.1:9".to_string(),
    }
}

pub fn app_config(dir: &Path) -> AppConfig {
    AppConfig {
        caiyun: weather_config(dir),
        telegram: TelegramConfig {
            token: "123:abc".to_string(),
            target: ChatTarget::Username("@weather".to_string()),
            realtime_id: Some(10),
            precipitation_id: Some(11),
            channel_name: Some("weather".to_string()),
            api_base: "http://127.0.0.1:9".to_string(),
            features: FeatureFlags::default(),
        },
        data_file: dir.join("data.json"),
        timezone: chrono_tz::Asia::Shanghai,
    }
}

/// A full provider payload with every section the bot reads.
pub fn payload(server_time: i64) -> Value {
    json!({
        "status": "ok",
        "api_version": "v2.6",
        "server_time": server_time,
        "result": {
            "forecast_keypoint": "未来两小时不会下雨",
            "realtime": {
                "status": "ok",
                "temperature": 21.4,
                "humidity": 0.63,
                "skycon": "PARTLY_CLOUDY_DAY",
                "visibility": 12.3,
                "precipitation": { "local": { "status": "ok", "intensity": 0.0 } },
                "air_quality": { "description": { "chn": "优" } },
                "life_index": {
                    "ultraviolet": { "desc": "弱" },
                    "comfort": { "desc": "舒适" }
                }
            },
            "minutely": {
                "status": "ok",
                "description": "未来两小时不会下雨",
                "precipitation_2h": vec![0.0; 120]
            },
            "hourly": {
                "status": "ok",
                "description": "晴转多云",
                "temperature": (0..48)
                    .map(|h| json!({ "datetime": format!("h{h}"), "value": 15.0 + f64::from(h % 12) }))
                    .collect::<Vec<_>>()
            },
            "alert": {
                "status": "ok",
                "content": [
                    { "pubtimestamp": 900, "title": "旧预警", "description": "已发送", "code": "0201" },
                    { "pubtimestamp": 1200, "title": "大风蓝色预警", "description": "阵风 8 级", "code": "0501" },
                    { "pubtimestamp": 1500, "title": "暴雨黄色预警", "description": "注意防范", "code": "0202" }
                ]
            },
            "daily": {
                "status": "ok",
                "skycon": [
                    { "date": "2024-01-02T00:00+08:00", "value": "CLEAR_DAY" },
                    { "date": "2024-01-03T00:00+08:00", "value": "LIGHT_RAIN" }
                ],
                "temperature": [
                    { "max": 12.0, "min": 3.0, "avg": 7.0 },
                    { "max": 10.0, "min": 4.0, "avg": 6.0 }
                ]
            }
        }
    })
}

pub fn response(server_time: i64) -> WeatherResponse {
    serde_json::from_value(payload(server_time)).unwrap()
}

/// Weather source that fails a set number of times, then answers with a
/// payload stamped with the current clock time.
pub struct ScriptedSource {
    pub calls: Arc<AtomicUsize>,
    pub tokens: Arc<Mutex<Vec<String>>>,
    failures: usize,
    clock: Arc<ManualClock>,
}

impl ScriptedSource {
    pub fn new(failures: usize, clock: Arc<ManualClock>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            tokens: Arc::new(Mutex::new(Vec::new())),
            failures,
            clock,
        }
    }
}

#[async_trait]
impl WeatherSource for ScriptedSource {
    async fn request(&self, token: &str) -> Result<WeatherResponse, BotError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(token.to_string());
        if call < self.failures {
            return Err(BotError::HttpError(format!("timeout #{}", call + 1)));
        }
        Ok(response(self.clock.now()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Message { text: String, silent: bool },
    Edit { message_id: i64, text: String },
    Photo { caption: String },
    EditPhoto { message_id: i64, caption: String },
}

/// Messenger that records every call and can be told to fail.
#[derive(Default)]
pub struct RecordingMessenger {
    pub sent: Arc<Mutex<Vec<Sent>>>,
    /// Fail `send_message` calls whose text contains this marker.
    pub fail_on: Option<String>,
    /// Reply to edits with Telegram's "message is not modified".
    pub unchanged: bool,
    /// Fail photo uploads.
    pub fail_photos: bool,
    /// Replies to `get_updates`.
    pub updates: Vec<Value>,
}

impl RecordingMessenger {
    pub fn messages(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn not_modified() -> BotError {
        BotError::TelegramError {
            code: 400,
            description: "Bad Request: message is not modified".to_string(),
        }
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(
        &self,
        _chat: &ChatTarget,
        text: &str,
        options: &SendOptions,
    ) -> Result<i64, BotError> {
        if self.fail_on.as_deref().is_some_and(|m| text.contains(m)) {
            return Err(BotError::TelegramError {
                code: 429,
                description: "Too Many Requests".to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(Sent::Message {
            text: text.to_string(),
            silent: options.disable_notification,
        });
        Ok(sent.len() as i64)
    }

    async fn edit_message_text(
        &self,
        _chat: &ChatTarget,
        message_id: i64,
        text: &str,
    ) -> Result<(), BotError> {
        if self.unchanged {
            return Err(Self::not_modified());
        }
        self.sent.lock().unwrap().push(Sent::Edit {
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        _chat: &ChatTarget,
        _photo: Vec<u8>,
        caption: &str,
    ) -> Result<i64, BotError> {
        if self.fail_photos {
            return Err(BotError::HttpError("upload failed".to_string()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(Sent::Photo {
            caption: caption.to_string(),
        });
        Ok(sent.len() as i64)
    }

    async fn edit_message_photo(
        &self,
        _chat: &ChatTarget,
        message_id: i64,
        _photo: Vec<u8>,
        caption: &str,
    ) -> Result<(), BotError> {
        if self.fail_photos {
            return Err(BotError::HttpError("upload failed".to_string()));
        }
        if self.unchanged {
            return Err(Self::not_modified());
        }
        self.sent.lock().unwrap().push(Sent::EditPhoto {
            message_id,
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn get_updates(&self, _offset: Option<i64>, limit: u8) -> Result<Vec<Value>, BotError> {
        Ok(self.updates.iter().take(usize::from(limit)).cloned().collect())
    }
}
