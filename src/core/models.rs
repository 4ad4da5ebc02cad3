//! Weather provider payload and typed views over its sections.
//!
//! The full response is kept as raw JSON so the cache stores exactly what the
//! provider returned. Sections are decoded on demand; every leaf is optional
//! so a missing field degrades to a placeholder instead of failing the parse.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub const STATUS_OK: &str = "ok";

/// Provider response as stored in the cache file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub status: String,
    /// Provider clock at response time; the cache freshness anchor.
    pub server_time: i64,
    #[serde(default)]
    pub result: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WeatherResponse {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    #[must_use]
    pub fn realtime(&self) -> Option<Realtime> {
        self.section("realtime")
    }

    #[must_use]
    pub fn minutely(&self) -> Option<Minutely> {
        self.section("minutely")
    }

    #[must_use]
    pub fn hourly(&self) -> Option<Hourly> {
        self.section("hourly")
    }

    #[must_use]
    pub fn alert(&self) -> Option<AlertSection> {
        self.section("alert")
    }

    /// Single-day view of the daily section, `day` 0 being today.
    #[must_use]
    pub fn daily(&self, day: usize) -> Option<DailyForecast> {
        let raw = self.result.get("daily")?;
        decode("daily", extract_day(raw, day))
    }

    #[must_use]
    pub fn forecast_keypoint(&self) -> Option<&str> {
        self.result.get("forecast_keypoint").and_then(Value::as_str)
    }

    fn section<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let raw = self.result.get(name)?;
        decode(name, raw.clone())
    }
}

fn decode<T: DeserializeOwned>(name: &str, raw: Value) -> Option<T> {
    match serde_json::from_value(raw) {
        Ok(section) => Some(section),
        Err(e) => {
            debug!("Ignoring undecodable {} section: {}", name, e);
            None
        }
    }
}

/// Replace every array in `value` with its `day`-th element, recursing into
/// objects. Keys whose array is too short are dropped.
#[must_use]
pub fn extract_day(value: &Value, day: usize) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, item) in map {
                let picked = match item {
                    Value::Array(items) => items.get(day).cloned(),
                    Value::Object(_) => Some(extract_day(item, day)),
                    other => Some(other.clone()),
                };
                if let Some(picked) = picked {
                    out.insert(key.clone(), picked);
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => items.get(day).cloned().unwrap_or(Value::Null),
        other => other.clone(),
    }
}

fn section_ok(status: Option<&str>) -> bool {
    status == Some(STATUS_OK)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Realtime {
    pub status: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub skycon: Option<String>,
    pub visibility: Option<f64>,
    pub precipitation: RealtimePrecipitation,
    pub air_quality: AirQuality,
    pub life_index: LifeIndex,
}

impl Realtime {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        section_ok(self.status.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RealtimePrecipitation {
    pub local: LocalPrecipitation,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocalPrecipitation {
    pub status: Option<String>,
    pub intensity: Option<f64>,
}

impl LocalPrecipitation {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        section_ok(self.status.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AirQuality {
    pub description: AqiText,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AqiText {
    pub chn: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LifeIndex {
    pub ultraviolet: IndexDesc,
    pub comfort: IndexDesc,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndexDesc {
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Minutely {
    pub status: Option<String>,
    pub description: Option<String>,
    pub precipitation_2h: Vec<f64>,
}

impl Minutely {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        section_ok(self.status.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Hourly {
    pub status: Option<String>,
    pub description: Option<String>,
    pub temperature: Vec<TimedValue>,
}

impl Hourly {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        section_ok(self.status.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimedValue {
    pub datetime: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlertSection {
    pub status: Option<String>,
    pub content: Vec<AlertItem>,
}

impl AlertSection {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        section_ok(self.status.as_deref())
    }
}

/// One published weather alert; its publish timestamp doubles as its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertItem {
    #[serde(rename = "pubtimestamp")]
    pub publish_timestamp: i64,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "description", default)]
    pub body: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DailyForecast {
    pub status: Option<String>,
    pub skycon: DatedValue,
    pub skycon_08h_20h: DatedValue,
    pub skycon_20h_32h: DatedValue,
    pub temperature: Range,
    pub humidity: Range,
    pub air_quality: DailyAirQuality,
    pub astro: Astro,
    pub life_index: LifeIndex,
}

impl DailyForecast {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        section_ok(self.status.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatedValue {
    pub date: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Range {
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub avg: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DailyAirQuality {
    pub aqi: DailyAqi,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DailyAqi {
    pub avg: AqiValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AqiValue {
    pub chn: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Astro {
    pub sunrise: ClockTime,
    pub sunset: ClockTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClockTime {
    pub time: Option<String>,
}
