//! MarkdownV2 message templates.
//!
//! Pure functions over the typed payload views. Missing fields render as
//! [`UNKNOWN`]; nothing here can fail.

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use super::texts::{self, UNKNOWN};
use crate::core::models::{AlertItem, DailyForecast, Hourly, Realtime};
use crate::utils::markdown::{bold, escape_markdown};

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNKNOWN.to_string())
}

fn text_or_unknown(value: Option<&str>) -> String {
    or_unknown(value.map(str::to_string))
}

fn number(value: Option<f64>, digits: usize) -> String {
    or_unknown(value.map(|v| format!("{v:.digits$}")))
}

fn percent(value: Option<f64>) -> String {
    or_unknown(value.map(|v| format!("{:.0}%", v * 100.0)))
}

/// Local date and time of a Unix timestamp, e.g. `2024 年 01 月 02 日 星期二 08:30`.
#[must_use]
pub fn format_timestamp(timestamp: i64, tz: Tz, with_seconds: bool) -> String {
    let Some(utc) = Utc.timestamp_opt(timestamp, 0).single() else {
        return UNKNOWN.to_string();
    };
    let local = utc.with_timezone(&tz);
    let clock = if with_seconds { "%H:%M:%S" } else { "%H:%M" };
    format!(
        "{} {} {}",
        local.format("%Y 年 %m 月 %d 日"),
        texts::weekday(local.weekday().num_days_from_monday()),
        local.format(clock)
    )
}

/// Local date of an ISO-8601 date or datetime, e.g. `2024 年 01 月 03 日 星期三`.
#[must_use]
pub fn format_date(iso: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(iso.get(0..10)?, "%Y-%m-%d").ok()?;
    Some(format!(
        "{} {}",
        date.format("%Y 年 %m 月 %d 日"),
        texts::weekday(date.weekday().num_days_from_monday())
    ))
}

/// Realtime conditions summary, edited in place on the channel.
#[must_use]
pub fn render_summary(
    realtime: &Realtime,
    server_time: i64,
    tz: Tz,
    precipitation_link: Option<&str>,
) -> String {
    let temperature = or_unknown(realtime.temperature.map(|t| format!("{t:.0}°C")));
    let sky = realtime
        .skycon
        .as_deref()
        .map_or_else(|| UNKNOWN.to_string(), texts::skycon);
    let heading = format!("实时天气：{temperature}  {sky}");

    let mut body = format!("\n湿度：{}", percent(realtime.humidity));
    let local = &realtime.precipitation.local;
    if local.is_ok() {
        let level = local
            .intensity
            .map_or_else(|| UNKNOWN.to_string(), texts::precipitation_level);
        body.push_str(&format!("\n降水：{level}"));
    }
    body.push_str(&format!(
        "\n能见度：{} km\n空气质量：{}\n紫外线：{}\n舒适度：{}",
        number(realtime.visibility, 1),
        text_or_unknown(realtime.air_quality.description.chn.as_deref()),
        text_or_unknown(realtime.life_index.ultraviolet.desc.as_deref()),
        text_or_unknown(realtime.life_index.comfort.desc.as_deref()),
    ));

    let mut text = format!(
        "{}{}\n\n{}",
        bold(&escape_markdown(&heading)),
        escape_markdown(&body),
        bold(&escape_markdown(&format_timestamp(server_time, tz, false)))
    );
    if let Some(link) = precipitation_link {
        text.push_str(&format!("\n[未来 2 小时降水]({})", escape_link(link)));
    }
    text
}

/// Caption under the two-hour precipitation chart.
#[must_use]
pub fn render_precipitation_caption(keypoint: Option<&str>, server_time: i64, tz: Tz) -> String {
    format!(
        "{}\n{}",
        escape_markdown(&text_or_unknown(keypoint)),
        bold(&escape_markdown(&format_timestamp(server_time, tz, false)))
    )
}

/// Caption under the hourly temperature chart.
#[must_use]
pub fn render_temperature_caption(hourly: &Hourly, server_time: i64, tz: Tz) -> String {
    let description = hourly.description.as_deref().unwrap_or("未来 48 小时气温");
    format!(
        "{}\n{}",
        escape_markdown(description),
        bold(&escape_markdown(&format_timestamp(server_time, tz, false)))
    )
}

#[must_use]
pub fn render_alert(item: &AlertItem, tz: Tz) -> String {
    let mut text = bold(&escape_markdown(&format!("【{}】", item.title)));
    text.push('\n');
    if let Some(code) = item.code.as_deref() {
        let kind = format!(
            "类型：{}　级别：{}\n",
            texts::alert_type(code),
            texts::alert_level(code)
        );
        text.push_str(&escape_markdown(&kind));
    }
    text.push_str(&escape_markdown(&item.body));
    text.push_str(&format!(
        "\n\n*发布时间*：{}\n\\#预警",
        escape_markdown(&format_timestamp(item.publish_timestamp, tz, true))
    ));
    text
}

/// Next-day forecast post.
#[must_use]
pub fn render_forecast(day: &DailyForecast) -> String {
    let date = or_unknown(day.skycon.date.as_deref().and_then(format_date));
    let sky = |value: Option<&str>| value.map_or_else(|| UNKNOWN.to_string(), texts::skycon);

    let body = format!(
        "\n温度：{}°C - {}°C\n湿度：{}\n白天天气：{}\n夜间天气：{}\n空气质量：{}\n日出日落：{} - {}\n紫外线：{}\n舒适度：{}",
        number(day.temperature.min, 1),
        number(day.temperature.max, 1),
        percent(day.humidity.avg),
        sky(day.skycon_08h_20h.value.as_deref()),
        sky(day.skycon_20h_32h.value.as_deref()),
        number(day.air_quality.aqi.avg.chn, 0),
        text_or_unknown(day.astro.sunrise.time.as_deref()),
        text_or_unknown(day.astro.sunset.time.as_deref()),
        text_or_unknown(day.life_index.ultraviolet.desc.as_deref()),
        text_or_unknown(day.life_index.comfort.desc.as_deref()),
    );

    format!(
        "\\#天气预报\n{}{}",
        bold(&escape_markdown(&date)),
        escape_markdown(&body)
    )
}

/// Inside a MarkdownV2 link target only `)` and `\` need escaping.
fn escape_link(url: &str) -> String {
    url.replace('\\', r"\\").replace(')', r"\)")
}
