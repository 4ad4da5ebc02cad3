//! Static lookup tables mapping provider codes to display strings.
//!
//! Every lookup fails soft: an unrecognised value renders as
//! [`UNKNOWN`] followed by the raw value in brackets.

/// Placeholder for a value the provider did not send.
pub const UNKNOWN: &str = "未知";

/// Upper bound (inclusive) and label; the first band that fits wins.
const PRECIPITATION_BANDS: &[(f64, &str)] = &[
    (-0.01, "数据异常"),
    (0.001, "无"),
    (0.031, "毛毛雨"),
    (0.25, "小雨"),
    (0.35, "中雨"),
    (0.48, "大雨"),
    (1.001, "暴雨"),
];

const SKYCONS: &[(&str, &str)] = &[
    ("CLEAR_DAY", "晴"),
    ("CLEAR_NIGHT", "晴"),
    ("PARTLY_CLOUDY_DAY", "多云"),
    ("PARTLY_CLOUDY_NIGHT", "多云"),
    ("CLOUDY", "阴"),
    ("LIGHT_HAZE", "轻度雾霾"),
    ("MODERATE_HAZE", "中度雾霾"),
    ("HEAVY_HAZE", "重度雾霾"),
    ("LIGHT_RAIN", "小雨"),
    ("MODERATE_RAIN", "中雨"),
    ("HEAVY_RAIN", "大雨"),
    ("STORM_RAIN", "暴雨"),
    ("FOG", "雾"),
    ("SNOW", "雪"),
    ("LIGHT_SNOW", "小雪"),
    ("MODERATE_SNOW", "中雪"),
    ("HEAVY_SNOW", "大雪"),
    ("STORM_SNOW", "暴雪"),
    ("DUST", "浮尘"),
    ("SAND", "沙尘"),
    ("WIND", "大风"),
    ("THUNDER_SHOWER", "雷阵雨"),
    ("HAIL", "冰雹"),
    ("SLEET", "雨夹雪"),
];

const ALERT_TYPES: &[(&str, &str)] = &[
    ("01", "台风"),
    ("02", "暴雨"),
    ("03", "暴雪"),
    ("04", "寒潮"),
    ("05", "大风"),
    ("06", "沙尘暴"),
    ("07", "高温"),
    ("08", "干旱"),
    ("09", "雷电"),
    ("10", "冰雹"),
    ("11", "霜冻"),
    ("12", "大雾"),
    ("13", "霾"),
    ("14", "道路结冰"),
    ("15", "森林火灾"),
    ("16", "雷雨大风"),
];

const ALERT_LEVELS: &[(&str, &str)] = &[
    ("00", "白色"),
    ("01", "蓝色"),
    ("02", "黄色"),
    ("03", "橙色"),
    ("04", "红色"),
];

const WEEKDAYS: [&str; 7] = [
    "星期一", "星期二", "星期三", "星期四", "星期五", "星期六", "星期日",
];

fn unknown(raw: impl std::fmt::Display) -> String {
    format!("{UNKNOWN}（{raw}）")
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

#[must_use]
pub fn skycon(code: &str) -> String {
    lookup(SKYCONS, code).map_or_else(|| unknown(code), str::to_string)
}

#[must_use]
pub fn precipitation_level(intensity: f64) -> String {
    PRECIPITATION_BANDS
        .iter()
        .find(|(upper, _)| intensity <= *upper)
        .map_or_else(|| unknown(intensity), |(_, label)| (*label).to_string())
}

/// Alert type from the first two digits of a four-digit alert code.
#[must_use]
pub fn alert_type(code: &str) -> String {
    code.get(0..2)
        .filter(|_| code.len() == 4)
        .and_then(|prefix| lookup(ALERT_TYPES, prefix))
        .map_or_else(|| unknown(code), str::to_string)
}

/// Alert level from the last two digits of a four-digit alert code.
#[must_use]
pub fn alert_level(code: &str) -> String {
    code.get(2..4)
        .filter(|_| code.len() == 4)
        .and_then(|suffix| lookup(ALERT_LEVELS, suffix))
        .map_or_else(|| unknown(code), str::to_string)
}

/// Monday-based weekday index (0 = Monday), wrapping modulo 7.
#[must_use]
pub fn weekday(index: u32) -> &'static str {
    WEEKDAYS[(index % 7) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precipitation_band_edges() {
        assert_eq!(precipitation_level(-1.0), "数据异常");
        assert_eq!(precipitation_level(0.0), "无");
        assert_eq!(precipitation_level(0.001), "无");
        assert_eq!(precipitation_level(0.03), "毛毛雨");
        assert_eq!(precipitation_level(0.25), "小雨");
        assert_eq!(precipitation_level(0.3), "中雨");
        assert_eq!(precipitation_level(0.48), "大雨");
        assert_eq!(precipitation_level(1.0), "暴雨");
    }

    #[test]
    fn test_weekday_wraps() {
        assert_eq!(weekday(0), "星期一");
        assert_eq!(weekday(6), "星期日");
        assert_eq!(weekday(7), "星期一");
    }
}
