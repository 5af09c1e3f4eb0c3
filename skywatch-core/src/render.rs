use chrono::{Datelike, NaiveDate, Weekday};

use crate::model::WeatherSnapshot;

/// Shown in place of a sunrise/sunset time that could not be fetched.
pub const TIME_PLACEHOLDER: &str = "--:--";

/// Extract `HH:MM` from an ISO-8601 timestamp such as
/// `2026-08-08T06:41+08:00`. Anything absent or too short degrades to the
/// placeholder.
pub fn format_time(iso: Option<&str>) -> String {
    iso.and_then(|s| s.get(11..16))
        .unwrap_or(TIME_PLACEHOLDER)
        .to_string()
}

/// Label for a forecast row: "Today", "Tomorrow", then the weekday name.
/// The weekday comes from the calendar date alone, so it cannot drift with
/// the host timezone.
pub fn day_label(date: NaiveDate, index: usize) -> String {
    match index {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => weekday_name(date.weekday()).to_string(),
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Six-tier AQI banding for the panel badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AqiLevel {
    Good,
    Moderate,
    Light,
    Medium,
    Heavy,
    Severe,
}

impl AqiLevel {
    /// Band a numeric AQI. Total over `[0, ∞)`; each boundary belongs to
    /// the lower band.
    pub fn classify(index: f64) -> Self {
        if index <= 50.0 {
            AqiLevel::Good
        } else if index <= 100.0 {
            AqiLevel::Moderate
        } else if index <= 150.0 {
            AqiLevel::Light
        } else if index <= 200.0 {
            AqiLevel::Medium
        } else if index <= 300.0 {
            AqiLevel::Heavy
        } else {
            AqiLevel::Severe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiLevel::Good => "good",
            AqiLevel::Moderate => "moderate",
            AqiLevel::Light => "light",
            AqiLevel::Medium => "medium",
            AqiLevel::Heavy => "heavy",
            AqiLevel::Severe => "severe",
        }
    }

    /// Class name for styled front-ends, e.g. `aqi-good`.
    pub fn css_class(&self) -> &'static str {
        match self {
            AqiLevel::Good => "aqi-good",
            AqiLevel::Moderate => "aqi-moderate",
            AqiLevel::Light => "aqi-light",
            AqiLevel::Medium => "aqi-medium",
            AqiLevel::Heavy => "aqi-heavy",
            AqiLevel::Severe => "aqi-severe",
        }
    }
}

impl std::fmt::Display for AqiLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Render one snapshot as the text panel: header, current conditions with
/// wind and AQI badge, sun times, then the forecast list.
pub fn render_panel(
    snapshot: &WeatherSnapshot,
    location_label: &str,
    forecast_days: usize,
) -> String {
    let now = &snapshot.now;
    let mut out = String::new();

    out.push_str(&format!(
        "Current weather · {location_label} · {}\n",
        now.text
    ));

    let aqi_badge = snapshot
        .air
        .as_ref()
        .map(|air| {
            format!(
                " · AQI {} ({})",
                air.index,
                AqiLevel::classify(air.index)
            )
        })
        .unwrap_or_default();
    out.push_str(&format!(
        "wind {} · scale {}{aqi_badge}\n",
        now.wind_dir, now.wind_scale
    ));

    out.push_str(&format!(
        "sunrise {}  sunset {}\n",
        format_time(now.sunrise.as_deref()),
        format_time(now.sunset.as_deref())
    ));

    out.push_str(&format!(
        "[{}] {}° · feels {}°\n",
        now.icon, now.temp, now.feels_like
    ));

    out.push_str(&format!("Forecast · {location_label}\n"));
    for (index, day) in snapshot.daily.iter().take(forecast_days).enumerate() {
        out.push_str(&format!(
            "{:<9} [{}] {}°~ ~{}°\n",
            day_label(day.date, index),
            day.icon,
            day.temp_max,
            day.temp_min
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AirQuality, CurrentConditions, DailyForecast};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn sample_snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            now: CurrentConditions {
                temp: 25.0,
                feels_like: 26.0,
                text: "Sunny".to_string(),
                icon: "100".to_string(),
                wind_dir: "SW".to_string(),
                wind_scale: "3".to_string(),
                sunrise: Some("2026-08-08T06:41+08:00".to_string()),
                sunset: Some("2026-08-08T19:58+08:00".to_string()),
            },
            daily: vec![
                DailyForecast {
                    date: date(2026, 8, 8),
                    temp_max: 27.0,
                    temp_min: 17.0,
                    icon: "101".to_string(),
                },
                DailyForecast {
                    date: date(2026, 8, 9),
                    temp_max: 26.0,
                    temp_min: 16.0,
                    icon: "305".to_string(),
                },
                DailyForecast {
                    date: date(2026, 8, 10),
                    temp_max: 24.0,
                    temp_min: 15.0,
                    icon: "104".to_string(),
                },
            ],
            air: Some(AirQuality {
                index: 52.0,
                category: "Moderate".to_string(),
                color_hint: "rgb(255,212,0)".to_string(),
            }),
        }
    }

    #[test]
    fn classify_boundaries() {
        assert_eq!(AqiLevel::classify(0.0), AqiLevel::Good);
        assert_eq!(AqiLevel::classify(50.0), AqiLevel::Good);
        assert_eq!(AqiLevel::classify(51.0), AqiLevel::Moderate);
        assert_eq!(AqiLevel::classify(100.0), AqiLevel::Moderate);
        assert_eq!(AqiLevel::classify(101.0), AqiLevel::Light);
        assert_eq!(AqiLevel::classify(150.0), AqiLevel::Light);
        assert_eq!(AqiLevel::classify(151.0), AqiLevel::Medium);
        assert_eq!(AqiLevel::classify(200.0), AqiLevel::Medium);
        assert_eq!(AqiLevel::classify(201.0), AqiLevel::Heavy);
        assert_eq!(AqiLevel::classify(300.0), AqiLevel::Heavy);
        assert_eq!(AqiLevel::classify(301.0), AqiLevel::Severe);
        assert_eq!(AqiLevel::classify(9999.0), AqiLevel::Severe);
    }

    #[test]
    fn classify_exposes_labels_and_classes() {
        assert_eq!(AqiLevel::Good.label(), "good");
        assert_eq!(AqiLevel::Good.css_class(), "aqi-good");
        assert_eq!(AqiLevel::Severe.css_class(), "aqi-severe");
        assert_eq!(AqiLevel::classify(52.0).to_string(), "moderate");
    }

    #[test]
    fn format_time_slices_iso_timestamps() {
        assert_eq!(format_time(Some("2026-08-08T06:41+08:00")), "06:41");
        assert_eq!(format_time(Some("2026-08-08T19:58:30+08:00")), "19:58");
        assert_eq!(format_time(None), TIME_PLACEHOLDER);
        assert_eq!(format_time(Some("short")), TIME_PLACEHOLDER);
    }

    #[test]
    fn day_labels() {
        // 2000-01-01 was a Saturday.
        let d = date(2000, 1, 1);
        assert_eq!(day_label(d, 0), "Today");
        assert_eq!(day_label(d, 1), "Tomorrow");
        assert_eq!(day_label(d, 2), "Saturday");
        assert_eq!(day_label(date(2000, 1, 3), 5), "Monday");
    }

    #[test]
    fn panel_contains_now_block_and_badge() {
        let panel = render_panel(&sample_snapshot(), "kunming", 5);

        assert!(panel.contains("Current weather · kunming · Sunny"));
        assert!(panel.contains("wind SW · scale 3 · AQI 52 (moderate)"));
        assert!(panel.contains("sunrise 06:41  sunset 19:58"));
        assert!(panel.contains("[100] 25° · feels 26°"));
        assert!(panel.contains("Today"));
        assert!(panel.contains("Tomorrow"));
    }

    #[test]
    fn panel_limits_forecast_rows() {
        let panel = render_panel(&sample_snapshot(), "kunming", 2);
        assert!(panel.contains("Today"));
        assert!(panel.contains("Tomorrow"));
        assert!(!panel.contains("Monday"), "third row must be cut");

        let rows = panel.lines().count();
        // header, wind, sun, temp, forecast header, two rows
        assert_eq!(rows, 7);
    }

    #[test]
    fn panel_degrades_without_air_and_sun() {
        let mut snapshot = sample_snapshot();
        snapshot.air = None;
        snapshot.now.sunrise = None;
        snapshot.now.sunset = None;

        let panel = render_panel(&snapshot, "kunming", 5);
        assert!(!panel.contains("AQI"));
        assert!(panel.contains("sunrise --:--  sunset --:--"));
    }
}
