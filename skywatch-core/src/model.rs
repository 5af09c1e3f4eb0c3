use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A place resolved through the provider's geo lookup.
///
/// The `id` keys identifier-addressed endpoints, the coordinates key
/// grid-addressed endpoints. Resolved once per initialization and treated
/// as immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ResolvedLocation {
    /// Latitude formatted for outbound requests.
    pub fn lat_param(&self) -> String {
        format_coord(self.latitude)
    }

    /// Longitude formatted for outbound requests.
    pub fn lon_param(&self) -> String {
        format_coord(self.longitude)
    }
}

/// Format a coordinate to exactly two decimal digits.
///
/// The provider keys grid resources on two-decimal coordinates; requests
/// with more (or fewer) digits address a different resource. Every
/// coordinate placed into a URL goes through this function.
pub fn format_coord(value: f64) -> String {
    format!("{value:.2}")
}

/// True when a location query is an all-digits provider identifier rather
/// than a free-text place name.
pub fn looks_like_location_id(query: &str) -> bool {
    !query.is_empty() && query.bytes().all(|b| b.is_ascii_digit())
}

/// Current conditions, enriched with sun times from the astronomy call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp: f64,
    pub feels_like: f64,
    /// Condition text, e.g. "Sunny".
    pub text: String,
    /// Provider icon code, e.g. "100".
    pub icon: String,
    pub wind_dir: String,
    pub wind_scale: String,
    /// ISO-8601 local timestamp; absent when the astronomy call degraded.
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

/// One day of the multi-day forecast. Entries are chronological,
/// index 0 being the soonest day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_max: f64,
    pub temp_min: f64,
    pub icon: String,
}

/// Air quality reading. `None` at the snapshot level is the provider's
/// "no data for these coordinates" answer, not a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirQuality {
    pub index: f64,
    pub category: String,
    /// Provider-recommended display color, empty when not supplied.
    pub color_hint: String,
}

/// Everything one refresh cycle produces. Assembled atomically: either the
/// whole snapshot is delivered or the cycle is abandoned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub now: CurrentConditions,
    pub daily: Vec<DailyForecast>,
    pub air: Option<AirQuality>,
}
