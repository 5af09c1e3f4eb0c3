use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{
    auth::TokenIssuer,
    error::{FetchError, ResolveError},
    model::{
        AirQuality, CurrentConditions, DailyForecast, ResolvedLocation, WeatherSnapshot,
        looks_like_location_id,
    },
    provider::{Attempt, WeatherSource},
};

/// In-body status code the provider uses for success.
const CODE_OK: &str = "200";

const ENDPOINT_LOOKUP: &str = "city lookup";
const ENDPOINT_NOW: &str = "current weather";
const ENDPOINT_DAILY: &str = "daily forecast";
const ENDPOINT_SUN: &str = "sun times";
const ENDPOINT_AIR: &str = "air quality";

/// Client for the signed-token weather API.
///
/// Owns the token issuer and one HTTP client; every outbound call carries
/// a bearer token. One refresh cycle runs four sub-fetches: current
/// conditions and the daily forecast are mandatory, sun times and air
/// quality degrade softly.
#[derive(Debug)]
pub struct QWeatherClient {
    api_base: String,
    issuer: TokenIssuer,
    http: Client,
}

impl QWeatherClient {
    pub fn new(api_base: impl Into<String>, issuer: TokenIssuer) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            api_base,
            issuer,
            http: Client::new(),
        }
    }

    /// Resolve a free-text place name (or all-digits id) to the provider's
    /// canonical location record. Always performs the remote lookup, even
    /// for inputs that already look like an id.
    pub async fn resolve(&self, query: &str) -> Result<ResolvedLocation, ResolveError> {
        if looks_like_location_id(query) {
            tracing::debug!(query, "location query looks like a provider id");
        }

        let url = format!("{}/geo/v2/city/lookup", self.api_base);
        let body = self
            .get_body(ENDPOINT_LOOKUP, &url, &[("location", query.to_string())])
            .await?;
        check_code(ENDPOINT_LOOKUP, &body)?;

        let payload: GeoResponse = parse(ENDPOINT_LOOKUP, &body)?;
        let first = payload
            .location
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NoMatch(query.to_string()))?;

        let latitude: f64 = first
            .lat
            .parse()
            .map_err(|_| ResolveError::Coordinate(first.lat.clone()))?;
        let longitude: f64 = first
            .lon
            .parse()
            .map_err(|_| ResolveError::Coordinate(first.lon.clone()))?;

        tracing::info!(id = %first.id, latitude, longitude, "location resolved");

        Ok(ResolvedLocation {
            id: first.id,
            latitude,
            longitude,
        })
    }

    async fn fetch_now(
        &self,
        location: &ResolvedLocation,
    ) -> Result<CurrentConditions, FetchError> {
        let attempt = Attempt::location_id(
            format!("{}/v7/weather/now", self.api_base),
            vec![("location", location.id.clone())],
        );
        let payload: NowResponse = self.checked_get(ENDPOINT_NOW, &attempt).await?;
        let now = payload.now;

        Ok(CurrentConditions {
            temp: parse_num(ENDPOINT_NOW, "temp", &now.temp)?,
            feels_like: parse_num(ENDPOINT_NOW, "feelsLike", &now.feels_like)?,
            text: now.text,
            icon: now.icon,
            wind_dir: now.wind_dir,
            wind_scale: now.wind_scale,
            sunrise: None,
            sunset: None,
        })
    }

    async fn fetch_daily(
        &self,
        location: &ResolvedLocation,
    ) -> Result<Vec<DailyForecast>, FetchError> {
        let attempts = [
            Attempt::coordinates(
                format!("{}/v7/grid-weather/7d", self.api_base),
                vec![(
                    "location",
                    format!("{},{}", location.lon_param(), location.lat_param()),
                )],
            ),
            Attempt::location_id(
                format!("{}/v7/weather/7d", self.api_base),
                vec![("location", location.id.clone())],
            ),
        ];

        let payload: DailyResponse = self.get_with_fallback(ENDPOINT_DAILY, &attempts).await?;

        payload
            .daily
            .into_iter()
            .map(|entry| {
                Ok(DailyForecast {
                    date: entry.fx_date,
                    temp_max: parse_num(ENDPOINT_DAILY, "tempMax", &entry.temp_max)?,
                    temp_min: parse_num(ENDPOINT_DAILY, "tempMin", &entry.temp_min)?,
                    icon: entry.icon_day,
                })
            })
            .collect()
    }

    async fn fetch_sun(&self, location: &ResolvedLocation) -> Result<SunTimes, FetchError> {
        // Calendar date in a fixed reference zone (UTC), so a remote
        // location never drifts across the host machine's day boundary.
        let date = Utc::now().format("%Y%m%d").to_string();
        let url = format!("{}/v7/astronomy/sun", self.api_base);

        let attempts = [
            Attempt::coordinates(
                url.clone(),
                vec![
                    (
                        "location",
                        format!("{},{}", location.lon_param(), location.lat_param()),
                    ),
                    ("date", date.clone()),
                ],
            ),
            Attempt::location_id(
                url,
                vec![("location", location.id.clone()), ("date", date)],
            ),
        ];

        let payload: SunResponse = self.get_with_fallback(ENDPOINT_SUN, &attempts).await?;
        Ok(SunTimes {
            sunrise: payload.sunrise,
            sunset: payload.sunset,
        })
    }

    /// Air quality has no fallback addressing and no in-body status code:
    /// an empty index set is the provider's "no data here", not a failure.
    async fn fetch_air(
        &self,
        location: &ResolvedLocation,
    ) -> Result<Option<AirQuality>, FetchError> {
        let url = format!(
            "{}/airquality/v1/current/{}/{}",
            self.api_base,
            location.lat_param(),
            location.lon_param()
        );

        let body = self.get_body(ENDPOINT_AIR, &url, &[]).await?;
        let payload: AirResponse = parse(ENDPOINT_AIR, &body)?;

        let Some(first) = payload.indexes.into_iter().next() else {
            return Ok(None);
        };

        let Ok(index) = first.aqi_display.trim().parse::<f64>() else {
            tracing::debug!(value = %first.aqi_display, "non-numeric air index, treating as no data");
            return Ok(None);
        };

        let color_hint = first
            .color
            .map(|c| format!("rgb({},{},{})", c.red, c.green, c.blue))
            .unwrap_or_default();

        Ok(Some(AirQuality {
            index,
            category: first.category,
            color_hint,
        }))
    }

    /// Try each attempt in order until one yields a usable payload.
    /// Fallback hops are logged; the last error wins when all fail.
    async fn get_with_fallback<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        attempts: &[Attempt],
    ) -> Result<T, FetchError> {
        let mut last: Option<FetchError> = None;

        for attempt in attempts {
            match self.checked_get::<T>(endpoint, attempt).await {
                Ok(payload) => return Ok(payload),
                Err(err) => {
                    tracing::warn!(mode = %attempt.mode, error = %err, "{endpoint} attempt failed");
                    last = Some(err);
                }
            }
        }

        Err(last.unwrap_or(FetchError::Provider {
            endpoint,
            code: "no attempts".to_string(),
        }))
    }

    /// One authenticated GET with the in-body status code verified before
    /// the payload is parsed.
    async fn checked_get<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        attempt: &Attempt,
    ) -> Result<T, FetchError> {
        let body = self.get_body(endpoint, &attempt.url, &attempt.query).await?;
        check_code(endpoint, &body)?;
        parse(endpoint, &body)
    }

    async fn get_body(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<String, FetchError> {
        let token = self.issuer.bearer()?;

        let mut request = self.http.get(url).bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }

        let res = request
            .send()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherSource for QWeatherClient {
    /// One refresh cycle. Mandatory sub-fetches propagate their error and
    /// abandon the cycle; soft ones degrade to placeholders. The current
    /// conditions are enriched with the resolved sun times before the
    /// snapshot is assembled.
    async fn fetch_all(
        &self,
        location: &ResolvedLocation,
    ) -> Result<WeatherSnapshot, FetchError> {
        let mut now = self.fetch_now(location).await?;
        let daily = self.fetch_daily(location).await?;

        let sun = match self.fetch_sun(location).await {
            Ok(sun) => sun,
            Err(err) => {
                tracing::warn!(error = %err, "sun times unavailable, leaving placeholders");
                SunTimes::default()
            }
        };

        let air = match self.fetch_air(location).await {
            Ok(air) => air,
            Err(err) => {
                tracing::warn!(error = %err, "air quality unavailable");
                None
            }
        };

        now.sunrise = sun.sunrise;
        now.sunset = sun.sunset;

        Ok(WeatherSnapshot { now, daily, air })
    }
}

#[derive(Debug, Default)]
struct SunTimes {
    sunrise: Option<String>,
    sunset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusProbe {
    code: String,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    location: Option<Vec<GeoLocation>>,
}

#[derive(Debug, Deserialize)]
struct GeoLocation {
    id: String,
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct NowResponse {
    now: NowPayload,
}

#[derive(Debug, Deserialize)]
struct NowPayload {
    temp: String,
    #[serde(rename = "feelsLike")]
    feels_like: String,
    text: String,
    icon: String,
    #[serde(rename = "windDir")]
    wind_dir: String,
    #[serde(rename = "windScale")]
    wind_scale: String,
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: Vec<DailyEntry>,
}

#[derive(Debug, Deserialize)]
struct DailyEntry {
    #[serde(rename = "fxDate")]
    fx_date: NaiveDate,
    #[serde(rename = "tempMax")]
    temp_max: String,
    #[serde(rename = "tempMin")]
    temp_min: String,
    #[serde(rename = "iconDay")]
    icon_day: String,
}

#[derive(Debug, Deserialize)]
struct SunResponse {
    sunrise: Option<String>,
    sunset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirResponse {
    #[serde(default)]
    indexes: Vec<AirIndex>,
}

#[derive(Debug, Deserialize)]
struct AirIndex {
    #[serde(rename = "aqiDisplay")]
    aqi_display: String,
    category: String,
    color: Option<AirColor>,
}

#[derive(Debug, Deserialize)]
struct AirColor {
    red: u8,
    green: u8,
    blue: u8,
}

/// Check the in-body status code shared by the geo/v7 response families.
fn check_code(endpoint: &'static str, body: &str) -> Result<(), FetchError> {
    let probe: StatusProbe = parse(endpoint, body)?;
    if probe.code != CODE_OK {
        return Err(FetchError::Provider {
            endpoint,
            code: probe.code,
        });
    }
    Ok(())
}

fn parse<T: DeserializeOwned>(endpoint: &'static str, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|source| FetchError::Parse { endpoint, source })
}

fn parse_num(
    endpoint: &'static str,
    field: &'static str,
    value: &str,
) -> Result<f64, FetchError> {
    value.trim().parse().map_err(|_| FetchError::Malformed {
        endpoint,
        field,
        value: value.to_string(),
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
