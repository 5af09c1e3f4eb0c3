use crate::{
    error::FetchError,
    model::{ResolvedLocation, WeatherSnapshot},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod qweather;

/// How a request addresses its resource. Some provider resources exist
/// twice, once keyed by coordinates and once by location id; these are
/// genuinely different endpoints, not one endpoint with different
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    /// Two-decimal coordinate pair.
    Coordinates,
    /// Provider location identifier.
    LocationId,
}

impl AddressMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressMode::Coordinates => "coordinates",
            AddressMode::LocationId => "location-id",
        }
    }
}

impl std::fmt::Display for AddressMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One addressing attempt against a provider resource.
///
/// A resource is fetched through an ordered slice of attempts, tried in
/// sequence until one yields a successful payload.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub mode: AddressMode,
    pub url: String,
    pub query: Vec<(&'static str, String)>,
}

impl Attempt {
    pub fn coordinates(url: String, query: Vec<(&'static str, String)>) -> Self {
        Self {
            mode: AddressMode::Coordinates,
            url,
            query,
        }
    }

    pub fn location_id(url: String, query: Vec<(&'static str, String)>) -> Self {
        Self {
            mode: AddressMode::LocationId,
            url,
            query,
        }
    }
}

/// A source of aggregated weather snapshots for a resolved location.
///
/// The refresh scheduler only sees this seam, so tests can drive it with a
/// scripted source instead of the real client.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_all(
        &self,
        location: &ResolvedLocation,
    ) -> Result<WeatherSnapshot, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_mode_names() {
        assert_eq!(AddressMode::Coordinates.as_str(), "coordinates");
        assert_eq!(AddressMode::LocationId.to_string(), "location-id");
    }

    #[test]
    fn attempt_constructors_tag_their_mode() {
        let by_coords = Attempt::coordinates("http://x/grid".into(), vec![]);
        let by_id = Attempt::location_id("http://x/id".into(), vec![]);
        assert_eq!(by_coords.mode, AddressMode::Coordinates);
        assert_eq!(by_id.mode, AddressMode::LocationId);
    }
}
