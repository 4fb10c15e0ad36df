//! Location resolution: city name, ZIP code or device position to a
//! coordinate plus display name, via OpenWeather geocoding.
//!
//! Only the first match is ever used.

use reqwest::Client;
use serde::Deserialize;
use skycast_core::OpenWeatherConfig;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::http::fetch_json;
use crate::location::{locate_with_cancel, DeviceLocator};
use crate::types::{Coordinate, ResolvedPlace, WeatherError};

/// One entry of the `/direct` and `/reverse` arrays
#[derive(Debug, Deserialize)]
struct GeoMatch {
    name: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Current-weather payload; only the embedded position is used
#[derive(Debug, Deserialize)]
struct ZipWeather {
    coord: Option<ZipCoord>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ZipCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Client,
    config: OpenWeatherConfig,
}

impl GeocodingClient {
    pub fn new(client: Client, config: OpenWeatherConfig) -> Self {
        Self { client, config }
    }

    /// Resolve a free-text city name. Fails with `EmptyResult` when the
    /// provider has no match.
    #[instrument(skip(self), level = "info")]
    pub async fn resolve_city(&self, name: &str) -> Result<ResolvedPlace, WeatherError> {
        let url = format!("{}/direct", self.config.geocode_url.trim_end_matches('/'));
        tracing::debug!("Fetching city coordinates from {}", url);

        let request = self.client.get(&url).query(&[
            ("q", name),
            ("limit", "1"),
            ("appid", self.config.api_key.as_str()),
        ]);
        let matches: Vec<GeoMatch> = fetch_json(request, "geocoding").await?;

        let first = matches
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::EmptyResult(format!("no coordinates found for {name}")))?;
        let place = Self::place_from_match(first)?;

        tracing::info!(
            "Coordinates for {}: {} ({})",
            name,
            place.coordinate,
            place.name
        );
        Ok(place)
    }

    /// Resolve a ZIP code through the current-weather endpoint.
    #[instrument(skip(self), level = "info")]
    pub async fn resolve_zip(&self, zip: &str) -> Result<ResolvedPlace, WeatherError> {
        tracing::debug!("Fetching weather by ZIP from {}", self.config.weather_url);

        let request = self.client.get(&self.config.weather_url).query(&[
            ("zip", zip),
            ("appid", self.config.api_key.as_str()),
        ]);
        let body: ZipWeather = fetch_json(request, "zip lookup").await?;

        let coord = body
            .coord
            .ok_or_else(|| WeatherError::MalformedData("zip lookup: missing coord".into()))?;
        let name = body
            .name
            .ok_or_else(|| WeatherError::MalformedData("zip lookup: missing name".into()))?;

        Ok(ResolvedPlace {
            coordinate: Coordinate::new(coord.lat, coord.lon)?,
            name,
        })
    }

    /// Reverse geocode a known coordinate to obtain its display name.
    /// The coordinate itself is kept as given.
    #[instrument(skip(self), level = "info")]
    pub async fn resolve_coordinate(
        &self,
        coordinate: Coordinate,
    ) -> Result<ResolvedPlace, WeatherError> {
        let url = format!("{}/reverse", self.config.geocode_url.trim_end_matches('/'));
        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();

        let request = self.client.get(&url).query(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("limit", "1"),
            ("appid", self.config.api_key.as_str()),
        ]);
        let matches: Vec<GeoMatch> = fetch_json(request, "reverse geocoding").await?;

        let name = matches
            .into_iter()
            .next()
            .and_then(|m| m.name)
            .ok_or_else(|| {
                WeatherError::EmptyResult(format!("no place name found for {coordinate}"))
            })?;

        Ok(ResolvedPlace { coordinate, name })
    }

    /// Ask the device for its position, then reverse geocode it.
    /// Device failures come back as `DeviceCapability`.
    pub async fn resolve_device(
        &self,
        locator: &dyn DeviceLocator,
        cancel: &CancellationToken,
    ) -> Result<ResolvedPlace, WeatherError> {
        let coordinate = locate_with_cancel(locator, cancel).await?;
        tracing::info!("Device coordinates: {}", coordinate);
        self.resolve_coordinate(coordinate).await
    }

    fn place_from_match(m: GeoMatch) -> Result<ResolvedPlace, WeatherError> {
        match (m.lat, m.lon, m.name) {
            (Some(lat), Some(lon), Some(name)) => Ok(ResolvedPlace {
                coordinate: Coordinate::new(lat, lon)?,
                name,
            }),
            _ => Err(WeatherError::MalformedData(
                "geocoding match is missing lat, lon or name".into(),
            )),
        }
    }
}
