//! Marine conditions from the weather.gov gridpoint API.
//!
//! Two dependent requests: `/points/<lat>,<lon>` yields the URL of the raw
//! forecast grid, which carries one time series per layer. The grid URL is
//! resolved fresh for every lookup.

use reqwest::{header, Client};
use serde::Deserialize;
use skycast_core::MarineConfig;
use tracing::instrument;

use crate::http::fetch_json;
use crate::types::{Coordinate, MarineObservation, Measurement, WeatherError};

const GEO_JSON: &str = "application/geo+json";

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: Option<PointsProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointsProperties {
    forecast_grid_data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GridResponse {
    properties: Option<GridProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    wave_height: Option<GridLayer>,
    wave_period: Option<GridLayer>,
    wind_wave_height: Option<GridLayer>,
    wave_direction: Option<GridLayer>,
}

#[derive(Debug, Deserialize)]
struct GridLayer {
    uom: Option<String>,
    #[serde(default)]
    values: Vec<GridValue>,
}

#[derive(Debug, Deserialize)]
struct GridValue {
    value: Option<f64>,
}

impl GridLayer {
    /// First entry of the series; a null value counts as absent.
    fn latest(self) -> Option<Measurement> {
        let value = self.values.into_iter().next()?.value?;
        Some(Measurement {
            value,
            unit: self.uom,
        })
    }
}

impl From<GridResponse> for MarineObservation {
    fn from(grid: GridResponse) -> Self {
        let Some(props) = grid.properties else {
            tracing::warn!("Marine grid has no properties");
            return MarineObservation::default();
        };
        MarineObservation {
            wave_height: props.wave_height.and_then(GridLayer::latest),
            wave_period: props.wave_period.and_then(GridLayer::latest),
            wind_wave_height: props.wind_wave_height.and_then(GridLayer::latest),
            wave_direction: props.wave_direction.and_then(GridLayer::latest),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarineClient {
    client: Client,
    config: MarineConfig,
}

impl MarineClient {
    pub fn new(client: Client, config: MarineConfig) -> Self {
        Self { client, config }
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header(header::USER_AGENT, self.config.user_agent.as_str())
            .header(header::ACCEPT, GEO_JSON)
    }

    /// Stage 1: resolve the forecast grid URL for a coordinate.
    #[instrument(skip(self), level = "debug")]
    pub async fn grid_endpoint(&self, coordinate: Coordinate) -> Result<String, WeatherError> {
        let url = format!(
            "{}/{},{}",
            self.config.points_url.trim_end_matches('/'),
            coordinate.latitude,
            coordinate.longitude
        );
        tracing::debug!("Fetching grid endpoint from {}", url);

        let points: PointsResponse = fetch_json(self.request(&url), "grid endpoint").await?;
        points
            .properties
            .and_then(|p| p.forecast_grid_data)
            .ok_or_else(|| {
                WeatherError::MalformedData("points: missing properties.forecastGridData".into())
            })
    }

    /// Stage 2: fetch the grid and take the latest value of each wave layer.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_grid(&self, grid_url: &str) -> Result<MarineObservation, WeatherError> {
        tracing::debug!("Fetching marine data from {}", grid_url);
        let grid: GridResponse = fetch_json(self.request(grid_url), "marine grid").await?;
        Ok(MarineObservation::from(grid))
    }

    /// Both stages for one coordinate
    pub async fn fetch_observation(
        &self,
        coordinate: Coordinate,
    ) -> Result<MarineObservation, WeatherError> {
        let grid_url = self.grid_endpoint(coordinate).await?;
        self.fetch_grid(&grid_url).await
    }
}
