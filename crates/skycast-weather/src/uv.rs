//! UV index from OpenUV.

use reqwest::Client;
use serde::Deserialize;
use skycast_core::UvConfig;
use tracing::instrument;

use crate::http::fetch_json;
use crate::types::{Coordinate, WeatherError};

#[derive(Debug, Deserialize)]
struct UvResponse {
    result: Option<UvResult>,
}

#[derive(Debug, Deserialize)]
struct UvResult {
    uv: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct UvClient {
    client: Client,
    config: UvConfig,
}

impl UvClient {
    pub fn new(client: Client, config: UvConfig) -> Self {
        Self { client, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_uv_index(&self, coordinate: Coordinate) -> Result<f64, WeatherError> {
        let lat = coordinate.latitude.to_string();
        let lng = coordinate.longitude.to_string();
        let request = self
            .client
            .get(&self.config.url)
            .header("x-access-token", self.config.api_key.as_deref().unwrap_or_default())
            .query(&[("lat", lat.as_str()), ("lng", lng.as_str())]);

        let response: UvResponse = fetch_json(request, "uv index").await?;
        response
            .result
            .and_then(|r| r.uv)
            .ok_or_else(|| WeatherError::MalformedData("Invalid UV data received from OpenUV".into()))
    }
}
