//! OpenWeather 5 day / 3 hour forecast, reduced to one period per day.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use skycast_core::OpenWeatherConfig;
use tracing::instrument;

use crate::http::fetch_json;
use crate::types::{Coordinate, DailyForecast, ForecastPeriod, WeatherError};

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Option<Vec<ApiPeriod>>,
}

#[derive(Debug, Deserialize)]
struct ApiPeriod {
    dt_txt: String,
    main: ApiMain,
    wind: ApiWind,
    #[serde(default)]
    weather: Vec<ApiCondition>,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct ApiWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    description: String,
    icon: String,
}

impl TryFrom<ApiPeriod> for ForecastPeriod {
    type Error = WeatherError;

    fn try_from(api: ApiPeriod) -> Result<Self, Self::Error> {
        let timestamp = NaiveDateTime::parse_from_str(&api.dt_txt, DT_TXT_FORMAT).map_err(|e| {
            WeatherError::MalformedData(format!("bad dt_txt {:?}: {}", api.dt_txt, e))
        })?;
        let condition = api.weather.into_iter().next().ok_or_else(|| {
            WeatherError::MalformedData(format!("period {} has no weather entry", api.dt_txt))
        })?;

        Ok(ForecastPeriod {
            timestamp,
            temperature_k: api.main.temp,
            feels_like_k: api.main.feels_like,
            wind_speed_ms: api.wind.speed,
            humidity: api.main.humidity,
            description: condition.description,
            icon: condition.icon,
        })
    }
}

/// Keep the first period seen for each calendar day, preserving order.
pub fn first_per_day(periods: Vec<ForecastPeriod>) -> DailyForecast {
    let mut seen = HashSet::new();
    let days = periods
        .into_iter()
        .filter(|p| seen.insert(p.calendar_day()))
        .collect();
    DailyForecast { days }
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    config: OpenWeatherConfig,
}

impl ForecastClient {
    pub fn new(client: Client, config: OpenWeatherConfig) -> Self {
        Self { client, config }
    }

    /// Fetch the raw sub-daily periods, in provider order
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_periods(
        &self,
        coordinate: Coordinate,
    ) -> Result<Vec<ForecastPeriod>, WeatherError> {
        tracing::debug!("Fetching forecast from {}", self.config.forecast_url);

        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();
        let request = self.client.get(&self.config.forecast_url).query(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("appid", self.config.api_key.as_str()),
        ]);

        let response: ForecastResponse = fetch_json(request, "forecast").await?;
        let list = response
            .list
            .ok_or_else(|| WeatherError::MalformedData("forecast: missing list".into()))?;
        if list.is_empty() {
            return Err(WeatherError::EmptyResult(format!(
                "no forecast periods for {coordinate}"
            )));
        }

        list.into_iter().map(ForecastPeriod::try_from).collect()
    }

    /// Fetch the forecast and reduce it to one entry per calendar day
    pub async fn fetch_daily(&self, coordinate: Coordinate) -> Result<DailyForecast, WeatherError> {
        let periods = self.fetch_periods(coordinate).await?;
        let total = periods.len();
        let daily = first_per_day(periods);
        tracing::info!("Reduced {} forecast periods to {} days", total, daily.len());
        Ok(daily)
    }
}
