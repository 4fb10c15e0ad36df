//! Application context: every provider client, constructed once at startup.

use std::sync::Arc;

use skycast_core::Config;
use skycast_weather::{
    build_client, ConfiguredLocator, DeviceLocator, ForecastClient, GeocodingClient, MarineClient,
    PhotoClient, UvClient, WeatherError,
};

/// Clients share one HTTP connection pool.
#[derive(Clone)]
pub struct AppContext {
    pub geocoder: GeocodingClient,
    pub forecast: ForecastClient,
    pub marine: MarineClient,
    pub photos: PhotoClient,
    pub uv: UvClient,
    pub locator: Arc<dyn DeviceLocator>,
    /// Base URL for condition icons
    pub icon_url: String,
}

impl AppContext {
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let client = build_client()?;
        tracing::debug!("Building application context");

        Ok(Self {
            geocoder: GeocodingClient::new(client.clone(), config.openweather.clone()),
            forecast: ForecastClient::new(client.clone(), config.openweather.clone()),
            marine: MarineClient::new(client.clone(), config.marine.clone()),
            photos: PhotoClient::new(client.clone(), config.photos.clone()),
            uv: UvClient::new(client, config.uv.clone()),
            locator: Arc::new(ConfiguredLocator::new(config.device.clone())),
            icon_url: config.openweather.icon_url.clone(),
        })
    }

    /// Replace the device locator
    pub fn with_locator(mut self, locator: Arc<dyn DeviceLocator>) -> Self {
        self.locator = locator;
        self
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("icon_url", &self.icon_url)
            .field("uv_enabled", &self.uv.is_enabled())
            .field("locator_available", &self.locator.is_available())
            .finish_non_exhaustive()
    }
}
