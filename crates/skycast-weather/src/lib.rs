//! Weather data for Skycast
//!
//! Resolves places through OpenWeather geocoding, fetches the 5-day
//! forecast, marine grid layers from weather.gov, a UV index from OpenUV
//! and background photos from Pexels.

pub mod background;
pub mod forecast;
pub mod geocode;
mod http;
pub mod location;
pub mod marine;
pub mod types;
pub mod units;
pub mod uv;

pub use background::PhotoClient;
pub use forecast::{first_per_day, ForecastClient};
pub use geocode::GeocodingClient;
pub use http::build_client;
pub use location::{locate_with_cancel, ConfiguredLocator, DeviceLocator};
pub use marine::MarineClient;
pub use types::*;
pub use uv::UvClient;
