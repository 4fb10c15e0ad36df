use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use skycast_core::NetworkError;

/// WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Validate a provider- or device-supplied position.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(WeatherError::MalformedData(format!(
                "latitude out of range: {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::MalformedData(format!(
                "longitude out of range: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A coordinate together with the name to display for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlace {
    pub coordinate: Coordinate,
    pub name: String,
}

/// One forecast record, in provider units (kelvin, m/s)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub timestamp: NaiveDateTime,
    pub temperature_k: f64,
    pub feels_like_k: f64,
    pub wind_speed_ms: f64,
    pub humidity: u8,
    pub description: String,
    pub icon: String,
}

impl ForecastPeriod {
    pub fn calendar_day(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// At most one period per calendar day, in provider order.
/// Only built by [`crate::first_per_day`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub(crate) days: Vec<ForecastPeriod>,
}

impl DailyForecast {
    /// Entry rendered as current conditions
    pub fn current(&self) -> Option<&ForecastPeriod> {
        self.days.first()
    }

    /// Entries rendered as forecast cards
    pub fn upcoming(&self) -> &[ForecastPeriod] {
        self.days.get(1..).unwrap_or_default()
    }

    pub fn days(&self) -> &[ForecastPeriod] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Latest value of one grid layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    /// Provider unit code, e.g. `wmoUnit:m`
    pub unit: Option<String>,
}

impl Measurement {
    pub fn is_meters(&self) -> bool {
        self.unit.as_deref() == Some("wmoUnit:m")
    }
}

/// Current marine conditions; `None` renders as "N/A"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarineObservation {
    pub wave_height: Option<Measurement>,
    pub wave_period: Option<Measurement>,
    pub wind_wave_height: Option<Measurement>,
    pub wave_direction: Option<Measurement>,
}

/// Device location errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location request cancelled")]
    Cancelled,
    #[error("Location error: {0}")]
    Other(String),
}

/// Errors from every provider call
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("No results: {0}")]
    EmptyResult(String),
    #[error("Malformed response: {0}")]
    MalformedData(String),
    #[error("Device location error: {0}")]
    DeviceCapability(#[from] LocationError),
}

impl WeatherError {
    pub fn is_network(&self) -> bool {
        matches!(self, WeatherError::Network(_))
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Network(e) => e.user_message(),
            WeatherError::EmptyResult(_) => "Nothing was found. Check the spelling and try again.",
            WeatherError::MalformedData(_) => "Received an unexpected response. Please try again.",
            WeatherError::DeviceCapability(LocationError::PermissionDenied) => {
                "Location access was denied."
            }
            WeatherError::DeviceCapability(_) => "Your location is unavailable.",
        }
    }
}
