use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Prefix for environment overrides, e.g. `SKYCAST__OPENWEATHER__API_KEY`.
const ENV_PREFIX: &str = "SKYCAST";
const ENV_SEPARATOR: &str = "__";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// OpenWeather forecast, ZIP lookup and geocoding endpoints
    #[serde(default)]
    pub openweather: OpenWeatherConfig,

    /// weather.gov grid endpoints used for marine conditions
    #[serde(default)]
    pub marine: MarineConfig,

    /// Stock-photo search used for the page background
    #[serde(default)]
    pub photos: PhotosConfig,

    /// OpenUV index lookup (skipped when no key is set)
    #[serde(default)]
    pub uv: UvConfig,

    /// Position reported by the device locator
    #[serde(default)]
    pub device: DeviceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWeatherConfig {
    /// Sent as the `appid` query parameter
    pub api_key: String,
    /// 5 day / 3 hour forecast endpoint
    pub forecast_url: String,
    /// Current-weather endpoint, used for ZIP lookups
    pub weather_url: String,
    /// Geocoding base, `/direct` and `/reverse` are appended
    pub geocode_url: String,
    /// Base for condition icons, `/<code>.png` is appended
    pub icon_url: String,
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            forecast_url: "https://api.openweathermap.org/data/2.5/forecast".to_string(),
            weather_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            geocode_url: "https://api.openweathermap.org/geo/1.0".to_string(),
            icon_url: "https://openweathermap.org/img/wn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarineConfig {
    /// `/<lat>,<lon>` is appended
    pub points_url: String,
    /// weather.gov rejects requests without an identifying User-Agent
    pub user_agent: String,
}

impl Default for MarineConfig {
    fn default() -> Self {
        Self {
            points_url: "https://api.weather.gov/points".to_string(),
            user_agent: "skycast/0.1 (contact@skycast.invalid)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotosConfig {
    /// Sent verbatim in the Authorization header
    pub api_key: String,
    pub search_url: String,
    pub per_page: u32,
    /// Background shown before any search completes
    pub default_background: String,
    /// Query issued once at startup
    pub initial_query: String,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            search_url: "https://api.pexels.com/v1/search".to_string(),
            per_page: 14,
            default_background:
                "https://images.pexels.com/photos/1118873/pexels-photo-1118873.jpeg".to_string(),
            initial_query: "weather".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UvConfig {
    /// Sent in the `x-access-token` header
    pub api_key: Option<String>,
    pub url: String,
}

impl Default for UvConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: "https://api.openuv.io/api/v1/uv".to_string(),
        }
    }
}

impl UvConfig {
    /// The UV lookup only runs with a non-empty key.
    pub fn is_enabled(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Whether the user allowed location access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DevicePermission {
    #[default]
    Granted,
    Denied,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub permission: DevicePermission,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skycast")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            openweather: OpenWeatherConfig::default(),
            marine: MarineConfig::default(),
            photos: PhotosConfig::default(),
            uv: UvConfig::default(),
            device: DeviceConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("Writing default config to {}", config_path.display());
            Self::default().save_to(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a TOML file, then apply `SKYCAST__*` environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let settings = ::config::Config::builder()
            .add_source(
                ::config::File::from(path.to_path_buf())
                    .format(::config::FileFormat::Toml)
                    .required(true),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        let urls = [
            (&self.openweather.forecast_url, "openweather.forecast_url"),
            (&self.openweather.weather_url, "openweather.weather_url"),
            (&self.openweather.geocode_url, "openweather.geocode_url"),
            (&self.openweather.icon_url, "openweather.icon_url"),
            (&self.marine.points_url, "marine.points_url"),
            (&self.photos.search_url, "photos.search_url"),
            (&self.photos.default_background, "photos.default_background"),
            (&self.uv.url, "uv.url"),
        ];
        for (url, field) in urls {
            self.validate_url(url, field, &mut result);
        }

        if self.openweather.api_key.trim().is_empty() {
            result.add_warning(
                "openweather.api_key",
                "No OpenWeather key - lookups will be rejected by the provider",
            );
        }

        if self.marine.user_agent.trim().is_empty() {
            result.add_error(
                "marine.user_agent",
                "weather.gov requires an identifying User-Agent",
            );
        }

        if self.photos.api_key.trim().is_empty() {
            result.add_warning(
                "photos.api_key",
                "No photo key - the default background will be kept",
            );
        }

        if self.photos.per_page == 0 || self.photos.per_page > 80 {
            result.add_error("photos.per_page", "Must be between 1 and 80");
        }

        if self.photos.initial_query.trim().is_empty() {
            result.add_warning("photos.initial_query", "Startup background search disabled");
        }

        match (self.device.latitude, self.device.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    result.add_error("device.latitude", "Must be between -90 and 90");
                }
                if !(-180.0..=180.0).contains(&lon) {
                    result.add_error("device.longitude", "Must be between -180 and 180");
                }
            }
            (None, None) => {
                if self.device.permission == DevicePermission::Granted {
                    result.add_warning(
                        "device",
                        "No device position configured - geolocation will be unavailable",
                    );
                }
            }
            _ => result.add_error("device", "Latitude and longitude must be set together"),
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the given file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}
