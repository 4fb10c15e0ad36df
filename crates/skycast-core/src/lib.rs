pub mod app;
pub mod config;
pub mod error;
pub mod lookup_state;

pub use app::App;
pub use config::{
    Config, DevicePermission, DeviceConfig, MarineConfig, OpenWeatherConfig, PhotosConfig,
    UvConfig, ValidationResult,
};
pub use error::{ConfigError, NetworkError, ReqwestErrorExt};
pub use lookup_state::{RequestToken, RequestTokens, SubmissionState};

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Skycast core initialized");
    Ok(())
}
