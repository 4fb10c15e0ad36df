//! Device geolocation.
//!
//! A locator is an async source of the device position. Callers race it
//! against a cancellation token instead of handing it callbacks.

use async_trait::async_trait;
use skycast_core::{DeviceConfig, DevicePermission};
use tokio_util::sync::CancellationToken;

use crate::types::{Coordinate, LocationError};

#[async_trait]
pub trait DeviceLocator: Send + Sync {
    /// Current device position
    async fn locate(&self) -> Result<Coordinate, LocationError>;

    /// Whether a position can be requested at all
    fn is_available(&self) -> bool;
}

/// Run `locator` until it answers or `cancel` fires.
pub async fn locate_with_cancel(
    locator: &dyn DeviceLocator,
    cancel: &CancellationToken,
) -> Result<Coordinate, LocationError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LocationError::Cancelled),
        result = locator.locate() => result,
    }
}

/// Locator backed by the `[device]` config section.
#[derive(Debug, Clone)]
pub struct ConfiguredLocator {
    config: DeviceConfig,
}

impl ConfiguredLocator {
    pub fn new(config: DeviceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DeviceLocator for ConfiguredLocator {
    async fn locate(&self) -> Result<Coordinate, LocationError> {
        if self.config.permission == DevicePermission::Denied {
            return Err(LocationError::PermissionDenied);
        }

        let (Some(lat), Some(lon)) = (self.config.latitude, self.config.longitude) else {
            return Err(LocationError::ServiceUnavailable);
        };

        Coordinate::new(lat, lon).map_err(|e| LocationError::Other(e.to_string()))
    }

    fn is_available(&self) -> bool {
        self.config.permission == DevicePermission::Granted
            && self.config.latitude.is_some()
            && self.config.longitude.is_some()
    }
}
