use anyhow::Result;
use std::path::Path;

use crate::{Config, ValidationResult};

/// Application lifecycle: owns the validated configuration for one run
pub struct App {
    config: Config,
    validation: ValidationResult,
}

impl App {
    /// Load and validate configuration, from `config_path` if given or
    /// the default location otherwise
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let (config, validation) = Config::load_validated(config_path)?;
        Ok(Self::with_config(config, validation))
    }

    /// Build an application around an already-loaded configuration
    pub fn with_config(config: Config, validation: ValidationResult) -> Self {
        tracing::info!(
            "Application configured ({} warnings)",
            validation.warnings.len()
        );
        Self {
            config,
            validation,
        }
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Warnings collected while validating the configuration
    pub fn warnings(&self) -> &ValidationResult {
        &self.validation
    }

    pub fn shutdown(&self) {
        tracing::info!("Shutting down application");
    }
}
