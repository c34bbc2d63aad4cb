//! Engine configuration.
//!
//! A small TOML file; every field has a default, so an empty file (or no file)
//! is a valid configuration.
//!
//! ```toml
//! [periodontal]
//! deep_pocket_mm = 4
//! surgery_pocket_mm = 6
//!
//! [logging]
//! filter = "info"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Pocket depth thresholds for periodontal plan generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PeriodontalThresholds {
    /// Pockets at or beyond this depth call for SRP
    pub deep_pocket_mm: u8,
    /// Pockets at or beyond this depth after SRP call for surgery
    pub surgery_pocket_mm: u8,
}

impl Default for PeriodontalThresholds {
    fn default() -> Self {
        Self {
            deep_pocket_mm: 4,
            surgery_pocket_mm: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub periodontal: PeriodontalThresholds,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.periodontal;
        if p.deep_pocket_mm == 0 {
            return Err(ConfigError::Invalid("deep_pocket_mm must be at least 1".into()));
        }
        if p.surgery_pocket_mm < p.deep_pocket_mm {
            return Err(ConfigError::Invalid(format!(
                "surgery_pocket_mm ({}) is below deep_pocket_mm ({})",
                p.surgery_pocket_mm, p.deep_pocket_mm
            )));
        }
        Ok(())
    }
}
