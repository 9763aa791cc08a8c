//! Configuration module for the vfTDC tools
//!
//! Loaded from a TOML file. Every field has a default, so a missing file,
//! section or key falls back to the stock detector values.
//!
//! # Example
//! ```ignore
//! let config = Config::load("config.toml")?;
//! let csv = &config.geometry.unused_pixels_csv;
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::decoder::ByteOrder;
use crate::geometry::Dimensions;
use crate::simulation::SimulationConfig;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

// =============================================================================
// Decoder Configuration
// =============================================================================

/// Decoder settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecoderConfig {
    /// Byte order of capture files
    #[serde(default)]
    pub byte_order: ByteOrder,

    /// Print a per-type summary after decoding
    #[serde(default)]
    pub summary: bool,
}

// =============================================================================
// Geometry Configuration
// =============================================================================

/// Geometry table settings
#[derive(Debug, Clone, Deserialize)]
pub struct GeometryConfig {
    /// Unused-pixel CSV
    #[serde(default = "default_unused_pixels_csv")]
    pub unused_pixels_csv: String,

    /// Detector dimensions
    #[serde(flatten)]
    pub dimensions: Dimensions,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            unused_pixels_csv: default_unused_pixels_csv(),
            dimensions: Dimensions::default(),
        }
    }
}

fn default_unused_pixels_csv() -> String {
    "unusedPixels_parsed.csv".to_string()
}

// =============================================================================
// Tests
// =============================================================================
