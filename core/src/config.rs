//! Widget configuration
//!
//! [`BarConfig`] is a plain serde type describing the widget's footprint,
//! loadable from a TOML file. Missing fields fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors during config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read bar config {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Size of the progress bar widget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    /// Widget width in pixels
    pub width: f32,
    /// Widget height in pixels
    pub height: f32,
}

impl Default for BarConfig {
    fn default() -> Self {
        // Matches the built-in texture dimensions
        Self {
            width: 200.0,
            height: 20.0,
        }
    }
}

impl BarConfig {
    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }
}
