//! Configuration for tools that drive the reconstruction engine.
//!
//! Loaded from `tracekit.toml`. Every section is optional; missing keys take
//! their defaults.
//!
//! ```toml
//! [labels]
//! farm = "Grower"
//! brand = "Label owner"
//!
//! [output]
//! pretty = true
//! per_tier_stats = false
//! ```

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tracekit.toml";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("label for tier '{tier}' must not be blank")]
    BlankLabel { tier: &'static str },
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub labels: LabelConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    /// Load `path` when given, else the default file when it exists, else
    /// defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (tier, label) in self.labels.entries() {
            if label.is_some_and(|label| label.trim().is_empty()) {
                return Err(ConfigError::BlankLabel { tier });
            }
        }

        Ok(())
    }
}

///
/// LabelConfig
///
/// Display label overrides, keyed by tier.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
    pub farm: Option<String>,
    pub supplier: Option<String>,
    pub manufacturer: Option<String>,
    pub brand: Option<String>,
    pub unknown: Option<String>,
}

impl LabelConfig {
    /// Overrides as `(tier name, label)` in display order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("FARM", self.farm.as_deref()),
            ("SUPPLIER", self.supplier.as_deref()),
            ("MANUFACTURER", self.manufacturer.as_deref()),
            ("BRAND", self.brand.as_deref()),
            ("UNKNOWN", self.unknown.as_deref()),
        ]
    }
}

///
/// OutputConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub pretty: bool,
    pub per_tier_stats: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            per_tier_stats: true,
        }
    }
}

///
/// TESTS
///
