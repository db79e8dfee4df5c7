//! # Strata Kernel Configuration
//!
//! [`KernelConfig`] holds the kernel's own parameters together with
//! per-bundle configuration overrides, keyed by bundle name. It can be read
//! from JSON, and from YAML or TOML when the `yaml-config` / `toml-config`
//! features are enabled.
//!
//! ```toml
//! strict_container = false
//! freeze_container_on_run = true
//!
//! [bundles.router]
//! base_path = "/app"
//! ```
pub mod error;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    #[cfg(feature = "yaml-config")]
    Yaml,
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Canonical file extension of this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Pick the format from a file extension; `None` if unknown or disabled.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(ConfigFormat::Json),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            #[cfg(feature = "toml-config")]
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigFormat::Json => "JSON",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "YAML",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "TOML",
        };
        f.write_str(label)
    }
}

/// Kernel parameters and per-bundle overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Reject re-binding a token that is already bound.
    pub strict_container: bool,
    /// Freeze the container when the kernel reaches `RUNNING`.
    pub freeze_container_on_run: bool,
    /// Configuration overrides keyed by bundle name.
    pub bundles: BTreeMap<String, Value>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            strict_container: false,
            freeze_container_on_run: true,
            bundles: BTreeMap::new(),
        }
    }
}

impl KernelConfig {
    /// Read a configuration file, choosing the format by extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let data = tokio::fs::read_to_string(path).await.map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loading {} kernel configuration from {}", format, path.display());
        Self::from_str_with_format(&data, format)
    }

    /// Write this configuration to `path`, choosing the format by extension.
    pub async fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let data = self.to_string_with_format(format)?;
        tokio::fs::write(path, data).await.map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_str_with_format(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let parse_error = |message: String| ConfigError::Parse { format, message };
        match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| parse_error(e.to_string())),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| parse_error(e.to_string())),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| parse_error(e.to_string())),
        }
    }

    pub fn to_string_with_format(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        let serialize_error = |message: String| ConfigError::Serialize { format, message };
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(|e| serialize_error(e.to_string())),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(|e| serialize_error(e.to_string())),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| serialize_error(e.to_string())),
        }
    }

    /// Overrides recorded for the bundle called `bundle`.
    pub fn bundle_overrides(&self, bundle: &str) -> Option<&Value> {
        self.bundles.get(bundle)
    }

    /// Merge `overrides` into whatever is already recorded for `bundle`.
    pub fn set_bundle_overrides(&mut self, bundle: impl Into<String>, overrides: Value) {
        let entry = self
            .bundles
            .entry(bundle.into())
            .or_insert_with(|| Value::Object(Default::default()));
        crate::bundle::merge_values(entry, overrides);
    }
}
