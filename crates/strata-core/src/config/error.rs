use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigFormat;

/// Errors raised while loading or writing a [`KernelConfig`](crate::config::KernelConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on configuration file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported configuration format for '{}'", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to parse {format} configuration: {message}")]
    Parse { format: ConfigFormat, message: String },

    #[error("Failed to serialize configuration to {format}: {message}")]
    Serialize { format: ConfigFormat, message: String },
}
