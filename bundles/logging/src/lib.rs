//! Strata bundle that installs the process-wide `tracing` subscriber and
//! routes `log` records into it.
//!
//! Register it first so the other bundles' `prepare` and `init` output is
//! captured:
//!
//! ```ignore
//! let kernel = Kernel::builder()
//!     .bundle(Arc::new(LoggingBundle::new()))
//!     .bundle(Arc::new(RouterBundle::new()))
//!     .build()
//!     .await?;
//! ```
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strata_core::bundle::{Bundle, BundleConfig, ValidationError};
use strata_core::container::Token;
use strata_core::kernel::context::KernelContext;
use strata_core::kernel::error::Result as KernelResult;
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub const LOGGING_BUNDLE_NAME: &str = "logging";

/// The logging bundle's effective configuration, registered during `prepare`.
pub const LOGGING_CONFIG_TOKEN: Token<LoggingConfig> = Token::from_static("LOGGING_CONFIG");

/// Output layout of the fmt subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `strata_core=debug,warn`.
    pub level: String,
    pub format: LogFormat,
    /// Print the record target (module path).
    pub with_target: bool,
    /// Let `RUST_LOG` take precedence over `level`.
    pub respect_env: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_target: true,
            respect_env: true,
        }
    }
}

impl LoggingConfig {
    fn env_filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        if self.respect_env {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return Ok(filter);
            }
        }
        EnvFilter::try_new(&self.level)
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = tracing_subscriber::fmt::layer()
            .with_target(self.with_target)
            .with_writer(std::io::stderr);
        match self.format {
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Json => layer.json().boxed(),
        }
    }
}

/// Installs the global `tracing` subscriber during `prepare`.
///
/// Only one global subscriber can exist per process. If one is already set
/// (by an earlier kernel or by the host program) the bundle logs a warning
/// and keeps going.
#[derive(Debug)]
pub struct LoggingBundle {
    config: BundleConfig<LoggingConfig>,
    installed: AtomicBool,
}

impl Default for LoggingBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBundle {
    pub fn new() -> Self {
        Self::with_config(LoggingConfig::default())
    }

    pub fn with_config(config: LoggingConfig) -> Self {
        Self {
            config: BundleConfig::new(config),
            installed: AtomicBool::new(false),
        }
    }

    /// Whether this bundle installed the process-wide subscriber.
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }

    /// Install the subscriber, then bridge `log` into it. Either step may
    /// find the slot taken; neither is fatal.
    fn install(&self, config: &LoggingConfig) {
        let filter = match config.env_filter() {
            Ok(filter) => filter,
            Err(e) => {
                log::warn!("Invalid log filter '{}', logging not installed: {}", config.level, e);
                return;
            }
        };
        let subscriber = Registry::default().with(config.fmt_layer()).with(filter);
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            log::warn!("Global tracing subscriber already installed, keeping it: {}", e);
            return;
        }
        self.installed.store(true, Ordering::Release);
        tracing::info!(level = %config.level, format = ?config.format, "Logging initialized");

        if let Err(e) = LogTracer::init() {
            tracing::warn!("A `log` logger is already set, `log` records bypass tracing: {}", e);
        }
    }
}

#[async_trait]
impl Bundle for LoggingBundle {
    type Config = LoggingConfig;

    fn name(&self) -> &'static str {
        LOGGING_BUNDLE_NAME
    }

    fn config(&self) -> &BundleConfig<LoggingConfig> {
        &self.config
    }

    async fn validate(&self, config: &LoggingConfig) -> Result<(), ValidationError> {
        EnvFilter::try_new(&config.level)
            .map(|_| ())
            .map_err(|e| ValidationError::for_field("level", e.to_string()))
    }

    async fn prepare(&self, ctx: &KernelContext) -> KernelResult<()> {
        let config = self.config.get().await;
        self.install(&config);
        ctx.container().set(&LOGGING_CONFIG_TOKEN, config)?;
        Ok(())
    }

    async fn shutdown(&self, _ctx: &KernelContext) -> KernelResult<()> {
        log::info!("Shutting down logging bundle");
        Ok(())
    }
}
