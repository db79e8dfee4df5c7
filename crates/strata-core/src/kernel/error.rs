//! # Strata Kernel Errors
//!
//! Defines the crate-wide [`Error`] type.
//!
//! Each subsystem owns a typed error enum ([`ContainerError`], [`BundleError`],
//! [`RouterError`], [`EventSystemError`], [`ConfigError`]); they all convert
//! into [`Error`] so hooks and listeners can use `?` freely. Failures raised
//! while the kernel drives a phase are wrapped in
//! [`Error::BundleLifecycle`], which names the phase and the offending bundle.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::bundle::error::{BundleError, ValidationError};
use crate::config::error::ConfigError;
use crate::container::error::ContainerError;
use crate::event::error::EventSystemError;
use crate::kernel::phase::KernelPhase;
use crate::router::error::RouterError;

/// Custom error type for the Strata kernel
#[derive(Debug, ThisError)]
pub enum Error {
    /// A bundle's merged configuration was rejected by its `validate` hook.
    #[error("Invalid configuration for bundle '{bundle}': {source}")]
    Configuration {
        bundle: String,
        #[source]
        source: ValidationError,
    },

    /// A bundle hook failed while the kernel was driving `phase`.
    #[error("Bundle '{bundle}' failed during {phase}: {source}")]
    BundleLifecycle {
        phase: KernelPhase,
        bundle: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Bundle '{bundle}' is already registered")]
    DuplicateBundle { bundle: String },

    #[error("Kernel already left NOT_STARTED (current phase: {phase})")]
    AlreadyStarted { phase: KernelPhase },

    #[error("Kernel is not running (current phase: {phase})")]
    NotRunning { phase: KernelPhase },

    #[error("Invalid kernel phase transition {from} -> {to}")]
    InvalidPhaseTransition { from: KernelPhase, to: KernelPhase },

    /// Specific, typed service container error
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Specific, typed bundle error
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// Specific, typed router error
    #[error("Router error: {0}")]
    Router(#[from] RouterError),

    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    /// Follows `BundleLifecycle` and listener wrappers down to the error that
    /// actually stopped the kernel.
    pub fn root(&self) -> &Error {
        match self {
            Error::BundleLifecycle { source, .. } => source.root(),
            Error::EventSystem(EventSystemError::ListenerFailed { source, .. }) => source.root(),
            other => other,
        }
    }
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
