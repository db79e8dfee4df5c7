//! # Strata Bundle Errors
//!
//! [`ValidationError`] is what a bundle's `validate` hook returns for a bad
//! configuration; the kernel wraps it in `Error::Configuration` together with
//! the bundle name. [`BundleError`] covers misuse of a bundle's configuration
//! slot, most importantly mutation after the allowed phase window.
use thiserror::Error;

use crate::kernel::phase::KernelPhase;

/// A bundle-declared invariant on its configuration does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{}", .field.as_deref().map(|f| format!("{}: ", f)).unwrap_or_default(), .message)]
pub struct ValidationError {
    /// Offending configuration key, when there is a single one
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { field: None, message: message.into() }
    }

    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: Some(field.into()), message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum BundleError {
    /// A guarded mutation was attempted once the kernel passed `INITIALISING`.
    #[error("Cannot {operation} on bundle '{bundle}' during {phase}; do it before the bundle is initialised")]
    Stage {
        bundle: String,
        operation: String,
        phase: KernelPhase,
    },

    #[error("Failed to merge configuration overrides into bundle '{bundle}': {source}")]
    ConfigMerge {
        bundle: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Bundle '{bundle}' is already registered with a kernel")]
    AlreadyAttached { bundle: String },
}
