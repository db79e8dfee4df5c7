//! # Strata Service Container Errors
use thiserror::Error;

use crate::kernel::error::Error as KernelError;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("No service is bound to {token}")]
    UnknownToken { token: String },

    #[error("A service is already bound to {token} and the container is strict")]
    DuplicateToken { token: String },

    #[error("Cannot bind {token}: the container is frozen")]
    Frozen { token: String },

    #[error("Service bound to {token} is a {found}, not a {expected}")]
    TypeMismatch {
        token: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Circular dependency while constructing {token}")]
    CircularDependency { token: String },

    #[error("Factory for {token} failed: {source}")]
    FactoryFailed {
        token: String,
        #[source]
        source: Box<KernelError>,
    },
}
