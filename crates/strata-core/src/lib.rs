//! # Strata Core
//!
//! Composition kernel for applications built out of bundles: a typed service
//! container, an async event bus, a phased lifecycle that drives every bundle
//! in registration order, layered bundle configuration, and a routing
//! registry shipped as a kernel-integrated bundle.
pub mod bundle;
pub mod config;
pub mod container;
pub mod event;
pub mod kernel;
pub mod router;

// Re-export key public types/traits for easier use by the binary and bundles
pub use bundle::{Bundle, BundleConfig, BundleError, ValidationError};
pub use config::KernelConfig;
pub use container::{Container, ContainerError, Service, Token};
pub use event::{Event, EventManager};
pub use kernel::error::Error as KernelError;
pub use kernel::{Kernel, KernelBuilder, KernelContext, KernelPhase};
pub use router::{MemoryRouter, Route, RouteDefinition, RouteGenerationProps, Router, RouterBundle, RouterError};

#[cfg(test)]
mod tests;
