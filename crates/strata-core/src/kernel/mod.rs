//! # Strata Kernel
//!
//! The `kernel` module is the orchestrator of a Strata application. It owns
//! the service [`Container`](crate::container::Container), the
//! [`EventManager`](crate::event::EventManager) and the ordered list of
//! bundles, and drives the bundles through the lifecycle phases.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Bootstrapping**: [`KernelBuilder`] registers bundles (merging their
//!   configuration overrides) and [`Kernel::init`] runs the startup phases.
//! - **Phases**: [`KernelPhase`] only moves forward, one step at a time; the
//!   shared [`PhaseHandle`] lets bundles gate their own mutations.
//! - **Context**: [`KernelContext`] is what hooks and bundles see of the kernel.
//! - **Error Handling**: the crate-wide [`Error`] type and `Result` alias.
pub mod bootstrap;
pub mod constants;
pub mod context;
pub mod error;
pub mod phase;

pub use bootstrap::{Kernel, KernelBuilder};
pub use context::KernelContext;
pub use error::{Error, Result};
pub use phase::{KernelPhase, PhaseHandle};

// Test module declaration
#[cfg(test)]
mod tests;
