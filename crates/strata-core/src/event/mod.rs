//! # Strata Event Bus
//!
//! Typed, ordered publish/subscribe between bundles.
//!
//! An event kind is a Rust type implementing [`Event`]. Listeners subscribe to
//! one kind through the [`EventManager`]; [`EventManager::emit`] runs them one
//! after another in subscription order and only returns once the last one has
//! finished. The first listener error stops the emission and is returned to
//! the emitter.
pub mod dispatcher;
pub mod error;
pub mod manager;
pub mod types;

use std::any::Any;
use std::fmt;

use async_trait::async_trait;

use crate::kernel::error::Result;

/// Type for listener identifiers
pub type ListenerId = u64;

/// Core event trait
pub trait Event: Any + fmt::Debug + Send + Sync {
    /// Get the name of this event, used in logs and error messages
    fn name(&self) -> &'static str;

    /// Cast to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Type-erased asynchronous listener stored by the dispatcher
#[async_trait]
pub trait AsyncEventListener: Send + Sync {
    async fn handle(&self, event: &dyn Event) -> Result<()>;
}

/// Re-export important types
pub use dispatcher::{BoxFuture, EventDispatcher};
pub use error::EventSystemError;
pub use manager::EventManager;
pub use types::{KernelAfterInitEvent, KernelBeforeInitEvent, KernelPhaseChangedEvent, KernelShutdownEvent};

// Test module declaration
#[cfg(test)]
mod tests;
