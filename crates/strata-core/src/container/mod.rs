//! # Strata Service Container
//!
//! Keyed singleton store shared by every bundle of a kernel.
//!
//! Services are bound to a [`Token`], either by type identity
//! ([`Token::of_type`]) or by an explicit string key ([`Token::named`]). A
//! binding is either an eager instance ([`Container::set`]) or an async
//! factory ([`Container::set_factory`]) that runs once, on first resolution;
//! every later [`Container::get`] returns the same `Arc`.
//!
//! Bindings may be overwritten until the container is frozen (the kernel
//! freezes it when it reaches `RUNNING`), unless the container is strict.
pub mod error;
pub mod registry;
pub mod token;

pub use error::ContainerError;
pub use registry::Container;
pub use token::{Service, ServiceKey, Token};

// Test module declaration
#[cfg(test)]
mod tests;
