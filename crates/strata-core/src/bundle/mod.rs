//! # Strata Bundles
//!
//! A bundle is a self-contained unit of configuration and lifecycle hooks
//! composed into a [`Kernel`](crate::kernel::Kernel).
//!
//! The kernel calls the hooks of all bundles, in registration order, phase by
//! phase:
//!
//! | Kernel phase   | Hook                                  |
//! |----------------|---------------------------------------|
//! | `PREPARING`    | [`Bundle::validate`], [`Bundle::hook`], [`Bundle::prepare`] |
//! | `INITIALISING` | [`Bundle::init`]                      |
//! | `SHUTTING_DOWN`| [`Bundle::shutdown`] (reverse order)  |
//!
//! Registration order is the dependency order: a bundle must be registered
//! after every bundle whose services it looks up.
pub mod config;
pub mod error;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::kernel::context::KernelContext;
use crate::kernel::error::Result;

pub use config::{BundleConfig, BundleConfigType, merge_values};
pub use error::{BundleError, ValidationError};

/// Core trait that all bundles must implement
#[async_trait]
pub trait Bundle: Send + Sync + 'static {
    /// Typed configuration of this bundle
    type Config: BundleConfigType;

    /// Unique name, also the key of this bundle's overrides in `KernelConfig`
    fn name(&self) -> &'static str;

    /// Configuration slot holding the defaults and the effective value
    fn config(&self) -> &BundleConfig<Self::Config>;

    /// Configuration before any override is merged. The kernel makes this
    /// the merge base of [`Bundle::config`] when the bundle is registered.
    fn default_config(&self) -> Self::Config {
        self.config().defaults()
    }

    /// Check the merged configuration. Must not touch shared state.
    async fn validate(&self, _config: &Self::Config) -> std::result::Result<(), ValidationError> {
        Ok(())
    }

    /// Wire event listeners before any bundle prepares its resources.
    async fn hook(&self, _ctx: &KernelContext) -> Result<()> {
        Ok(())
    }

    /// Set up resources and register services.
    async fn prepare(&self, _ctx: &KernelContext) -> Result<()> {
        Ok(())
    }

    /// Cross-bundle wiring; services of earlier bundles are available.
    async fn init(&self, _ctx: &KernelContext) -> Result<()> {
        Ok(())
    }

    /// Release resources. Runs in reverse registration order.
    async fn shutdown(&self, _ctx: &KernelContext) -> Result<()> {
        Ok(())
    }
}

/// Lifecycle hooks the kernel drives through [`DynBundle::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleHook {
    Hook,
    Prepare,
    Init,
    Shutdown,
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LifecycleHook::Hook => "hook",
            LifecycleHook::Prepare => "prepare",
            LifecycleHook::Init => "init",
            LifecycleHook::Shutdown => "shutdown",
        };
        f.write_str(label)
    }
}

/// Object-safe view of a [`Bundle`], implemented for every bundle.
///
/// The kernel stores bundles as `Arc<dyn DynBundle>` so bundles with
/// different configuration types can share one ordered list.
#[async_trait]
pub trait DynBundle: Send + Sync {
    fn bundle_name(&self) -> &'static str;

    /// Bind the bundle to a kernel. Returns `false` if it already was.
    fn attach(&self, ctx: &KernelContext) -> bool;

    /// Reset the configuration's merge base to [`Bundle::default_config`].
    async fn seed_defaults(&self) -> std::result::Result<(), BundleError>;

    async fn merge_config(&self, overrides: &Value) -> std::result::Result<(), BundleError>;

    async fn validate_config(&self) -> std::result::Result<(), ValidationError>;

    async fn run(&self, hook: LifecycleHook, ctx: &KernelContext) -> Result<()>;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

#[async_trait]
impl<B: Bundle> DynBundle for B {
    fn bundle_name(&self) -> &'static str {
        Bundle::name(self)
    }

    fn attach(&self, ctx: &KernelContext) -> bool {
        self.config().attach(Bundle::name(self), ctx)
    }

    async fn seed_defaults(&self) -> std::result::Result<(), BundleError> {
        self.config().rebase(self.default_config()).await
    }

    async fn merge_config(&self, overrides: &Value) -> std::result::Result<(), BundleError> {
        self.config().merge(overrides).await
    }

    async fn validate_config(&self) -> std::result::Result<(), ValidationError> {
        let config = self.config().get().await;
        self.validate(&config).await
    }

    async fn run(&self, hook: LifecycleHook, ctx: &KernelContext) -> Result<()> {
        match hook {
            LifecycleHook::Hook => self.hook(ctx).await,
            LifecycleHook::Prepare => self.prepare(ctx).await,
            LifecycleHook::Init => self.init(ctx).await,
            LifecycleHook::Shutdown => self.shutdown(ctx).await,
        }
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
