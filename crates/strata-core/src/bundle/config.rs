use std::fmt;
use std::sync::{OnceLock, RwLock as StdRwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::bundle::error::BundleError;
use crate::kernel::context::KernelContext;
use crate::kernel::phase::KernelPhase;

/// Bounds every bundle configuration type satisfies.
pub trait BundleConfigType: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {}

impl<T> BundleConfigType for T where T: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {}

struct Attachment {
    bundle: &'static str,
    context: KernelContext,
}

/// A bundle's configuration: its defaults, the effective (merged) value, and
/// the kernel it belongs to.
///
/// Every mutation re-checks the kernel phase, so it fails with
/// [`BundleError::Stage`] once the kernel has passed `INITIALISING`, no matter
/// who holds the bundle.
pub struct BundleConfig<C> {
    defaults: StdRwLock<C>,
    current: RwLock<C>,
    attachment: OnceLock<Attachment>,
}

impl<C: BundleConfigType> fmt::Debug for BundleConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleConfig")
            .field("bundle", &self.bundle_name())
            .field("defaults", &*self.read_defaults())
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl<C: BundleConfigType> BundleConfig<C> {
    pub fn new(defaults: C) -> Self {
        Self {
            current: RwLock::new(defaults.clone()),
            defaults: StdRwLock::new(defaults),
            attachment: OnceLock::new(),
        }
    }

    /// The configuration overrides are merged into.
    pub fn defaults(&self) -> C {
        self.read_defaults().clone()
    }

    /// Make `defaults` the merge base. The effective value follows unless it
    /// was already changed away from the previous defaults.
    pub(crate) async fn rebase(&self, defaults: C) -> Result<(), BundleError> {
        let mut current = self.current.write().await;
        let previous = std::mem::replace(
            &mut *self.defaults.write().unwrap_or_else(|e| e.into_inner()),
            defaults.clone(),
        );
        let untouched = serde_json::to_value(&*current).map_err(|source| self.merge_error(source))?
            == serde_json::to_value(&previous).map_err(|source| self.merge_error(source))?;
        if untouched {
            *current = defaults;
        }
        Ok(())
    }

    /// Snapshot of the effective configuration.
    pub async fn get(&self) -> C {
        self.current.read().await.clone()
    }

    /// Read part of the effective configuration without cloning all of it.
    pub async fn read<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&*self.current.read().await)
    }

    /// Mutate the effective configuration while the kernel still allows it.
    pub async fn update<R>(&self, f: impl FnOnce(&mut C) -> R) -> Result<R, BundleError> {
        const OPERATION: &str = "update the configuration";
        self.ensure_mutable(OPERATION)?;
        let mut current = self.current.write().await;
        // The phase may have moved on while waiting for the lock
        self.ensure_mutable(OPERATION)?;
        Ok(f(&mut current))
    }

    /// Replace the effective configuration while the kernel still allows it.
    pub async fn replace(&self, config: C) -> Result<(), BundleError> {
        self.update(|current| *current = config).await
    }

    /// Deep-merge `overrides` into the effective configuration.
    ///
    /// Objects merge key by key; any other value (arrays included) replaces
    /// what was there.
    pub async fn merge(&self, overrides: &Value) -> Result<(), BundleError> {
        const OPERATION: &str = "merge configuration overrides";
        self.ensure_mutable(OPERATION)?;
        let mut current = self.current.write().await;
        self.ensure_mutable(OPERATION)?;
        let mut merged = serde_json::to_value(&*current).map_err(|source| self.merge_error(source))?;
        merge_values(&mut merged, overrides.clone());
        *current = serde_json::from_value(merged).map_err(|source| self.merge_error(source))?;
        Ok(())
    }

    /// Fail with [`BundleError::Stage`] if the kernel no longer accepts
    /// mutations. Bundles call this from their own guarded setters.
    pub fn ensure_mutable(&self, operation: &str) -> Result<(), BundleError> {
        let phase = self.phase();
        if phase.allows_mutation() {
            Ok(())
        } else {
            Err(BundleError::Stage {
                bundle: self.bundle_name().to_string(),
                operation: operation.to_string(),
                phase,
            })
        }
    }

    /// Phase of the owning kernel; `NotStarted` until registered.
    pub fn phase(&self) -> KernelPhase {
        self.attachment
            .get()
            .map_or(KernelPhase::NotStarted, |a| a.context.phase())
    }

    /// Kernel this configuration's bundle is registered with.
    pub fn context(&self) -> Option<&KernelContext> {
        self.attachment.get().map(|a| &a.context)
    }

    pub(crate) fn attach(&self, bundle: &'static str, context: &KernelContext) -> bool {
        self.attachment
            .set(Attachment { bundle, context: context.clone() })
            .is_ok()
    }

    fn read_defaults(&self) -> std::sync::RwLockReadGuard<'_, C> {
        self.defaults.read().unwrap_or_else(|e| e.into_inner())
    }

    fn bundle_name(&self) -> &'static str {
        self.attachment.get().map_or("<unregistered>", |a| a.bundle)
    }

    fn merge_error(&self, source: serde_json::Error) -> BundleError {
        BundleError::ConfigMerge { bundle: self.bundle_name().to_string(), source }
    }
}

/// Recursively merge `overlay` into `base`.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
