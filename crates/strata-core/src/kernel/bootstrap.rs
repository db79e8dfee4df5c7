use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::bundle::{Bundle, BundleError, DynBundle, LifecycleHook};
use crate::config::KernelConfig;
use crate::container::Container;
use crate::event::{EventManager, KernelAfterInitEvent, KernelBeforeInitEvent, KernelPhaseChangedEvent, KernelShutdownEvent};
use crate::kernel::constants;
use crate::kernel::context::KernelContext;
use crate::kernel::error::{Error, Result};
use crate::kernel::phase::KernelPhase;

/// Collects the ordered bundle list and kernel parameters.
#[derive(Default)]
pub struct KernelBuilder {
    config: KernelConfig,
    bundles: Vec<(Arc<dyn DynBundle>, Option<Value>)>,
}

impl KernelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kernel parameters and per-bundle configuration overrides.
    pub fn config(mut self, config: KernelConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a bundle. Registration order is the order every phase runs in.
    pub fn bundle<B: Bundle>(mut self, bundle: Arc<B>) -> Self {
        let bundle: Arc<dyn DynBundle> = bundle;
        self.bundles.push((bundle, None));
        self
    }

    /// Append a bundle with configuration overrides, merged over its defaults
    /// and over any overrides from [`KernelConfig`].
    pub fn bundle_with_config<B: Bundle>(mut self, bundle: Arc<B>, overrides: Value) -> Self {
        let bundle: Arc<dyn DynBundle> = bundle;
        self.bundles.push((bundle, Some(overrides)));
        self
    }

    /// Register every bundle with a fresh kernel and merge its configuration.
    pub async fn build(self) -> Result<Kernel> {
        let container = Container::with_strict(self.config.strict_container);
        let context = KernelContext::new(container);
        let mut names = HashSet::new();
        let mut bundles = Vec::with_capacity(self.bundles.len());

        for (bundle, overrides) in self.bundles {
            let name = bundle.bundle_name();
            if !names.insert(name) {
                return Err(Error::DuplicateBundle { bundle: name.to_string() });
            }
            if !bundle.attach(&context) {
                return Err(BundleError::AlreadyAttached { bundle: name.to_string() }.into());
            }
            bundle.seed_defaults().await?;
            if let Some(file_overrides) = self.config.bundle_overrides(name) {
                bundle.merge_config(file_overrides).await?;
            }
            if let Some(overrides) = overrides {
                bundle.merge_config(&overrides).await?;
            }
            log::debug!("Registered bundle '{}'", name);
            bundles.push(bundle);
        }

        Ok(Kernel {
            bundles,
            context,
            config: self.config,
        })
    }
}

/// Drives an ordered list of bundles through the kernel phases.
pub struct Kernel {
    bundles: Vec<Arc<dyn DynBundle>>,
    context: KernelContext,
    config: KernelConfig,
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("bundles", &self.bundle_names())
            .field("phase", &self.phase())
            .field("container", self.context.container())
            .finish()
    }
}

impl Kernel {
    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    /// Current phase.
    pub fn phase(&self) -> KernelPhase {
        self.context.phase()
    }

    pub fn context(&self) -> &KernelContext {
        &self.context
    }

    pub fn container(&self) -> &Container {
        self.context.container()
    }

    pub fn events(&self) -> &EventManager {
        self.context.events()
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Bundle names in registration order.
    pub fn bundle_names(&self) -> Vec<String> {
        self.bundles.iter().map(|b| b.bundle_name().to_string()).collect()
    }

    /// The registered bundle of concrete type `B`, if any.
    pub fn bundle<B: Bundle>(&self) -> Option<Arc<B>> {
        self.bundles
            .iter()
            .find_map(|b| Arc::clone(b).into_any().downcast::<B>().ok())
    }

    /// Run the startup phases to completion.
    ///
    /// `PREPARING`: validate every bundle's configuration, then run every
    /// `hook`, then every `prepare`. `INITIALISING`: run every `init`.
    /// `RUNNING`: the container is frozen (unless disabled) and
    /// [`KernelAfterInitEvent`] is emitted.
    ///
    /// The first failure aborts startup; the kernel is left in the phase that
    /// failed and cannot be initialised again.
    pub async fn init(&self) -> Result<()> {
        let phase = self.phase();
        if phase != KernelPhase::NotStarted {
            return Err(Error::AlreadyStarted { phase });
        }

        log::info!(
            "Initializing {} v{} with {} bundle(s)",
            constants::APP_NAME,
            constants::APP_VERSION,
            self.bundles.len()
        );

        self.transition(KernelPhase::Preparing).await?;
        self.validate_all().await?;
        self.run_all(LifecycleHook::Hook).await?;
        self.run_all(LifecycleHook::Prepare).await?;

        self.transition(KernelPhase::Initialising).await?;
        self.events().emit(&KernelBeforeInitEvent).await?;
        self.run_all(LifecycleHook::Init).await?;

        if self.config.freeze_container_on_run {
            self.container().freeze();
        }
        self.transition(KernelPhase::Running).await?;
        self.events()
            .emit(&KernelAfterInitEvent { bundles: self.bundle_names() })
            .await?;

        log::info!("Kernel initialized; {} services registered", self.container().len());
        Ok(())
    }

    /// Tear the kernel down: `SHUTTING_DOWN`, every bundle's `shutdown` in
    /// reverse registration order, then `STOPPED`.
    ///
    /// Every bundle gets its `shutdown` call even if an earlier one failed;
    /// the first failure is returned.
    pub async fn shutdown(&self) -> Result<()> {
        let phase = self.phase();
        if phase != KernelPhase::Running {
            return Err(Error::NotRunning { phase });
        }

        log::info!("Shutting down bundles...");
        self.transition(KernelPhase::ShuttingDown).await?;
        let mut first_error = self.events().emit(&KernelShutdownEvent).await.err();

        for bundle in self.bundles.iter().rev() {
            log::debug!("Stopping bundle '{}'", bundle.bundle_name());
            if let Err(e) = self.run_one(bundle, LifecycleHook::Shutdown).await {
                log::error!("Error stopping bundle '{}': {}", bundle.bundle_name(), e);
                first_error.get_or_insert(e);
            }
        }

        self.transition(KernelPhase::Stopped).await?;
        log::info!("Bundle shutdown complete.");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn validate_all(&self) -> Result<()> {
        for bundle in &self.bundles {
            log::debug!("Validating configuration of bundle '{}'", bundle.bundle_name());
            bundle.validate_config().await.map_err(|source| {
                log::error!("Bundle '{}' rejected its configuration: {}", bundle.bundle_name(), source);
                Error::Configuration {
                    bundle: bundle.bundle_name().to_string(),
                    source,
                }
            })?;
        }
        Ok(())
    }

    async fn run_all(&self, hook: LifecycleHook) -> Result<()> {
        for bundle in &self.bundles {
            self.run_one(bundle, hook).await?;
        }
        Ok(())
    }

    async fn run_one(&self, bundle: &Arc<dyn DynBundle>, hook: LifecycleHook) -> Result<()> {
        log::debug!("Running {} of bundle '{}'", hook, bundle.bundle_name());
        bundle.run(hook, &self.context).await.map_err(|source| {
            log::error!("Bundle '{}' failed in {}: {}", bundle.bundle_name(), hook, source);
            Error::BundleLifecycle {
                phase: self.phase(),
                bundle: bundle.bundle_name().to_string(),
                source: Box::new(source),
            }
        })
    }

    async fn transition(&self, next: KernelPhase) -> Result<()> {
        let from = self.context.phase_handle().advance(next)?;
        log::info!("Kernel phase {} -> {}", from, next);
        self.events()
            .emit(&KernelPhaseChangedEvent { from, to: next })
            .await
    }
}
