use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bundle::{Bundle, BundleConfig, ValidationError};
use crate::container::Token;
use crate::event::KernelAfterInitEvent;
use crate::kernel::context::KernelContext;
use crate::kernel::error::{Error, Result};
use crate::router::Router;
use crate::router::events::RoutingPreparationEvent;
use crate::router::memory::{DEFAULT_HISTORY_LIMIT, MemoryRouter};
use crate::router::route::RouteDefinition;

pub const ROUTER_BUNDLE_NAME: &str = "router";

/// The router bundle's effective configuration, registered during `prepare`.
pub const ROUTER_CONFIG_TOKEN: Token<RouterBundleConfig> = Token::from_static("ROUTER_CONFIG");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterBundleConfig {
    /// Prefix of every location the router navigates to; empty, or
    /// `/segment` without a trailing slash.
    pub base_path: String,
    pub history_limit: usize,
    /// Routes added during `prepare`, keyed by route name.
    pub routes: BTreeMap<String, RouteDefinition>,
}

impl Default for RouterBundleConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            routes: BTreeMap::new(),
        }
    }
}

/// Registers a [`MemoryRouter`] with the kernel.
///
/// Other bundles resolve the router with
/// `ctx.container().resolve::<MemoryRouter>()` and add their routes during
/// `prepare` or `init`. Once every bundle is initialised the bundle emits a
/// [`RoutingPreparationEvent`] with the final route table.
#[derive(Debug)]
pub struct RouterBundle {
    config: BundleConfig<RouterBundleConfig>,
    router: OnceLock<Arc<MemoryRouter>>,
}

impl Default for RouterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterBundle {
    pub fn new() -> Self {
        Self::with_config(RouterBundleConfig::default())
    }

    pub fn with_config(config: RouterBundleConfig) -> Self {
        Self {
            config: BundleConfig::new(config),
            router: OnceLock::new(),
        }
    }

    /// The router, once `prepare` has run.
    pub fn router(&self) -> Option<Arc<MemoryRouter>> {
        self.router.get().cloned()
    }

    /// Change the base path. Refused once the kernel is running.
    pub async fn set_base_path(&self, base_path: impl Into<String>) -> Result<()> {
        let base_path = base_path.into();
        validate_base_path(&base_path).map_err(|source| Error::Configuration {
            bundle: ROUTER_BUNDLE_NAME.to_string(),
            source,
        })?;
        self.config
            .update(|config| config.base_path = base_path.clone())
            .await?;
        if let Some(router) = self.router.get() {
            router.set_base_path(base_path);
        }
        Ok(())
    }
}

fn validate_base_path(base_path: &str) -> std::result::Result<(), ValidationError> {
    if base_path.is_empty() {
        return Ok(());
    }
    if !base_path.starts_with('/') {
        return Err(ValidationError::for_field("base_path", "must start with '/'"));
    }
    if base_path.ends_with('/') {
        return Err(ValidationError::for_field("base_path", "must not end with '/'"));
    }
    Ok(())
}

#[async_trait]
impl Bundle for RouterBundle {
    type Config = RouterBundleConfig;

    fn name(&self) -> &'static str {
        ROUTER_BUNDLE_NAME
    }

    fn config(&self) -> &BundleConfig<RouterBundleConfig> {
        &self.config
    }

    async fn validate(&self, config: &RouterBundleConfig) -> std::result::Result<(), ValidationError> {
        validate_base_path(&config.base_path)?;
        if config.history_limit == 0 {
            return Err(ValidationError::for_field("history_limit", "must be greater than zero"));
        }
        if let Some(key) = config.routes.iter().find(|(_, r)| r.path.is_empty()).map(|(k, _)| k) {
            return Err(ValidationError::for_field(format!("routes.{key}.path"), "must not be empty"));
        }
        Ok(())
    }

    async fn hook(&self, ctx: &KernelContext) -> Result<()> {
        let container = ctx.container().clone();
        let events = ctx.events().clone();
        ctx.events()
            .add_listener(move |_: &KernelAfterInitEvent| {
                let container = container.clone();
                let events = events.clone();
                Box::pin(async move {
                    let router = container.resolve::<MemoryRouter>().await?;
                    let routes = router.routes();
                    log::info!("Publishing {} route(s)", routes.len());
                    events.emit(&RoutingPreparationEvent { routes }).await
                })
            })
            .await;
        Ok(())
    }

    async fn prepare(&self, ctx: &KernelContext) -> Result<()> {
        let config = self.config.get().await;
        let router = Arc::new(
            MemoryRouter::with_phase(ctx.phase_handle().clone(), config.history_limit)
                .base(config.base_path.clone()),
        );
        router.add(config.routes.clone())?;

        ctx.container().provide_arc(Arc::clone(&router))?;
        ctx.container().set(&ROUTER_CONFIG_TOKEN, config)?;
        if self.router.set(router).is_err() {
            log::warn!("Router bundle prepared twice; keeping the first router");
        }
        Ok(())
    }
}
