use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bundle::{Bundle, BundleConfig, ValidationError};
use crate::container::Service;
use crate::kernel::context::KernelContext;
use crate::kernel::error::Result;
use crate::router::{MemoryRouter, RouteDefinition, Router};

/// Shared record of what bundles did, in order.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// Service published by [`ProviderBundle`].
#[derive(Debug)]
pub struct Greeter {
    pub greeting: String,
}

impl Service for Greeter {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreeterConfig {
    pub greeting: String,
}

impl Default for GreeterConfig {
    fn default() -> Self {
        Self { greeting: "hello".into() }
    }
}

/// Registers a [`Greeter`] during `init`.
pub struct ProviderBundle {
    config: BundleConfig<GreeterConfig>,
    journal: Journal,
}

impl ProviderBundle {
    pub fn new(journal: &Journal) -> Self {
        Self {
            config: BundleConfig::new(GreeterConfig::default()),
            journal: journal.clone(),
        }
    }
}

#[async_trait]
impl Bundle for ProviderBundle {
    type Config = GreeterConfig;

    fn name(&self) -> &'static str {
        "provider"
    }

    fn config(&self) -> &BundleConfig<GreeterConfig> {
        &self.config
    }

    async fn validate(&self, config: &GreeterConfig) -> std::result::Result<(), ValidationError> {
        if config.greeting.trim().is_empty() {
            return Err(ValidationError::for_field("greeting", "must not be blank"));
        }
        Ok(())
    }

    async fn init(&self, ctx: &KernelContext) -> Result<()> {
        let greeting = self.config.read(|c| c.greeting.clone()).await;
        ctx.container().provide(Greeter { greeting })?;
        self.journal.lock().unwrap().push("provider:init".into());
        Ok(())
    }
}

/// Looks the [`Greeter`] up during `init` and adds a route for it.
pub struct ConsumerBundle {
    config: BundleConfig<()>,
    journal: Journal,
}

impl ConsumerBundle {
    pub fn new(journal: &Journal) -> Self {
        Self {
            config: BundleConfig::new(()),
            journal: journal.clone(),
        }
    }
}

#[async_trait]
impl Bundle for ConsumerBundle {
    type Config = ();

    fn name(&self) -> &'static str {
        "consumer"
    }

    fn config(&self) -> &BundleConfig<()> {
        &self.config
    }

    async fn init(&self, ctx: &KernelContext) -> Result<()> {
        let greeter = ctx.container().resolve::<Greeter>().await?;
        self.journal
            .lock()
            .unwrap()
            .push(format!("consumer:init:{}", greeter.greeting));

        if let Ok(router) = ctx.container().resolve::<MemoryRouter>().await {
            router.add(vec![("greet", RouteDefinition::new("/greet/:name"))])?;
        }
        Ok(())
    }
}
