use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strata_core::bundle::{Bundle, BundleConfig};
use strata_core::kernel::context::KernelContext;
use strata_core::kernel::error::Result as KernelResult;
use strata_core::router::{MemoryRouter, RouteDefinition, Router};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Also register the `/admin` route.
    pub admin: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { admin: true }
    }
}

/// Adds a small route table during `init`, the way an application bundle
/// registered after the router would.
#[derive(Debug)]
pub struct DemoBundle {
    config: BundleConfig<DemoConfig>,
}

impl Default for DemoBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoBundle {
    pub fn new() -> Self {
        Self {
            config: BundleConfig::new(DemoConfig::default()),
        }
    }
}

#[async_trait]
impl Bundle for DemoBundle {
    type Config = DemoConfig;

    fn name(&self) -> &'static str {
        "demo"
    }

    fn config(&self) -> &BundleConfig<DemoConfig> {
        &self.config
    }

    async fn init(&self, ctx: &KernelContext) -> KernelResult<()> {
        let router = ctx.container().resolve::<MemoryRouter>().await?;
        router.add([
            ("user", RouteDefinition::new("/users/:id").with("title", "User profile")),
            ("user_post", RouteDefinition::new("/users/:id/posts/:post")),
            ("search", RouteDefinition::new("/search").exact(false)),
        ])?;
        if self.config.read(|c| c.admin).await {
            router.add([("admin", RouteDefinition::new("/admin").with("auth", true))])?;
        }
        Ok(())
    }

    async fn shutdown(&self, _ctx: &KernelContext) -> KernelResult<()> {
        log::info!("Demo bundle shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_registers_admin_route() {
        let bundle = DemoBundle::default();
        assert_eq!(bundle.name(), "demo");
        assert!(bundle.config().read(|c| c.admin).await);
    }
}
