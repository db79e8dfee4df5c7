//! # Strata Routing Registry
//!
//! A registry of named routes with `:param` path templates, shipped as the
//! reference kernel-integrated subsystem.
//!
//! ## Key Components:
//!
//! - **[`RouteStore`]**: the ordered route table. Enforces that no two routes
//!   share a path or a non-empty name, renders paths, and refuses new routes
//!   once the kernel is running.
//! - **[`Router`]**: the navigation contract. Everything but `go` delegates to
//!   the store.
//! - **[`MemoryRouter`]**: a [`Router`] keeping an in-memory history.
//! - **[`RouterBundle`]**: registers a [`MemoryRouter`] with the kernel and
//!   publishes the final route table in a [`RoutingPreparationEvent`] after
//!   every bundle has initialised.
pub mod bundle;
pub mod error;
pub mod events;
pub mod memory;
pub mod route;
pub mod store;

pub use bundle::{ROUTER_BUNDLE_NAME, ROUTER_CONFIG_TOKEN, RouterBundle, RouterBundleConfig};
pub use error::RouterError;
pub use events::RoutingPreparationEvent;
pub use memory::MemoryRouter;
pub use route::{Route, RouteDefinition, RouteGenerationProps};
pub use store::RouteStore;

/// Navigation over a [`RouteStore`].
pub trait Router: Send + Sync {
    fn store(&self) -> &RouteStore;

    /// Add `(key, definition)` pairs in order; see [`RouteStore::add`].
    fn add<I, K>(&self, routes: I) -> Result<(), RouterError>
    where
        Self: Sized,
        I: IntoIterator<Item = (K, RouteDefinition)>,
        K: Into<String>,
    {
        self.store().add(routes)
    }

    /// Look a route up by path, then by name.
    fn find(&self, key: &str) -> Option<Route> {
        self.store().find(key)
    }

    /// Render the path of `route`.
    fn path(&self, route: &Route, options: &RouteGenerationProps) -> Result<String, RouterError> {
        self.store().path(route, options)
    }

    /// Navigate to `route`, returning the location reached.
    fn go(&self, route: &Route, options: &RouteGenerationProps) -> Result<String, RouterError>;

    fn routes(&self) -> Vec<Route> {
        self.store().routes()
    }
}
