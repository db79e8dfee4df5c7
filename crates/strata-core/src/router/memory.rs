use std::collections::VecDeque;
use std::sync::{Mutex, RwLock};

use crate::container::Service;
use crate::kernel::phase::PhaseHandle;
use crate::router::error::RouterError;
use crate::router::route::{Route, RouteGenerationProps};
use crate::router::store::RouteStore;
use crate::router::Router;

/// Default number of locations kept by a [`MemoryRouter`].
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Router that navigates an in-memory history stack.
///
/// `go` renders the route, prefixes the base path and pushes the result; the
/// oldest entries are dropped past `history_limit`.
#[derive(Debug)]
pub struct MemoryRouter {
    store: RouteStore,
    base_path: RwLock<String>,
    history: Mutex<VecDeque<String>>,
    history_limit: usize,
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl MemoryRouter {
    /// A router whose route table is never locked.
    pub fn new(history_limit: usize) -> Self {
        Self::with_store(RouteStore::new(), history_limit)
    }

    /// A router whose `add` follows the phase of the kernel behind `phase`.
    pub fn with_phase(phase: PhaseHandle, history_limit: usize) -> Self {
        Self::with_store(RouteStore::with_phase(phase), history_limit)
    }

    fn with_store(store: RouteStore, history_limit: usize) -> Self {
        Self {
            store,
            base_path: RwLock::new(String::new()),
            history: Mutex::new(VecDeque::new()),
            history_limit: history_limit.max(1),
        }
    }

    /// Builder form of [`set_base_path`](Self::set_base_path).
    pub fn base(self, base_path: impl Into<String>) -> Self {
        self.set_base_path(base_path);
        self
    }

    pub fn base_path(&self) -> String {
        self.base_path.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Prefix applied to every location pushed by `go`.
    pub fn set_base_path(&self, base_path: impl Into<String>) {
        *self.base_path.write().unwrap_or_else(|e| e.into_inner()) = base_path.into();
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Visited locations, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).iter().cloned().collect()
    }

    /// Most recent location.
    pub fn current(&self) -> Option<String> {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).back().cloned()
    }

    /// Render the route stored under `key` and navigate to it.
    pub fn go_to(&self, key: &str, options: &RouteGenerationProps) -> Result<String, RouterError> {
        let route = self.find(key).ok_or_else(|| RouterError::RouteNotFound { key: key.to_string() })?;
        self.go(&route, options)
    }
}

impl Router for MemoryRouter {
    fn store(&self) -> &RouteStore {
        &self.store
    }

    fn go(&self, route: &Route, options: &RouteGenerationProps) -> Result<String, RouterError> {
        let location = format!("{}{}", self.base_path(), self.path(route, options)?);
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.push_back(location.clone());
        while history.len() > self.history_limit {
            history.pop_front();
        }
        log::debug!("Navigated to {}", location);
        Ok(location)
    }
}

impl Service for MemoryRouter {}
