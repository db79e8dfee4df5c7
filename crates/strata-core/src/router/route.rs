use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_exact() -> bool {
    true
}

/// A registered route.
///
/// Fields other than `name`, `path` and `exact` are kept in `extra` and
/// written back flattened, so `{"path": "/", "title": "Home"}` survives a
/// round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Path template; `:param` segments are filled in by [`RouteStore::path`](crate::router::RouteStore::path).
    pub path: String,
    #[serde(default = "default_exact")]
    pub exact: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            name: None,
            path: path.into(),
            exact: true,
            extra: Map::new(),
        }
    }

    /// The name, unless it is missing or empty.
    pub fn effective_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// Build the stored route for `key`: `exact` defaults to `true` and
    /// `name` to the key.
    pub(crate) fn from_definition(key: String, definition: RouteDefinition) -> Self {
        Self {
            name: Some(definition.name.unwrap_or(key)),
            path: definition.path,
            exact: definition.exact.unwrap_or(true),
            extra: definition.extra,
        }
    }
}

/// What callers hand to `add`: only `path` is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteDefinition {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = Some(exact);
        self
    }

    /// Attach an arbitrary metadata field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Options for rendering a route path.
///
/// `params` is optional on purpose: the query string is only rendered when
/// `params` was supplied, even if it is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteGenerationProps {
    pub params: Option<BTreeMap<String, String>>,
    pub query: BTreeMap<String, String>,
}

impl RouteGenerationProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `params` as supplied without adding any.
    pub fn with_params(mut self) -> Self {
        self.params.get_or_insert_with(BTreeMap::new);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.to_string());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }
}
