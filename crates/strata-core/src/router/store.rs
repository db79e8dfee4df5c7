use std::collections::BTreeMap;
use std::sync::RwLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::kernel::phase::PhaseHandle;
use crate::router::error::RouterError;
use crate::router::route::{Route, RouteDefinition, RouteGenerationProps};

/// Characters left as-is in query keys and values (RFC 3986 unreserved).
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Ordered route table shared by every [`Router`](crate::router::Router).
///
/// No two routes share a path, and no two share a non-empty name. When
/// built with a [`PhaseHandle`], `add` is refused once the kernel is past
/// `INITIALISING`.
#[derive(Debug, Default)]
pub struct RouteStore {
    routes: RwLock<Vec<Route>>,
    phase: Option<PhaseHandle>,
}

impl RouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store gated on the phase of the kernel owning `phase`.
    pub fn with_phase(phase: PhaseHandle) -> Self {
        Self {
            routes: RwLock::new(Vec::new()),
            phase: Some(phase),
        }
    }

    /// Add routes in order. Each key becomes the route's name unless the
    /// definition names it.
    ///
    /// Routes are checked and appended one at a time: on a conflict the
    /// routes before it stay registered.
    pub fn add<I, K>(&self, routes: I) -> Result<(), RouterError>
    where
        I: IntoIterator<Item = (K, RouteDefinition)>,
        K: Into<String>,
    {
        if let Some(phase) = &self.phase {
            let current = phase.get();
            if !current.allows_mutation() {
                return Err(RouterError::Stage {
                    operation: "add routes".to_string(),
                    phase: current,
                });
            }
        }

        let mut store = self.routes.write().unwrap_or_else(|e| e.into_inner());
        for (key, definition) in routes {
            let route = Route::from_definition(key.into(), definition);
            check_against(&store, &route)?;
            log::debug!("Registered route {}:{}", route.name.as_deref().unwrap_or(""), route.path);
            store.push(route);
        }
        Ok(())
    }

    /// First route whose path equals `key`, else the first whose name does.
    pub fn find(&self, key: &str) -> Option<Route> {
        let store = self.routes.read().unwrap_or_else(|e| e.into_inner());
        store
            .iter()
            .find(|r| r.path == key)
            .or_else(|| store.iter().find(|r| r.name.as_deref() == Some(key)))
            .cloned()
    }

    /// Snapshot of the route table in insertion order.
    pub fn routes(&self) -> Vec<Route> {
        self.routes.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.routes.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail with [`RouterError::RouteConflict`] if `route` clashes with a
    /// stored route. The first clashing route is reported.
    pub fn check_consistency(&self, route: &Route) -> Result<(), RouterError> {
        let store = self.routes.read().unwrap_or_else(|e| e.into_inner());
        check_against(&store, route)
    }

    /// Render `route` with `options`; see [`render_path`].
    pub fn path(&self, route: &Route, options: &RouteGenerationProps) -> Result<String, RouterError> {
        render_path(route, options)
    }
}

fn check_against(store: &[Route], route: &Route) -> Result<(), RouterError> {
    let candidate_name = route.effective_name();
    let found = store
        .iter()
        .find(|r| r.path == route.path || (candidate_name.is_some() && r.name.as_deref() == candidate_name));

    match found {
        None => Ok(()),
        Some(existing) => {
            log::warn!("Route {} conflicts with {}", route.path, existing.path);
            Err(RouterError::RouteConflict {
                route: to_json(route),
                existing: to_json(existing),
            })
        }
    }
}

fn to_json(route: &Route) -> String {
    serde_json::to_string(route).unwrap_or_else(|_| format!("{route:?}"))
}

/// Fill the `:param` placeholders of `route.path`.
///
/// Every placeholder named in `options.params` is replaced (all occurrences);
/// placeholders without a value are left untouched. A param with no matching
/// placeholder fails with [`RouterError::MissingParam`]. The query string is
/// appended only when `params` was supplied and `query` is non-empty, with
/// keys in sorted order.
pub fn render_path(route: &Route, options: &RouteGenerationProps) -> Result<String, RouterError> {
    let template = route.path.as_str();
    let Some(params) = &options.params else {
        return Ok(template.to_string());
    };

    let spans = placeholder_spans(template);
    for param in params.keys() {
        if !spans.iter().any(|&(start, end)| &template[start + 1..end] == param) {
            return Err(RouterError::MissingParam {
                param: param.clone(),
                path: template.to_string(),
            });
        }
    }

    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;
    for (start, end) in spans {
        if let Some(value) = params.get(&template[start + 1..end]) {
            rendered.push_str(&template[last..start]);
            rendered.push_str(value);
            last = end;
        }
    }
    rendered.push_str(&template[last..]);

    if !options.query.is_empty() {
        rendered.push('?');
        rendered.push_str(&query_string(&options.query));
    }
    Ok(rendered)
}

/// `k=v` pairs joined by `&`, percent-encoded.
pub fn query_string(query: &BTreeMap<String, String>) -> String {
    query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_ENCODE_SET),
                utf8_percent_encode(value, QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Byte ranges of `:name` placeholders, colon included. Names are
/// `[A-Za-z0-9_]+`.
fn placeholder_spans(template: &str) -> Vec<(usize, usize)> {
    let bytes = template.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b':' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                end += 1;
            }
            if end > start {
                spans.push((i, end));
                i = end;
                continue;
            }
        }
        i += 1;
    }
    spans
}
