use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::event::{AsyncEventListener, Event, ListenerId};
use crate::kernel::error::Result;

/// Owned future returned by listener callbacks
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Listener callback for events of type `E`
pub type ListenerFn<E> = dyn for<'a> Fn(&'a E) -> BoxFuture<'a, Result<()>> + Send + Sync;

/// Listener for typed events; ignores events of any other type
struct TypedListener<E: Event> {
    callback: Box<ListenerFn<E>>,
}

impl<E: Event> fmt::Debug for TypedListener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedListener").finish_non_exhaustive()
    }
}

#[async_trait]
impl<E: Event> AsyncEventListener for TypedListener<E> {
    async fn handle(&self, event: &dyn Event) -> Result<()> {
        match event.as_any().downcast_ref::<E>() {
            Some(e) => (self.callback)(e).await,
            None => Ok(()),
        }
    }
}

type ListenerEntry = (ListenerId, Arc<dyn AsyncEventListener>);

/// Dispatch table keyed by event type (Internal, wrapped by EventManager)
pub struct EventDispatcher {
    listeners: HashMap<TypeId, Vec<ListenerEntry>>,
    next_listener_id: ListenerId,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listener_count: usize = self.listeners.values().map(|v| v.len()).sum();
        f.debug_struct("EventDispatcher")
            .field("event_kinds", &self.listeners.len())
            .field("listeners", &listener_count)
            .field("next_listener_id", &self.next_listener_id)
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_listener_id: 1,
        }
    }

    /// Append a listener for `E`; it runs after every listener registered before it.
    pub fn register<E: Event>(&mut self, callback: Box<ListenerFn<E>>) -> ListenerId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        let listener: Arc<dyn AsyncEventListener> = Arc::new(TypedListener { callback });
        self.listeners.entry(TypeId::of::<E>()).or_default().push((id, listener));
        id
    }

    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let mut found = false;
        for entries in self.listeners.values_mut() {
            let len_before = entries.len();
            entries.retain(|(listener_id, _)| *listener_id != id);
            if entries.len() < len_before {
                found = true;
            }
        }
        self.listeners.retain(|_, entries| !entries.is_empty());
        found
    }

    /// Listeners for one event kind, in registration order.
    ///
    /// Returned as a snapshot so the table can change while they run.
    pub fn snapshot(&self, kind: TypeId) -> Vec<ListenerEntry> {
        self.listeners.get(&kind).cloned().unwrap_or_default()
    }

    pub fn count(&self, kind: TypeId) -> usize {
        self.listeners.get(&kind).map_or(0, |entries| entries.len())
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Box an async listener closure.
///
/// Going through this function lets the compiler infer the closure's
/// higher-ranked signature, so callers can write
/// `listener(|e: &MyEvent| Box::pin(async move { ... }))`.
pub fn listener<E, F>(f: F) -> Box<ListenerFn<E>>
where
    E: Event,
    F: for<'a> Fn(&'a E) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
{
    Box::new(f)
}

/// Helper function to create listeners from synchronous closures
pub fn sync_listener<E, F>(f: F) -> Box<ListenerFn<E>>
where
    E: Event,
    F: Fn(&E) -> Result<()> + Send + Sync + 'static,
{
    listener(move |event: &E| {
        let result = f(event);
        Box::pin(async move { result })
    })
}
