use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::event::dispatcher::{self, BoxFuture, EventDispatcher};
use crate::event::error::EventSystemError;
use crate::event::{Event, ListenerId};
use crate::kernel::error::Result;

/// The kernel's event bus.
///
/// Clones share one dispatch table. The table lock is released before any
/// listener runs, so listeners may subscribe further listeners or emit other
/// events.
#[derive(Clone, Default)]
pub struct EventManager {
    dispatcher: Arc<Mutex<EventDispatcher>>,
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager").finish_non_exhaustive()
    }
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an async listener to events of type `E`.
    ///
    /// ```ignore
    /// events.add_listener(move |e: &KernelAfterInitEvent| {
    ///     Box::pin(async move { log::info!("{} bundles up", e.bundles.len()); Ok(()) })
    /// }).await;
    /// ```
    pub async fn add_listener<E, F>(&self, callback: F) -> ListenerId
    where
        E: Event,
        F: for<'a> Fn(&'a E) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        let id = self.dispatcher.lock().await.register::<E>(Box::new(callback));
        log::debug!("Registered listener {} for {}", id, std::any::type_name::<E>());
        id
    }

    /// Subscribe a synchronous listener to events of type `E`.
    pub async fn add_sync_listener<E, F>(&self, callback: F) -> ListenerId
    where
        E: Event,
        F: Fn(&E) -> Result<()> + Send + Sync + 'static,
    {
        let id = self.dispatcher.lock().await.register::<E>(dispatcher::sync_listener(callback));
        log::debug!("Registered listener {} for {}", id, std::any::type_name::<E>());
        id
    }

    /// Unregister a listener by its ID. Returns whether it existed.
    pub async fn remove_listener(&self, id: ListenerId) -> bool {
        self.dispatcher.lock().await.unregister(id)
    }

    pub async fn listener_count<E: Event>(&self) -> usize {
        self.dispatcher.lock().await.count(TypeId::of::<E>())
    }

    /// Run every listener of `E` in registration order, each to completion.
    ///
    /// Stops at the first failing listener and returns its error.
    pub async fn emit<E: Event>(&self, event: &E) -> Result<()> {
        self.dispatch(event).await
    }

    /// Type-erased form of [`emit`](Self::emit); the event kind is the
    /// concrete type behind `event`.
    pub async fn dispatch(&self, event: &dyn Event) -> Result<()> {
        let kind = event.as_any().type_id();
        let listeners = self.dispatcher.lock().await.snapshot(kind);
        if listeners.is_empty() {
            log::trace!("No listeners for '{}'", event.name());
            return Ok(());
        }

        log::debug!("Emitting '{}' to {} listener(s)", event.name(), listeners.len());
        for (listener_id, listener) in listeners {
            listener.handle(event).await.map_err(|source| EventSystemError::ListenerFailed {
                event: event.name().to_string(),
                listener_id,
                source: Box::new(source),
            })?;
        }
        Ok(())
    }
}
