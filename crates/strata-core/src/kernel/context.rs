use crate::container::Container;
use crate::event::EventManager;
use crate::kernel::phase::{KernelPhase, PhaseHandle};

/// Everything a bundle may reach of its kernel: the service container, the
/// event bus and the current phase.
///
/// Handed to every lifecycle hook and attached to each bundle at
/// registration. Clones share state with the kernel.
#[derive(Debug, Clone)]
pub struct KernelContext {
    container: Container,
    events: EventManager,
    phase: PhaseHandle,
}

impl KernelContext {
    pub fn new(container: Container) -> Self {
        Self {
            container,
            events: EventManager::new(),
            phase: PhaseHandle::new(),
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn events(&self) -> &EventManager {
        &self.events
    }

    /// Current kernel phase; safe to call from inside hooks and listeners.
    pub fn phase(&self) -> KernelPhase {
        self.phase.get()
    }

    pub fn phase_handle(&self) -> &PhaseHandle {
        &self.phase
    }
}

impl Default for KernelContext {
    fn default() -> Self {
        Self::new(Container::new())
    }
}
