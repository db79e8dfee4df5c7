use std::any::Any;

use crate::event::Event;
use crate::kernel::phase::KernelPhase;

/// Emitted on every kernel phase transition, after the new phase is visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelPhaseChangedEvent {
    pub from: KernelPhase,
    pub to: KernelPhase,
}

impl Event for KernelPhaseChangedEvent {
    fn name(&self) -> &'static str {
        "kernel.phase_changed"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Emitted once every bundle has been prepared, right before the `init` hooks run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelBeforeInitEvent;

impl Event for KernelBeforeInitEvent {
    fn name(&self) -> &'static str {
        "kernel.before_init"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Emitted once every bundle has been initialised and the kernel is `RUNNING`.
///
/// Listeners use it to read state assembled by other bundles regardless of
/// registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelAfterInitEvent {
    /// Bundle names in registration order
    pub bundles: Vec<String>,
}

impl Event for KernelAfterInitEvent {
    fn name(&self) -> &'static str {
        "kernel.after_init"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Emitted when shutdown begins, before any bundle's `shutdown` hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelShutdownEvent;

impl Event for KernelShutdownEvent {
    fn name(&self) -> &'static str {
        "kernel.shutdown"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
