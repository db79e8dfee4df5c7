use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::kernel::error::{Error, Result};

/// Lifecycle phase of a [`Kernel`](crate::kernel::Kernel).
///
/// Phases are ordered; the kernel only ever moves to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum KernelPhase {
    /// Bundles are registered but no hook has run yet
    NotStarted = 0,
    /// Configs are validated, listeners wired and resources prepared
    Preparing = 1,
    /// Bundles run their cross-bundle `init` hook
    Initialising = 2,
    /// Startup finished; the container is read-mostly
    Running = 3,
    /// Bundles are being torn down in reverse order
    ShuttingDown = 4,
    /// Terminal
    Stopped = 5,
}

impl KernelPhase {
    /// The phase that directly follows this one, if any.
    pub fn next(self) -> Option<KernelPhase> {
        match self {
            KernelPhase::NotStarted => Some(KernelPhase::Preparing),
            KernelPhase::Preparing => Some(KernelPhase::Initialising),
            KernelPhase::Initialising => Some(KernelPhase::Running),
            KernelPhase::Running => Some(KernelPhase::ShuttingDown),
            KernelPhase::ShuttingDown => Some(KernelPhase::Stopped),
            KernelPhase::Stopped => None,
        }
    }

    /// Whether bundle configuration and other guarded state may still change.
    pub fn allows_mutation(self) -> bool {
        self <= KernelPhase::Initialising
    }

    fn from_u8(raw: u8) -> KernelPhase {
        match raw {
            0 => KernelPhase::NotStarted,
            1 => KernelPhase::Preparing,
            2 => KernelPhase::Initialising,
            3 => KernelPhase::Running,
            4 => KernelPhase::ShuttingDown,
            _ => KernelPhase::Stopped,
        }
    }
}

impl fmt::Display for KernelPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            KernelPhase::NotStarted => "NOT_STARTED",
            KernelPhase::Preparing => "PREPARING",
            KernelPhase::Initialising => "INITIALISING",
            KernelPhase::Running => "RUNNING",
            KernelPhase::ShuttingDown => "SHUTTING_DOWN",
            KernelPhase::Stopped => "STOPPED",
        };
        f.write_str(label)
    }
}

/// Shared, cheaply clonable view of the kernel's current phase.
///
/// Every clone observes the same value, so bundles and services holding a
/// handle see transitions as soon as the kernel makes them.
#[derive(Debug, Clone, Default)]
pub struct PhaseHandle {
    inner: Arc<AtomicU8>,
}

impl PhaseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn get(&self) -> KernelPhase {
        KernelPhase::from_u8(self.inner.load(Ordering::Acquire))
    }

    /// Move to `next`, which must be the direct successor of the current phase.
    pub(crate) fn advance(&self, next: KernelPhase) -> Result<KernelPhase> {
        let current = self.get();
        if current.next() != Some(next) {
            return Err(Error::InvalidPhaseTransition { from: current, to: next });
        }
        self.inner.store(next as u8, Ordering::Release);
        Ok(current)
    }
}
