//! # Strata Event System Errors
use thiserror::Error;

use crate::event::ListenerId;
use crate::kernel::error::Error as KernelError;

#[derive(Debug, Error)]
pub enum EventSystemError {
    /// A listener returned an error; the listeners after it did not run.
    #[error("Listener {listener_id} failed while handling '{event}': {source}")]
    ListenerFailed {
        event: String,
        listener_id: ListenerId,
        #[source]
        source: Box<KernelError>,
    },
}
