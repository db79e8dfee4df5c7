//! # Strata Router Errors
use thiserror::Error;

use crate::kernel::phase::KernelPhase;

#[derive(Debug, Error)]
pub enum RouterError {
    /// Another route already uses the candidate's path or non-empty name.
    /// Both routes are carried in their JSON form.
    #[error("Cannot add route {route}: another route has the same name or path: {existing}")]
    RouteConflict { route: String, existing: String },

    #[error("Parameter \"{param}\" does not exist in the route path definition '{path}'")]
    MissingParam { param: String, path: String },

    #[error("No route is registered under the name or path '{key}'")]
    RouteNotFound { key: String },

    #[error("Cannot {operation} during {phase}; routes must be added before the kernel is running")]
    Stage { operation: String, phase: KernelPhase },
}
