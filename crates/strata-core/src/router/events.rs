use std::any::Any;

use crate::event::Event;
use crate::router::route::Route;

/// Emitted by the router bundle once the kernel is `RUNNING`, carrying the
/// final route table.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingPreparationEvent {
    pub routes: Vec<Route>,
}

impl Event for RoutingPreparationEvent {
    fn name(&self) -> &'static str {
        "router.preparation"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
