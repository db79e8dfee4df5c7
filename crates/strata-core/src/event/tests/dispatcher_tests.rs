use std::any::{Any, TypeId};

use crate::event::dispatcher::{EventDispatcher, sync_listener};
use crate::event::{Event, KernelBeforeInitEvent};

#[derive(Debug)]
struct Ping;

impl Event for Ping {
    fn name(&self) -> &'static str {
        "test.ping"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_register_assigns_increasing_ids() {
    let mut dispatcher = EventDispatcher::new();
    let first = dispatcher.register::<Ping>(sync_listener(|_: &Ping| Ok(())));
    let second = dispatcher.register::<Ping>(sync_listener(|_: &Ping| Ok(())));
    assert_eq!(first, 1);
    assert_eq!(second, 2);
    assert_eq!(dispatcher.count(TypeId::of::<Ping>()), 2);
}

#[test]
fn test_listeners_are_keyed_by_type() {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register::<Ping>(sync_listener(|_: &Ping| Ok(())));
    assert_eq!(dispatcher.count(TypeId::of::<KernelBeforeInitEvent>()), 0);
    assert!(dispatcher.snapshot(TypeId::of::<KernelBeforeInitEvent>()).is_empty());
}

#[test]
fn test_unregister() {
    let mut dispatcher = EventDispatcher::new();
    let id = dispatcher.register::<Ping>(sync_listener(|_: &Ping| Ok(())));
    assert!(dispatcher.unregister(id));
    assert!(!dispatcher.unregister(id));
    assert_eq!(dispatcher.count(TypeId::of::<Ping>()), 0);
}

#[test]
fn test_snapshot_keeps_registration_order() {
    let mut dispatcher = EventDispatcher::new();
    let ids: Vec<_> = (0..3)
        .map(|_| dispatcher.register::<Ping>(sync_listener(|_: &Ping| Ok(()))))
        .collect();
    let snapshot: Vec<_> = dispatcher
        .snapshot(TypeId::of::<Ping>())
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(snapshot, ids);
}
