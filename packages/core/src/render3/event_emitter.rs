//! Directive outputs.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::render3::interfaces::renderer::EventListener;
use crate::render3::value::Value;

type Subscribers = RefCell<Vec<(u64, EventListener)>>;

/// Multicast event source exposed by a directive as an output.
///
/// Clones share the same subscriber list.
#[derive(Clone, Default)]
pub struct EventEmitter {
    subscribers: Rc<Subscribers>,
    next_id: Rc<Cell<u64>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, value: &Value) {
        // Listeners may subscribe or unsubscribe while being notified.
        let listeners: Vec<EventListener> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(value);
        }
    }

    pub fn subscribe(&self, listener: EventListener) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, listener));
        Subscription {
            subscribers: Rc::downgrade(&self.subscribers),
            id,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("observers", &self.observer_count())
            .finish()
    }
}

#[derive(Debug)]
pub struct Subscription {
    subscribers: Weak<Subscribers>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}
