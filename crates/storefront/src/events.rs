//! Typed application events.
//!
//! The bus replaces the source system's custom DOM events: components emit
//! a typed [`AppEvent`] and downstream listeners (logo fixups, external
//! renderers) react. Dispatch is synchronous and single-threaded.

use std::cell::RefCell;

use chrono::{DateTime, Utc};

use ultre_core::ProductId;

/// Events broadcast across components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The settings modal committed its pending changes.
    SettingsSaved {
        /// Commit time, also stamped on the change-log batch.
        when: DateTime<Utc>,
    },
    /// A product card asked for the item-detail view, which the external
    /// renderer owns.
    ItemDetailRequested { id: ProductId },
}

type Listener = Box<dyn Fn(&AppEvent)>;

/// Synchronous broadcast bus.
///
/// Listeners run in subscription order on the emitting call stack. A
/// listener may emit further events but must not subscribe from within a
/// callback.
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<Vec<Listener>>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for all events.
    pub fn subscribe(&self, listener: impl Fn(&AppEvent) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Deliver `event` to every listener.
    pub fn emit(&self, event: &AppEvent) {
        for listener in self.listeners.borrow().iter() {
            listener(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_listeners_run_in_order() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |_| seen.borrow_mut().push(tag));
        }

        bus.emit(&AppEvent::SettingsSaved { when: Utc::now() });
        assert_eq!(*seen.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_every_listener_sees_every_event() {
        let bus = EventBus::new();
        let count = Rc::new(Cell::new(0_u32));

        let counter = Rc::clone(&count);
        bus.subscribe(move |_| counter.set(counter.get() + 1));

        bus.emit(&AppEvent::ItemDetailRequested {
            id: ProductId::new("p1"),
        });
        bus.emit(&AppEvent::SettingsSaved { when: Utc::now() });
        assert_eq!(count.get(), 2);
    }
}
