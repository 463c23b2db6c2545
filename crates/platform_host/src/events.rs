//! System event bus contracts used for external change notifications.

use std::{
    cell::RefCell,
    collections::HashMap,
    rc::{Rc, Weak},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A filesystem record was created.
pub const FS_CREATED: &str = "fs:created";
/// A filesystem record changed parent.
pub const FS_MOVED: &str = "fs:moved";
/// A filesystem record was deleted.
pub const FS_DELETED: &str = "fs:deleted";
/// A filesystem record was renamed.
pub const FS_RENAMED: &str = "fs:renamed";

/// Every filesystem change notification that invalidates desktop icons.
pub const FS_CHANGE_EVENTS: [&str; 4] = [FS_CREATED, FS_MOVED, FS_DELETED, FS_RENAMED];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Event delivered to bus subscribers.
pub struct SystemEvent {
    /// Event name, for example [`FS_CREATED`].
    pub name: String,
    /// Event-specific JSON payload.
    #[serde(default)]
    pub payload: Value,
}

impl SystemEvent {
    /// Creates an event with a payload.
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Shared event handler callback.
pub type EventHandler = Rc<dyn Fn(&SystemEvent)>;

/// Publish/subscribe bus for system-wide notifications.
pub trait EventBus {
    /// Registers `handler` for `event`. The handler stays registered while the returned
    /// [`Subscription`] is alive.
    fn on(&self, event: &str, handler: EventHandler) -> Subscription;

    /// Delivers `event` to every handler registered for its name.
    fn emit(&self, event: &SystemEvent);
}

/// Registration handle returned by [`EventBus::on`]; dropping it unsubscribes.
#[must_use = "dropping a subscription immediately unsubscribes the handler"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wraps a cancellation callback.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Removes the handler now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    handlers: HashMap<String, Vec<(u64, EventHandler)>>,
}

#[derive(Clone, Default)]
/// Single-threaded in-process event bus.
pub struct LocalEventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl LocalEventBus {
    /// Number of live handlers for `event`.
    pub fn handler_count(&self, event: &str) -> usize {
        self.inner
            .borrow()
            .handlers
            .get(event)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

fn remove_handler(inner: &Weak<RefCell<BusInner>>, event: &str, id: u64) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut inner = inner.borrow_mut();
    if let Some(handlers) = inner.handlers.get_mut(event) {
        handlers.retain(|(handler_id, _)| *handler_id != id);
        if handlers.is_empty() {
            inner.handlers.remove(event);
        }
    }
}

impl EventBus for LocalEventBus {
    fn on(&self, event: &str, handler: EventHandler) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            inner.next_id = inner.next_id.saturating_add(1);
            let id = inner.next_id;
            inner
                .handlers
                .entry(event.to_string())
                .or_default()
                .push((id, handler));
            id
        };
        let weak = Rc::downgrade(&self.inner);
        let event = event.to_string();
        Subscription::new(move || remove_handler(&weak, &event, id))
    }

    fn emit(&self, event: &SystemEvent) {
        // Handlers may subscribe or unsubscribe while running.
        let handlers: Vec<EventHandler> = self
            .inner
            .borrow()
            .handlers
            .get(&event.name)
            .map(|handlers| handlers.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();
        for handler in handlers {
            handler(event);
        }
    }
}
