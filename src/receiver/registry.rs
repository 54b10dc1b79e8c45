//! The handler registry: persistent, one-shot and catch-all handlers.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use uuid::Uuid;

use super::binder::BindingRecord;
use super::handler::{remove_first, Handler};
use super::subscription::Subscription;
use crate::error::BusError;
use crate::event::{BusEvent, Names, Payload};

#[derive(Default)]
pub(crate) struct HandlerSets {
    pub(crate) persistent: HashMap<String, Vec<Handler>>,
    pub(crate) one_shot: HashMap<String, Vec<Handler>>,
    pub(crate) catch_all: Vec<Handler>,
}

pub(crate) struct ReceiverInner {
    id: Uuid,
    pub(crate) handlers: RefCell<HandlerSets>,
    pub(crate) bindings: RefCell<HashMap<usize, BindingRecord>>,
}

impl ReceiverInner {
    pub(crate) fn off(&self, names: &Names, handler: &Handler) {
        let mut sets = self.handlers.borrow_mut();
        for name in names.iter() {
            remove_named(&mut sets.persistent, name, handler);
            remove_named(&mut sets.one_shot, name, handler);
        }
    }

    pub(crate) fn off_catch_all(&self, handler: &Handler) {
        remove_first(&mut self.handlers.borrow_mut().catch_all, handler);
    }

    fn off_all(&self, handler: &Handler) {
        let mut guard = self.handlers.borrow_mut();
        let sets = &mut *guard;
        for lists in [&mut sets.persistent, &mut sets.one_shot] {
            lists.retain(|_, handlers| {
                remove_first(handlers, handler);
                !handlers.is_empty()
            });
        }
        remove_first(&mut sets.catch_all, handler);
    }
}

/// Remove the first match under `name`, dropping the entry once it is empty.
fn remove_named(lists: &mut HashMap<String, Vec<Handler>>, name: &str, handler: &Handler) {
    if let Some(handlers) = lists.get_mut(name) {
        remove_first(handlers, handler);
        if handlers.is_empty() {
            lists.remove(name);
        }
    }
}

/// Handler registry of one bus.
///
/// Cloning a `Receiver` yields another handle to the same registry.
///
/// Dispatch order for an event `name` is fixed:
///
/// 1. one-shot handlers for `name`, in registration order. The whole one-shot
///    list is detached before the first of them runs, so each one-shot
///    subscription is delivered exactly once even when a handler fires `name`
///    again.
/// 2. persistent handlers for `name`, newest registration first.
/// 3. catch-all handlers, in registration order.
///
/// Handlers may subscribe, unsubscribe and fire from inside a dispatch. Such
/// changes apply to later dispatches, not to the one in progress.
#[derive(Clone)]
pub struct Receiver {
    pub(crate) inner: Rc<ReceiverInner>,
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new()
    }
}

impl Receiver {
    /// An empty registry with a fresh id.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ReceiverInner {
                id: Uuid::new_v4(),
                handlers: RefCell::new(HandlerSets::default()),
                bindings: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Unique identifier of this registry.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub(crate) fn downgrade(&self) -> Weak<ReceiverInner> {
        Rc::downgrade(&self.inner)
    }

    /// Subscribe `handler` to every name in `names` until it is removed.
    pub fn on(&self, names: impl Into<Names>, handler: &Handler) -> Subscription {
        let names = names.into();
        {
            let mut sets = self.inner.handlers.borrow_mut();
            for name in names.iter() {
                sets.persistent
                    .entry(name.to_string())
                    .or_default()
                    .push(handler.clone());
            }
        }
        Subscription::named(self.downgrade(), names, handler.clone())
    }

    /// Subscribe `handler` to the next dispatch of each name in `names`.
    pub fn one(&self, names: impl Into<Names>, handler: &Handler) -> Subscription {
        let names = names.into();
        {
            let mut sets = self.inner.handlers.borrow_mut();
            for name in names.iter() {
                sets.one_shot
                    .entry(name.to_string())
                    .or_default()
                    .push(handler.clone());
            }
        }
        Subscription::named(self.downgrade(), names, handler.clone())
    }

    /// Remove `handler` from the persistent and one-shot handlers of `names`.
    pub fn off(&self, names: impl Into<Names>, handler: &Handler) {
        self.inner.off(&names.into(), handler);
    }

    /// Subscribe `handler` to every event.
    ///
    /// The returned subscription only removes the catch-all registration.
    pub fn on_all(&self, handler: &Handler) -> Subscription {
        self.inner.handlers.borrow_mut().catch_all.push(handler.clone());
        Subscription::catch_all(self.downgrade(), handler.clone())
    }

    /// Detach `handler` completely: catch-all, and every persistent and
    /// one-shot list.
    pub fn off_all(&self, handler: &Handler) {
        self.inner.off_all(handler);
    }

    /// Build the envelope for `name` and run the matching handlers.
    ///
    /// The first failing handler stops the dispatch; its error is returned as
    /// [`BusError::Dispatch`].
    pub fn dispatch_event(&self, name: &str, payload: Payload) -> Result<(), BusError> {
        let event = BusEvent::new(name, payload);

        let (one_shot, persistent, catch_all) = {
            let mut sets = self.inner.handlers.borrow_mut();
            let one_shot = sets.one_shot.remove(name).unwrap_or_default();
            let persistent = sets.persistent.get(name).cloned().unwrap_or_default();
            (one_shot, persistent, sets.catch_all.clone())
        };

        tracing::trace!(
            receiver = %self.inner.id,
            event = name,
            one_shot = one_shot.len(),
            persistent = persistent.len(),
            catch_all = catch_all.len(),
            "dispatching event"
        );

        let handlers = one_shot
            .iter()
            .chain(persistent.iter().rev())
            .chain(catch_all.iter());

        for handler in handlers {
            handler.call(&event).map_err(|source| BusError::Dispatch {
                event: name.to_string(),
                source,
            })?;
        }

        Ok(())
    }

    /// Number of persistent plus one-shot handlers for `name`.
    pub fn handler_count(&self, name: &str) -> usize {
        let sets = self.inner.handlers.borrow();
        sets.persistent.get(name).map_or(0, Vec::len) + sets.one_shot.get(name).map_or(0, Vec::len)
    }

    /// Number of catch-all handlers.
    pub fn catch_all_count(&self) -> usize {
        self.inner.handlers.borrow().catch_all.len()
    }

    /// Whether no handler of any kind is subscribed.
    pub fn is_empty(&self) -> bool {
        let sets = self.inner.handlers.borrow();
        sets.catch_all.is_empty()
            && sets.persistent.values().all(Vec::is_empty)
            && sets.one_shot.values().all(Vec::is_empty)
    }

    /// Drop every handler and every consumer binding.
    pub fn destroy(&self) {
        // Handlers are dropped after the borrows end; a handler's drop glue
        // may touch the registry.
        let sets = std::mem::take(&mut *self.inner.handlers.borrow_mut());
        let bindings = std::mem::take(&mut *self.inner.bindings.borrow_mut());
        tracing::debug!(
            receiver = %self.inner.id,
            consumers = bindings.len(),
            "receiver destroyed"
        );
        drop(sets);
        drop(bindings);
    }
}
