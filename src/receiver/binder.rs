//! Declarative consumer binding.
//!
//! A consumer lists its handler methods once, in
//! [`EventConsumer::declare`]. [`Receiver::register_handler`] subscribes all of
//! them as one unit and [`Receiver::unregister_handler`] removes exactly the
//! handlers it created.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use event_relay::{BusEvent, EventConsumer, HandlerTable, Receiver};
//!
//! #[derive(Default)]
//! struct Session {
//!     logins: Cell<u32>,
//! }
//!
//! impl Session {
//!     fn on_login(&self, _event: &BusEvent) {
//!         self.logins.set(self.logins.get() + 1);
//!     }
//! }
//!
//! impl EventConsumer for Session {
//!     fn declare(table: &mut HandlerTable<Self>) {
//!         table.on("login", "on_login", Self::on_login);
//!     }
//! }
//!
//! let receiver = Receiver::new();
//! let session = Rc::new(Session::default());
//! receiver.register_handler(&session, false).unwrap();
//!
//! receiver.dispatch_event("login", Default::default()).unwrap();
//! assert_eq!(session.logins.get(), 1);
//!
//! receiver.unregister_handler(&session).unwrap();
//! assert!(receiver.is_empty());
//! ```

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::rc::Rc;

use super::handler::{Handler, HandlerResult, IntoHandlerResult};
use super::registry::Receiver;
use crate::error::BusError;
use crate::event::{BusEvent, Names};

/// A type whose handler methods can be bound to a receiver as a unit.
pub trait EventConsumer: 'static {
    /// Fill `table` with this type's handler methods.
    fn declare(table: &mut HandlerTable<Self>)
    where
        Self: Sized;
}

struct Declaration<T> {
    method: &'static str,
    events: Names,
    /// 0 for the consumer's own methods, 1 and up for inherited ones.
    depth: usize,
    invoke: Rc<dyn Fn(&T, &BusEvent) -> HandlerResult>,
}

/// The handler declarations of one consumer type.
pub struct HandlerTable<T> {
    declarations: Vec<Declaration<T>>,
}

impl<T: 'static> HandlerTable<T> {
    fn new() -> Self {
        Self {
            declarations: Vec::new(),
        }
    }

    /// Declare `method` as the handler for `events`.
    ///
    /// `name` identifies the method in logs and errors.
    pub fn on<F, R>(&mut self, events: impl Into<Names>, name: &'static str, method: F) -> &mut Self
    where
        F: Fn(&T, &BusEvent) -> R + 'static,
        R: IntoHandlerResult,
    {
        self.declarations.push(Declaration {
            method: name,
            events: events.into(),
            depth: 0,
            invoke: Rc::new(move |consumer: &T, event: &BusEvent| {
                method(consumer, event).into_handler_result()
            }),
        });
        self
    }

    /// Inherit the declarations of a component consumer reached through
    /// `project`.
    ///
    /// Inherited declarations are bound only when registration asks for
    /// ancestors.
    pub fn inherit<P: EventConsumer>(&mut self, project: fn(&T) -> &P) -> &mut Self {
        for parent in HandlerTable::<P>::of().declarations {
            let invoke = parent.invoke;
            self.declarations.push(Declaration {
                method: parent.method,
                events: parent.events,
                depth: parent.depth + 1,
                invoke: Rc::new(move |consumer: &T, event: &BusEvent| {
                    invoke(project(consumer), event)
                }),
            });
        }
        self
    }

    /// Number of declarations, inherited ones included.
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl<T: EventConsumer> HandlerTable<T> {
    /// The declarations of `T`.
    pub fn of() -> Self {
        let mut table = Self::new();
        T::declare(&mut table);
        table
    }
}

/// Handlers bound for one consumer, by event name.
///
/// The record owns a reference to the consumer, so the address it is keyed by
/// stays allocated even when no handler was bound.
pub(crate) struct BindingRecord {
    consumer: &'static str,
    _owner: Rc<dyn Any>,
    handlers: HashMap<String, Vec<Handler>>,
}

fn consumer_key<T>(consumer: &Rc<T>) -> usize {
    Rc::as_ptr(consumer) as *const () as usize
}

impl Receiver {
    /// Bind every handler `consumer` declares.
    ///
    /// Inherited declarations (see [`HandlerTable::inherit`]) are included
    /// when `include_ancestors` is set. Nothing is subscribed when an error is
    /// returned.
    pub fn register_handler<T: EventConsumer>(
        &self,
        consumer: &Rc<T>,
        include_ancestors: bool,
    ) -> Result<(), BusError> {
        let key = consumer_key(consumer);
        let consumer_name = type_name::<T>();

        if self.inner.bindings.borrow().contains_key(&key) {
            return Err(BusError::AlreadyRegistered {
                consumer: consumer_name,
                receiver: self.id(),
            });
        }

        let table = HandlerTable::<T>::of();
        let declarations: Vec<_> = table
            .declarations
            .into_iter()
            .filter(|d| d.depth == 0 || include_ancestors)
            .collect();

        if let Some(empty) = declarations.iter().find(|d| d.events.is_empty()) {
            return Err(BusError::InvalidArgument(format!(
                "handler {}::{} declares no events",
                consumer_name, empty.method
            )));
        }

        let mut record = BindingRecord {
            consumer: consumer_name,
            _owner: Rc::clone(consumer) as Rc<dyn Any>,
            handlers: HashMap::new(),
        };

        for declaration in declarations {
            let target = Rc::clone(consumer);
            let invoke = declaration.invoke;
            let handler = Handler::new(move |event: &BusEvent| invoke(&*target, event));

            for event in declaration.events.iter() {
                record
                    .handlers
                    .entry(event.to_string())
                    .or_default()
                    .push(handler.clone());
                self.on(event, &handler);
            }
        }

        tracing::debug!(
            receiver = %self.id(),
            consumer = consumer_name,
            events = record.handlers.len(),
            "registered event consumer"
        );

        self.inner.bindings.borrow_mut().insert(key, record);
        Ok(())
    }

    /// Remove every handler bound by [`Receiver::register_handler`].
    pub fn unregister_handler<T: EventConsumer>(&self, consumer: &Rc<T>) -> Result<(), BusError> {
        let record = self
            .inner
            .bindings
            .borrow_mut()
            .remove(&consumer_key(consumer))
            .ok_or_else(|| BusError::NotRegistered {
                consumer: type_name::<T>(),
                receiver: self.id(),
            })?;

        for (event, handlers) in &record.handlers {
            for handler in handlers {
                self.off(event, handler);
            }
        }

        tracing::debug!(
            receiver = %self.id(),
            consumer = record.consumer,
            "unregistered event consumer"
        );
        Ok(())
    }

    /// Whether `consumer` is currently bound on this receiver.
    pub fn is_registered<T: EventConsumer>(&self, consumer: &Rc<T>) -> bool {
        self.inner.bindings.borrow().contains_key(&consumer_key(consumer))
    }
}
