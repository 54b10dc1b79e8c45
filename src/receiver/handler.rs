use std::fmt;
use std::rc::Rc;

use crate::error::BoxError;
use crate::event::BusEvent;

/// Result returned by handlers and completion callbacks.
pub type HandlerResult = Result<(), BoxError>;

/// Return types accepted from handler closures.
///
/// Lets a handler return `()` when it cannot fail, or any
/// `Result<(), E>` whose error converts into [`BoxError`].
pub trait IntoHandlerResult {
    /// Convert into the result the registry inspects.
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> HandlerResult {
        Ok(())
    }
}

impl<E: Into<BoxError>> IntoHandlerResult for Result<(), E> {
    fn into_handler_result(self) -> HandlerResult {
        self.map_err(Into::into)
    }
}

/// A shared event handler.
///
/// Clones refer to the same handler, so subscribing one clone and removing
/// another matches. Two handlers built from identical closures never do.
///
/// ```
/// use event_relay::{BusEvent, Handler};
///
/// let handler = Handler::new(|event: &BusEvent| println!("got {}", event.name()));
/// let same = handler.clone();
/// assert!(handler.ptr_eq(&same));
/// ```
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&BusEvent) -> HandlerResult>);

impl Handler {
    /// Wrap a closure. Each call creates a handler with its own identity.
    pub fn new<F, R>(handler: F) -> Self
    where
        F: Fn(&BusEvent) -> R + 'static,
        R: IntoHandlerResult,
    {
        Self(Rc::new(move |event: &BusEvent| {
            handler(event).into_handler_result()
        }))
    }

    /// Run the handler on `event`.
    pub fn call(&self, event: &BusEvent) -> HandlerResult {
        (self.0)(event)
    }

    /// Whether both values refer to the same handler.
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Remove the first occurrence of `handler` from `handlers`.
pub(crate) fn remove_first(handlers: &mut Vec<Handler>, handler: &Handler) -> bool {
    match handlers.iter().position(|h| h.ptr_eq(handler)) {
        Some(index) => {
            handlers.remove(index);
            true
        }
        None => false,
    }
}
