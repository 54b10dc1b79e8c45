use std::rc::Weak;

use super::handler::Handler;
use super::registry::ReceiverInner;
use crate::event::Names;

enum Scope {
    Named(Names),
    CatchAll,
}

/// Handle returned by `on`, `one` and `on_all`.
///
/// Dropping it keeps the subscription alive; call
/// [`Subscription::unsubscribe`] to remove it. A subscription does not keep
/// its receiver alive.
pub struct Subscription {
    receiver: Weak<ReceiverInner>,
    scope: Scope,
    handler: Handler,
}

impl Subscription {
    pub(crate) fn named(receiver: Weak<ReceiverInner>, names: Names, handler: Handler) -> Self {
        Self {
            receiver,
            scope: Scope::Named(names),
            handler,
        }
    }

    pub(crate) fn catch_all(receiver: Weak<ReceiverInner>, handler: Handler) -> Self {
        Self {
            receiver,
            scope: Scope::CatchAll,
            handler,
        }
    }

    /// The subscribed handler.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Remove the handler from the scope it was subscribed in.
    ///
    /// Equivalent to `off(names, handler)` for `on`/`one` subscriptions, and
    /// to removing the catch-all registration for `on_all`.
    pub fn unsubscribe(self) {
        let Some(receiver) = self.receiver.upgrade() else {
            return;
        };
        match &self.scope {
            Scope::Named(names) => receiver.off(names, &self.handler),
            Scope::CatchAll => receiver.off_catch_all(&self.handler),
        }
    }
}
