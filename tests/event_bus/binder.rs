//! Consumer binding via `register_handler` / `unregister_handler`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use event_relay::prelude::*;
use event_relay::{
    AsyncEventBus, BusError, BusEvent, EventConsumer, HandlerTable, ManualScheduler, Payload,
    SimpleEventBus,
};

use crate::support::{user, Login};

#[derive(Default)]
struct Presence {
    online: RefCell<Vec<String>>,
}

impl Presence {
    fn on_login(&self, event: &BusEvent) -> Result<(), BusError> {
        let login = event.as_type::<Login>()?.payload()?;
        self.online.borrow_mut().push(login.user);
        Ok(())
    }

    fn on_logout(&self, event: &BusEvent) {
        let user = event.get("user").and_then(|u| u.as_str()).unwrap_or_default();
        self.online.borrow_mut().retain(|u| u != user);
    }
}

impl EventConsumer for Presence {
    fn declare(table: &mut HandlerTable<Self>) {
        table
            .on("login", "on_login", Self::on_login)
            .on(["logout", "kicked"], "on_logout", Self::on_logout);
    }
}

#[derive(Default)]
struct Metrics {
    events: Cell<u32>,
}

impl EventConsumer for Metrics {
    fn declare(table: &mut HandlerTable<Self>) {
        table.on(
            ["login", "logout"],
            "count",
            |metrics: &Metrics, _: &BusEvent| metrics.events.set(metrics.events.get() + 1),
        );
    }
}

/// A consumer built on top of another one.
#[derive(Default)]
struct Dashboard {
    presence: Presence,
    refreshes: Cell<u32>,
}

impl Dashboard {
    fn refresh(&self, _: &BusEvent) {
        self.refreshes.set(self.refreshes.get() + 1);
    }
}

fn presence_of(dashboard: &Dashboard) -> &Presence {
    &dashboard.presence
}

impl EventConsumer for Dashboard {
    fn declare(table: &mut HandlerTable<Self>) {
        table
            .on("login", "refresh", Self::refresh)
            .inherit(presence_of);
    }
}

#[test]
fn register_binds_every_declared_method() {
    let bus = SimpleEventBus::new();
    let presence = Rc::new(Presence::default());

    bus.register_handler(&presence, false).unwrap();
    bus.fire("login", user("a")).unwrap();
    bus.fire("login", user("b")).unwrap();
    bus.fire("kicked", user("a")).unwrap();

    assert_eq!(*presence.online.borrow(), vec!["b"]);
}

#[test]
fn register_then_unregister_is_net_zero() {
    let bus = SimpleEventBus::new();
    let presence = Rc::new(Presence::default());

    bus.register_handler(&presence, true).unwrap();
    assert_eq!(bus.receiver().handler_count("login"), 1);
    assert_eq!(bus.receiver().handler_count("kicked"), 1);

    bus.unregister_handler(&presence).unwrap();
    assert!(bus.receiver().is_empty());

    bus.fire("login", user("a")).unwrap();
    assert!(presence.online.borrow().is_empty());
}

#[test]
fn unregister_leaves_other_subscriptions_alone() {
    let bus = SimpleEventBus::new();
    let presence = Rc::new(Presence::default());
    let metrics = Rc::new(Metrics::default());

    bus.register_handler(&presence, false).unwrap();
    bus.register_handler(&metrics, false).unwrap();
    bus.unregister_handler(&presence).unwrap();

    bus.fire("login", user("a")).unwrap();
    assert_eq!(metrics.events.get(), 1);
    assert!(presence.online.borrow().is_empty());
}

#[test]
fn double_registration_is_rejected() {
    let bus = SimpleEventBus::new();
    let presence = Rc::new(Presence::default());

    bus.register_handler(&presence, false).unwrap();
    let err = bus.register_handler(&presence, false).unwrap_err();

    assert!(matches!(err, BusError::AlreadyRegistered { receiver, .. } if receiver == bus.receiver().id()));
    assert_eq!(bus.receiver().handler_count("login"), 1);
}

#[test]
fn unregistering_an_unknown_consumer_fails() {
    let bus = SimpleEventBus::new();
    let presence = Rc::new(Presence::default());

    assert!(matches!(
        bus.unregister_handler(&presence),
        Err(BusError::NotRegistered { .. })
    ));

    bus.register_handler(&presence, false).unwrap();
    bus.unregister_handler(&presence).unwrap();
    assert!(matches!(
        bus.unregister_handler(&presence),
        Err(BusError::NotRegistered { .. })
    ));
}

#[test]
fn one_consumer_on_independent_buses() {
    let scheduler = ManualScheduler::new();
    let first = SimpleEventBus::new();
    let second = AsyncEventBus::new(scheduler.clone());
    let presence = Rc::new(Presence::default());

    first.register_handler(&presence, false).unwrap();
    second.register_handler(&presence, false).unwrap();

    first.fire("login", user("a")).unwrap();
    second.fire_async("login", user("b"));
    scheduler.run_pending();
    assert_eq!(*presence.online.borrow(), vec!["a", "b"]);

    first.unregister_handler(&presence).unwrap();
    assert!(second.receiver().handler_count("login") == 1);
}

#[test]
fn inherited_declarations_follow_include_ancestors() {
    let bus = SimpleEventBus::new();

    let own_only = Rc::new(Dashboard::default());
    bus.register_handler(&own_only, false).unwrap();
    bus.fire("login", user("a")).unwrap();
    assert_eq!(own_only.refreshes.get(), 1);
    assert!(own_only.presence.online.borrow().is_empty());
    bus.unregister_handler(&own_only).unwrap();

    let with_ancestors = Rc::new(Dashboard::default());
    bus.register_handler(&with_ancestors, true).unwrap();
    bus.fire("login", user("a")).unwrap();
    assert_eq!(with_ancestors.refreshes.get(), 1);
    assert_eq!(*with_ancestors.presence.online.borrow(), vec!["a"]);
}

#[test]
fn handler_errors_from_bound_methods_propagate() {
    let bus = SimpleEventBus::new();
    let presence = Rc::new(Presence::default());
    bus.register_handler(&presence, false).unwrap();

    // missing "user" field: the typed decode fails inside the bound method
    let err = bus.fire("login", Payload::new()).unwrap_err();
    assert!(matches!(err, BusError::Dispatch { .. }));
}
