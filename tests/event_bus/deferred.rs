//! Deferred dispatch through `AsyncEventBus`.

use std::cell::RefCell;
use std::rc::Rc;

use event_relay::prelude::*;
use event_relay::{AsyncEventBus, BusError, BusEvent, Handler, ManualScheduler, Payload};

use crate::support::{init_tracing, user, Journal};

fn bus() -> (AsyncEventBus<ManualScheduler>, ManualScheduler) {
    init_tracing();
    let scheduler = ManualScheduler::new();
    (AsyncEventBus::new(scheduler.clone()), scheduler)
}

#[test]
fn batch_is_delivered_in_submission_order_once() {
    let (bus, scheduler) = bus();
    let journal = Journal::new();
    bus.on_all(&journal.handler("all"));

    bus.fire_async("a", Payload::new());
    bus.fire_async("b", Payload::new());
    bus.fire_async("c", Payload::new());

    assert!(journal.is_empty());
    assert_eq!(scheduler.pending(), 1);

    scheduler.run_until_idle();
    assert_eq!(journal.entries(), vec!["all:a", "all:b", "all:c"]);

    scheduler.run_until_idle();
    assert_eq!(journal.len(), 3);
}

#[test]
fn synchronous_fire_overtakes_pending_batch() {
    let (bus, scheduler) = bus();
    let journal = Journal::new();
    bus.on_all(&journal.handler("all"));

    bus.fire_async("queued", Payload::new());
    bus.fire("immediate", Payload::new()).unwrap();
    scheduler.run_pending();

    assert_eq!(journal.entries(), vec!["all:immediate", "all:queued"]);
}

#[test]
fn destroy_drops_pending_events() {
    let (bus, scheduler) = bus();
    let journal = Journal::new();
    bus.on("a", &journal.handler("h"));

    bus.fire_async("a", user("x"));
    bus.fire_async("a", user("y"));
    bus.destroy();

    assert_eq!(scheduler.run_until_idle(), 0);
    assert!(journal.is_empty());

    bus.fire_async("a", user("z"));
    assert_eq!(scheduler.run_until_idle(), 0);
    assert!(journal.is_empty());
}

#[test]
fn completion_callbacks_follow_their_event() {
    let (bus, scheduler) = bus();
    let journal = Journal::new();
    bus.on(["a", "b"], &journal.handler("h"));

    let log = journal.clone();
    bus.fire_async_with("a", Payload::new(), move || log.push("done:a"));
    let log = journal.clone();
    bus.fire_async_with("b", Payload::new(), move || log.push("done:b"));
    scheduler.run_pending();

    assert_eq!(
        journal.entries(),
        vec!["h:a", "done:a", "h:b", "done:b"]
    );
}

#[test]
fn failing_handler_does_not_stop_the_batch() {
    init_tracing();
    let scheduler = ManualScheduler::new();
    let reported: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = Rc::clone(&reported);
    let bus = AsyncEventBus::new(scheduler.clone()).with_error_reporter(move |error: &BusError| {
        let kind = match error {
            BusError::Dispatch { .. } => "dispatch",
            BusError::Callback { .. } => "callback",
            _ => "other",
        };
        sink.borrow_mut().push(format!("{}:{}", kind, error.event().unwrap_or("?")));
    });

    let journal = Journal::new();
    bus.on("good", &journal.handler("h"));
    bus.on(
        "bad",
        &Handler::new(|_: &BusEvent| -> Result<(), &'static str> { Err("handler broke") }),
    );

    let log = journal.clone();
    bus.fire_async_with("bad", Payload::new(), move || log.push("done:bad"));
    bus.fire_async_with("good", Payload::new(), || -> Result<(), &'static str> {
        Err("callback broke")
    });
    bus.fire_async("good", Payload::new());
    scheduler.run_pending();

    assert_eq!(journal.entries(), vec!["done:bad", "h:good", "h:good"]);
    assert_eq!(
        *reported.borrow(),
        vec!["dispatch:bad".to_string(), "callback:good".to_string()]
    );
}

#[test]
fn events_fired_during_a_flush_form_the_next_batch() {
    let scheduler = ManualScheduler::new();
    let bus = Rc::new(AsyncEventBus::new(scheduler.clone()));
    let journal = Journal::new();

    let weak = Rc::downgrade(&bus);
    let log = journal.clone();
    bus.on(
        "ping",
        &Handler::new(move |_: &BusEvent| {
            log.push("ping");
            if let Some(bus) = weak.upgrade() {
                bus.fire_async("pong", Payload::new());
            }
        }),
    );
    bus.on("pong", &journal.handler("h"));

    bus.fire_async("ping", Payload::new());
    bus.fire_async("ping", Payload::new());

    assert_eq!(scheduler.run_pending(), 1);
    assert_eq!(journal.entries(), vec!["ping", "ping"]);
    assert_eq!(bus.sender().pending_len(), 2);

    assert_eq!(scheduler.run_pending(), 1);
    assert_eq!(journal.entries(), vec!["ping", "ping", "h:pong", "h:pong"]);
}

#[test]
fn bus_reports_ordered_delivery() {
    let (bus, _) = bus();
    assert!(bus.is_ordered());
}
