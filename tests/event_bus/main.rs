//! Event Bus Tests
//!
//! End-to-end behavior of the bus facades: dispatch order, one-shot and
//! catch-all subscriptions, deferred batching, consumer binding and typed
//! envelopes.

mod binder;
mod deferred;
