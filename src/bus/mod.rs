//! Bus facades.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                 AsyncEventBus / SimpleEventBus            │
//! │   fire / fire_async / on / one / off / register_handler   │
//! └───────────────────────────────────────────────────────────┘
//!          │ fire_async                      │ fire, on, off
//!          ▼                                 │
//! ┌──────────────────────┐                   │
//! │   DeferredSender     │                   │
//! │ queue + one flush    │── flush ──┐       │
//! └──────────────────────┘           ▼       ▼
//!          │ schedule_once   ┌───────────────────────────────┐
//!          ▼                 │           Receiver            │
//! ┌──────────────────────┐   │ one-shot → persistent (newest │
//! │ Scheduler (host)     │   │ first) → catch-all            │
//! │ Manual / Tokio / ... │   └───────────────────────────────┘
//! └──────────────────────┘
//! ```

mod async_bus;
mod simple;

pub use async_bus::AsyncEventBus;
pub use simple::SimpleEventBus;
