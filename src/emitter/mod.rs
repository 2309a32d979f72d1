//! Synchronous, explicitly-scoped publish/subscribe.
//!
//! Each `Model` owns (or is injected with) an `EventBus<Record>` for its
//! lifecycle topics, and each `Collection` owns an `EventBus<CollectionEvent>`
//! for `add` / `remove`. There is no process-wide bus.

mod event_bus;

pub use event_bus::{EventBus, Listener};
