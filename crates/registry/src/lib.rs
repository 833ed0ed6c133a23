//! The Match Registry (C5) and Timeout Scheduler (C6): the process-wide
//! index of live matches, the quick-match join queue, and the async wiring
//! that turns an armed [`rps_engine::Timer`] into a scheduled
//! `on_deadline` callback.
//!
//! A single `Arc`-shared owner of a `RwLock<HashMap<ID<_>, _>>` index that
//! spawns a task per lifecycle event. Each match is wrapped in its own
//! `Mutex` and driven through discrete request/response calls, since the
//! Command Surface (C8) is request/response rather than a continuously
//! streamed room.
mod registry;

pub use registry::Registry;
