//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the engine, its workers and
//! subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - `Bus` crate-private wrapper over `tokio::sync::broadcast`; `publish_item`
//!   stamps per-job events from a `WorkItem`
//!
//! ## Quick reference
//! - **Publishers**: `Engine` (submission, lifecycle), `Worker` loops and
//!   `runner::execute` (job outcomes), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the subscriber fan-out task, which routes by `Interest`, and
//!   receivers handed out by `Engine::subscribe`.

mod bus;
mod event;

pub(crate) use bus::Bus;
pub use event::{Event, EventKind};
