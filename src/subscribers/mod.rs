//! # Event subscribers for the jobvisor engine.
//!
//! This module provides the [`Subscribe`] trait with its [`Interest`] filter,
//! the crate-private `SubscriberSet` fan-out, and the built-in [`LogWriter`]
//! that turns events into `tracing` records.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   submit()/Worker ── publish(Event) ──► Bus ──► SubscriberSet::listen ──► route
//!                                                                      │
//!                                                       ┌──────────────┼──────────┐
//!                                                       ▼              ▼          ▼
//!                                                   LogWriter       Custom A    Custom B
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use jobvisor::{Event, EventKind, Interest, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::JobFailed {
//!             // increment failure counter
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failure-counter" }
//!     fn interest(&self) -> Interest { Interest::Problems }
//! }
//! ```

mod log;
mod subscribe;
mod subscriber_set;

pub use log::LogWriter;
pub use subscribe::{Interest, Subscribe};
pub(crate) use subscriber_set::SubscriberSet;
