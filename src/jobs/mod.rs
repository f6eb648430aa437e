//! # Job abstractions: work items, handles and the completion bridge.
//!
//! This module provides the per-submission types:
//! - [`JobId`] - engine-scoped identifier of a submission
//! - [`JobHandle`] - the caller's future for a submission's outcome
//! - [`Completion`] - the settable side of a [`JobHandle`], settled at most once
//! - [`SubmitOptions`] - kind label and caller cancellation token for a submission
//!
//! Crate-private pieces:
//! - `Bridge` wraps the job closure together with its `Completion` (the closure-wrapped job)
//! - `WorkItem` is what travels through the queue
//! - `EffectiveSignal` composes the engine and caller tokens for one execution
//!
//! ```text
//! submit(job) ──► Completion::pair() ──► (Completion, JobHandle) ──► handle to caller
//!                       │
//!                       └──► Bridge { job, completion } ──► WorkItem ──► Queue
//!
//! Worker: WorkItem::execute(signal) ──► Bridge::run ──► completion.succeed/fail/cancel
//! ```

mod bridge;
mod completion;
mod item;
mod signal;

use std::any::Any;
use std::fmt;

pub(crate) use bridge::{Bridge, Outcome};
pub use completion::{Completion, JobHandle};
pub(crate) use item::WorkItem;
pub use item::SubmitOptions;
pub(crate) use signal::EffectiveSignal;

/// Engine-scoped identifier of one submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    /// Wraps a raw id.
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
