//! # Execute a single work item.
//!
//! Runs one dequeued [`WorkItem`] under its effective cancellation signal,
//! then routes the outcome to metrics and the event bus.
//!
//! ## Event flow
//! ```text
//! JobDequeued ──► signal.scope(item.execute(token))
//!                      │  (bridge settles the caller's handle in here)
//!                      ├─ Succeeded  → completed += 1, JobSucceeded
//!                      ├─ Failed(r)  → failed += 1,    JobFailed(reason = r)
//!                      └─ Cancelled  → cancelled += 1, JobCancelled
//! ```
//!
//! ## Rules
//! - Publishes **exactly one** terminal event per item.
//! - The item is in the in-flight set from dequeue until its handle is settled.
//! - Nothing here can fail: job errors and panics are already outcomes.

use crate::core::engine::Shared;
use crate::events::{Event, EventKind};
use crate::jobs::{EffectiveSignal, Outcome, WorkItem};

/// Executes `item` on worker `worker` and records the outcome.
pub(crate) async fn execute(item: WorkItem, worker: usize, shared: &Shared) {
    let id = item.id();
    let kind = item.kind().clone();

    shared
        .bus
        .publish_item(EventKind::JobDequeued, &item, |ev| ev.with_worker(worker));

    let signal = EffectiveSignal::compose(
        &shared.token,
        item.caller(),
        shared.cfg.use_global_stopping_signal,
    );
    let ctx = signal.token();

    shared.inflight.insert(id, kind.clone());
    let outcome = signal.scope(item.execute(ctx)).await;
    shared.inflight.remove(id);

    let ev = match outcome {
        Outcome::Succeeded => {
            shared.metrics.record_completed();
            Event::new(EventKind::JobSucceeded)
        }
        Outcome::Failed(reason) => {
            shared.metrics.record_failed();
            Event::new(EventKind::JobFailed).with_reason(reason)
        }
        Outcome::Cancelled => {
            shared.metrics.record_cancelled();
            Event::new(EventKind::JobCancelled)
        }
    };
    shared.bus.publish(ev.with_job(id, kind).with_worker(worker));
}
