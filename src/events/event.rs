//! # Runtime events emitted by the engine and its workers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Job events**: per-submission flow (submitted, dequeued, succeeded, failed, cancelled, evicted, rejected)
//! - **Lifecycle events**: engine state transitions and drain outcome
//! - **Subscriber events**: fan-out overflow and panics
//!
//! The [`Event`] struct carries additional metadata such as timestamps, job id,
//! job kind, worker index, queue wait time and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use jobvisor::{Event, EventKind, JobId};
//!
//! let ev = Event::new(EventKind::JobFailed)
//!     .with_job(JobId::new(7), "report")
//!     .with_reason("boom")
//!     .with_worker(2)
//!     .with_queued_for(Duration::from_millis(40));
//!
//! assert_eq!(ev.kind, EventKind::JobFailed);
//! assert_eq!(ev.job_kind.as_deref(), Some("report"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! assert_eq!(ev.queued_ms, Some(40));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::jobs::JobId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `job_kind`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber queue was full; events were dropped for that subscriber.
    ///
    /// Sets:
    /// - `job_kind`: subscriber name
    /// - `reason`: total events dropped for it so far
    SubscriberOverflow,

    // === Lifecycle events ===
    /// `start` called; workers are being spawned.
    ///
    /// Sets:
    /// - `worker`: number of workers to spawn
    EngineStarting,

    /// Every worker reported ready.
    EngineRunning,

    /// `stop` called; the queue is closed and draining.
    ///
    /// Sets:
    /// - `deadline_ms`: shutdown deadline (ms)
    EngineStopping,

    /// Queue drained and all workers exited within the deadline.
    AllDrained,

    /// Shutdown deadline exceeded; leftovers cancelled.
    ///
    /// Sets:
    /// - `deadline_ms`: shutdown deadline (ms)
    /// - `reason`: cancelled count and stuck jobs
    ShutdownTimeout,

    /// Engine reached its terminal state.
    EngineStopped,

    // === Job events ===
    /// Job placed on the queue.
    ///
    /// Sets:
    /// - `job`, `job_kind`
    JobSubmitted,

    /// Submission refused (queue full under reject policy, or engine closed).
    ///
    /// Sets:
    /// - `job`, `job_kind`
    /// - `reason`: rejection message
    JobRejected,

    /// Queued job evicted to make room under the drop-oldest policy.
    ///
    /// Sets:
    /// - `job`, `job_kind`
    /// - `queued_ms`: time spent queued before eviction
    JobEvicted,

    /// A worker picked the job up.
    ///
    /// Sets:
    /// - `job`, `job_kind`
    /// - `worker`: worker index
    /// - `queued_ms`: time spent queued
    JobDequeued,

    /// Job returned a value.
    ///
    /// Sets:
    /// - `job`, `job_kind`, `worker`
    JobSucceeded,

    /// Job failed or panicked.
    ///
    /// Sets:
    /// - `job`, `job_kind`, `worker`
    /// - `reason`: failure message
    JobFailed,

    /// Job settled as cancelled (observed its signal, or cancelled at the shutdown deadline).
    ///
    /// Sets:
    /// - `job`, `job_kind`
    /// - `worker`: worker index (absent when cancelled while still queued)
    JobCancelled,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Job id, if applicable.
    pub job: Option<JobId>,
    /// Job kind label (or subscriber name for subscriber events).
    pub job_kind: Option<Arc<str>>,
    /// Worker index, if applicable.
    pub worker: Option<usize>,
    /// Time the job spent queued, in milliseconds (compact).
    pub queued_ms: Option<u32>,
    /// Shutdown deadline in milliseconds (compact).
    pub deadline_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            job: None,
            job_kind: None,
            worker: None,
            queued_ms: None,
            deadline_ms: None,
            reason: None,
        }
    }

    /// Attaches a job id and kind label.
    #[inline]
    pub fn with_job(mut self, id: JobId, kind: impl Into<Arc<str>>) -> Self {
        self.job = Some(id);
        self.job_kind = Some(kind.into());
        self
    }

    /// Attaches a worker index.
    #[inline]
    pub fn with_worker(mut self, worker: usize) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Attaches the time spent queued (stored as milliseconds).
    #[inline]
    pub fn with_queued_for(mut self, d: Duration) -> Self {
        self.queued_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a shutdown deadline (stored as milliseconds).
    #[inline]
    pub fn with_deadline(mut self, d: Duration) -> Self {
        self.deadline_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event carrying the running drop count.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, dropped: u64) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} dropped={dropped}"));
        ev.job_kind = Some(subscriber.into());
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.job_kind = Some(subscriber.into());
        ev
    }

    /// True for per-job events.
    #[inline]
    pub fn is_job_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::JobSubmitted
                | EventKind::JobRejected
                | EventKind::JobEvicted
                | EventKind::JobDequeued
                | EventKind::JobSucceeded
                | EventKind::JobFailed
                | EventKind::JobCancelled
        )
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}
