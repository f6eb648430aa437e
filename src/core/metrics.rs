//! # Per-engine counters.
//!
//! Counters are fields of one engine instance (no process-wide statics), so
//! several engines in one process never share numbers.
//!
//! | Counter     | Incremented when                                              |
//! |-------------|---------------------------------------------------------------|
//! | `submitted` | a job was placed on the queue                                 |
//! | `completed` | a job returned a value                                        |
//! | `failed`    | a job failed or panicked, or its submission was rejected      |
//! | `cancelled` | a job observed cancellation, was evicted, or was cancelled at the shutdown deadline |

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters updated from submitters and workers.
#[derive(Debug, Default)]
pub(crate) struct Metrics {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
}

impl Metrics {
    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, queued: usize, in_flight: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            queued,
            in_flight,
        }
    }
}

/// Point-in-time copy of an engine's counters and gauges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Jobs placed on the queue.
    pub submitted: u64,
    /// Jobs that returned a value.
    pub completed: u64,
    /// Jobs that failed, panicked, or were rejected at submission.
    pub failed: u64,
    /// Jobs settled as cancelled.
    pub cancelled: u64,
    /// Jobs waiting in the queue right now.
    pub queued: usize,
    /// Jobs executing right now.
    pub in_flight: usize,
}

impl MetricsSnapshot {
    /// Jobs that reached a terminal state.
    pub fn settled(&self) -> u64 {
        self.completed + self.failed + self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_independent() {
        let a = Metrics::default();
        let b = Metrics::default();
        a.record_submitted();
        a.record_completed();
        a.record_failed();
        a.record_cancelled();

        let snap = a.snapshot(3, 1);
        assert_eq!(snap.submitted, 1);
        assert_eq!(snap.settled(), 3);
        assert_eq!((snap.queued, snap.in_flight), (3, 1));
        assert_eq!(b.snapshot(0, 0), MetricsSnapshot::default());
    }
}
