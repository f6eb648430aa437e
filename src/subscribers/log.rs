//! # LogWriter: `tracing` output for engine events
//!
//! The built-in subscriber every engine installs. It maps [`Event`]s onto
//! `tracing` macros at levels that match their weight:
//!
//! | Event                                         | Level | Gated by `detailed` |
//! |-----------------------------------------------|-------|---------------------|
//! | `JobSubmitted`, `JobDequeued`, `JobSucceeded` | debug | yes                 |
//! | `JobCancelled`, `JobEvicted`                  | info  | yes                 |
//! | `JobFailed`, `JobRejected`                    | warn  | no                  |
//! | lifecycle transitions                         | info  | no                  |
//! | `ShutdownTimeout`, subscriber overflow/panic  | warn  | no                  |
//!
//! The gate is the writer's [`Interest`]: `All` when detailed, `Problems` otherwise.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::{Interest, Subscribe};

/// Event writer subscriber backed by `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter {
    detailed: bool,
}

impl LogWriter {
    /// Construct a new [`LogWriter`]; `detailed` enables per-job success-path records.
    #[must_use]
    pub fn new(detailed: bool) -> Self {
        Self { detailed }
    }

}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let job = e.job.map(|id| id.get());
        let kind = e.job_kind.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::JobSubmitted => {
                tracing::debug!(job, kind, "job submitted");
            }
            EventKind::JobDequeued => {
                tracing::debug!(job, kind, worker = e.worker, queued_ms = e.queued_ms, "job dequeued");
            }
            EventKind::JobSucceeded => {
                tracing::debug!(job, kind, worker = e.worker, "job succeeded");
            }
            EventKind::JobCancelled => {
                tracing::info!(job, kind, worker = e.worker, "job cancelled");
            }
            EventKind::JobEvicted => {
                tracing::info!(job, kind, queued_ms = e.queued_ms, "job evicted from full queue");
            }
            EventKind::JobFailed => {
                tracing::warn!(job, kind, worker = e.worker, reason, "job failed");
            }
            EventKind::JobRejected => {
                tracing::warn!(job, kind, reason, "job rejected");
            }
            EventKind::EngineStarting => {
                tracing::info!(workers = e.worker, "engine starting");
            }
            EventKind::EngineRunning => {
                tracing::info!("engine running");
            }
            EventKind::EngineStopping => {
                tracing::info!(deadline_ms = e.deadline_ms, "engine stopping, draining queue");
            }
            EventKind::AllDrained => {
                tracing::info!("queue drained within deadline");
            }
            EventKind::ShutdownTimeout => {
                tracing::warn!(deadline_ms = e.deadline_ms, reason, "shutdown deadline exceeded");
            }
            EventKind::EngineStopped => {
                tracing::info!("engine stopped");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(subscriber = kind, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!(subscriber = kind, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }

    fn interest(&self) -> Interest {
        if self.detailed {
            Interest::All
        } else {
            Interest::Problems
        }
    }
}
