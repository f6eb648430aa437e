//! # Subscriber trait and event interest.
//!
//! A [`Subscribe`] implementor receives engine events on its own worker task.
//! Its [`Interest`] is checked by the fan-out *before* an event is queued, so
//! a lifecycle-only subscriber never spends queue slots on the per-job flood.

use async_trait::async_trait;

use crate::events::{Event, EventKind};

/// Which events a subscriber wants delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interest {
    /// Every event.
    #[default]
    All,
    /// Lifecycle and anything that went wrong: job failures and rejections,
    /// shutdown timeouts, subscriber trouble. Skips the per-job success path.
    Problems,
    /// Per-job events only.
    Jobs,
    /// Engine lifecycle events only.
    Lifecycle,
}

impl Interest {
    /// True if an event of this shape should be delivered.
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Interest::All => true,
            Interest::Jobs => event.is_job_event(),
            Interest::Lifecycle => is_lifecycle(event.kind),
            Interest::Problems => !event.is_job_event() || is_job_problem(event.kind),
        }
    }
}

fn is_lifecycle(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::EngineStarting
            | EventKind::EngineRunning
            | EventKind::EngineStopping
            | EventKind::AllDrained
            | EventKind::ShutdownTimeout
            | EventKind::EngineStopped
    )
}

fn is_job_problem(kind: EventKind) -> bool {
    matches!(kind, EventKind::JobFailed | EventKind::JobRejected)
}

/// Receiver of engine events.
///
/// Each subscriber gets a bounded queue and a worker task of its own; a slow
/// or panicking subscriber only loses its own events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Runs on the subscriber's worker task.
    async fn on_event(&self, event: &Event);

    /// Name used in logs and in overflow/panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Events this subscriber wants. Defaults to [`Interest::All`].
    fn interest(&self) -> Interest {
        Interest::All
    }

    /// Queue capacity (at least 1). Events beyond it are dropped and counted.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
