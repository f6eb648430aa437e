//! # Engine event bus.
//!
//! [`Bus`] carries every [`Event`] the engine produces over one
//! `tokio::sync::broadcast` ring. Two kinds of receivers read it: the
//! engine's fan-out task (feeding subscribers) and callers of
//! [`Engine::subscribe`](crate::Engine::subscribe).
//!
//! ```text
//! submit()   ── JobSubmitted / JobRejected / JobEvicted ──┐
//! runner     ── JobDequeued / JobSucceeded / JobFailed ───┼──► Bus ──► fan-out ──► subscribers
//! start/stop ── Engine* / AllDrained / ShutdownTimeout ───┘       └──► Engine::subscribe()
//! ```
//!
//! Publishing never blocks a submitter or a worker. A receiver that falls
//! more than the ring capacity behind loses the oldest events (`Lagged`).

use tokio::sync::broadcast;

use super::event::{Event, EventKind};
use crate::jobs::WorkItem;

/// Broadcast channel for engine events.
#[derive(Clone, Debug)]
pub(crate) struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus whose ring holds `capacity` events (at least 1).
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes `ev`. Dropped when nobody listens.
    pub(crate) fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Publishes a per-job event stamped with `item`'s id, kind and time spent queued.
    ///
    /// `decorate` adds the fields specific to `kind` (worker, reason).
    pub(crate) fn publish_item(
        &self,
        kind: EventKind,
        item: &WorkItem,
        decorate: impl FnOnce(Event) -> Event,
    ) {
        let ev = Event::new(kind)
            .with_job(item.id(), item.kind().clone())
            .with_queued_for(item.queued_for());
        self.publish(decorate(ev));
    }

    /// Receiver for events published from now on.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;
    use crate::jobs::{Bridge, Completion, JobHandle, JobId};
    use tokio_util::sync::CancellationToken;

    fn item(id: u64) -> (WorkItem, JobHandle<()>) {
        let (completion, handle) = Completion::pair(JobId::new(id), "resize");
        let bridge = Bridge::new(
            |_ctx: CancellationToken| async { Ok::<_, JobError>(()) },
            completion,
        );
        let item = WorkItem::new(JobId::new(id), "resize".into(), None, Box::new(bridge));
        (item, handle)
    }

    #[tokio::test]
    async fn test_publish_item_stamps_job_fields() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let (item, _handle) = item(5);

        bus.publish_item(EventKind::JobDequeued, &item, |ev| ev.with_worker(3));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::JobDequeued);
        assert_eq!(ev.job, Some(JobId::new(5)));
        assert_eq!(ev.job_kind.as_deref(), Some("resize"));
        assert_eq!(ev.worker, Some(3));
        assert!(ev.queued_ms.is_some());
    }

    #[tokio::test]
    async fn test_slow_receiver_lags() {
        let bus = Bus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..3 {
            bus.publish(Event::new(EventKind::EngineRunning));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
    }
}
