//! # FIFO job queue with a full-queue policy.
//!
//! [`Queue`] wraps an [`async_channel`] pair. The sender side takes
//! submissions, every worker holds a cloned receiver, and the queue keeps one
//! extra receiver of its own so it can evict the oldest item under
//! [`FullQueuePolicy::DropOldest`] and drain leftovers at the shutdown deadline.
//!
//! ## Push behavior
//! ```text
//! Unbounded                 → enqueue
//! Bounded, room             → enqueue
//! Bounded, full, Wait       → suspend until room, enqueue
//! Bounded, full, DropOldest → pop front (returned as evicted), retry
//! Bounded, full, Reject     → PushError::Full(item)
//! closed (any policy)       → PushError::Closed(item)
//! ```
//!
//! ## Rules
//! - Strict FIFO: workers receive items in enqueue order.
//! - `close()` stops new pushes; items already queued stay receivable.
//! - A rejected or closed push hands the item back, so the caller can settle it.

use async_channel::{Receiver, Sender, TryRecvError, TrySendError};

use crate::config::{FullQueuePolicy, QueueCapacity};
use crate::jobs::WorkItem;

/// Push failure; carries the item back to the submitter.
pub(crate) enum PushError {
    /// Queue full under [`FullQueuePolicy::RejectWithError`].
    Full(WorkItem),
    /// Queue closed for writes.
    Closed(WorkItem),
}

/// Multi-producer, multi-consumer job queue.
pub(crate) struct Queue {
    tx: Sender<WorkItem>,
    rx: Receiver<WorkItem>,
    policy: FullQueuePolicy,
}

impl Queue {
    /// Creates an open queue.
    pub(crate) fn new(capacity: QueueCapacity, policy: FullQueuePolicy) -> Self {
        let (tx, rx) = match capacity {
            QueueCapacity::Unbounded => async_channel::unbounded(),
            QueueCapacity::Bounded(n) => async_channel::bounded(n.max(1)),
        };
        Self { tx, rx, policy }
    }

    /// Places `item` at the back of the queue per the full-queue policy.
    ///
    /// Items evicted to make room (only under `DropOldest`) are moved into
    /// `evicted`, even when the push itself ends up failing; the caller settles them.
    pub(crate) async fn push(
        &self,
        item: WorkItem,
        evicted: &mut Vec<WorkItem>,
    ) -> Result<(), PushError> {
        let mut item = match self.tx.try_send(item) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Closed(item)) => return Err(PushError::Closed(item)),
            Err(TrySendError::Full(item)) => item,
        };

        match self.policy {
            FullQueuePolicy::Wait => self
                .tx
                .send(item)
                .await
                .map_err(|e| PushError::Closed(e.into_inner())),
            FullQueuePolicy::RejectWithError => Err(PushError::Full(item)),
            FullQueuePolicy::DropOldest => loop {
                match self.rx.try_recv() {
                    Ok(oldest) => evicted.push(oldest),
                    // A worker took the front in the meantime; room may exist now.
                    Err(TryRecvError::Empty) => tokio::task::yield_now().await,
                    Err(TryRecvError::Closed) => {}
                }
                match self.tx.try_send(item) {
                    Ok(()) => return Ok(()),
                    Err(TrySendError::Full(back)) => item = back,
                    Err(TrySendError::Closed(back)) => return Err(PushError::Closed(back)),
                }
            },
        }
    }

    /// Receiver handle for a worker.
    pub(crate) fn receiver(&self) -> Receiver<WorkItem> {
        self.rx.clone()
    }

    /// Closes the queue for writes. Returns `true` if this call closed it.
    pub(crate) fn close(&self) -> bool {
        self.tx.close()
    }

    /// Removes every item still queued.
    pub(crate) fn drain(&self) -> Vec<WorkItem> {
        let mut out = Vec::new();
        while let Ok(item) = self.rx.try_recv() {
            out.push(item);
        }
        out
    }

    /// Number of queued items.
    pub(crate) fn len(&self) -> usize {
        self.tx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;
    use crate::jobs::{Bridge, Completion, JobHandle, JobId};
    use futures::FutureExt;
    use tokio_util::sync::CancellationToken;

    fn item(id: u64) -> (WorkItem, JobHandle<u64>) {
        let (completion, handle) = Completion::pair(JobId::new(id), "q");
        let bridge = Bridge::new(
            move |_ctx: CancellationToken| async move { Ok::<_, JobError>(id) },
            completion,
        );
        let item = WorkItem::new(JobId::new(id), "q".into(), None, Box::new(bridge));
        (item, handle)
    }

    fn ids(items: &[WorkItem]) -> Vec<u64> {
        items.iter().map(|i| i.id().get()).collect()
    }

    async fn push(q: &Queue, it: WorkItem) -> Result<(), PushError> {
        let mut evicted = Vec::new();
        let res = q.push(it, &mut evicted).await;
        assert!(evicted.is_empty());
        res
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let q = Queue::new(QueueCapacity::Unbounded, FullQueuePolicy::Wait);
        for id in 1..=3 {
            assert!(push(&q, item(id).0).await.is_ok());
        }
        assert_eq!(ids(&q.drain()), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_reject_hands_item_back() {
        let q = Queue::new(QueueCapacity::Bounded(1), FullQueuePolicy::RejectWithError);
        assert!(push(&q, item(1).0).await.is_ok());
        match push(&q, item(2).0).await {
            Err(PushError::Full(back)) => assert_eq!(back.id(), JobId::new(2)),
            _ => panic!("expected Full"),
        }
        assert_eq!(q.len(), 1);
    }

    #[tokio::test]
    async fn test_drop_oldest_evicts_front() {
        let q = Queue::new(QueueCapacity::Bounded(2), FullQueuePolicy::DropOldest);
        let (a, ha) = item(1);
        assert!(push(&q, a).await.is_ok());
        assert!(push(&q, item(2).0).await.is_ok());

        let mut evicted = Vec::new();
        assert!(q.push(item(3).0, &mut evicted).await.is_ok());
        assert_eq!(ids(&evicted), vec![1]);
        for old in evicted {
            old.cancel();
        }
        assert_eq!(ha.now_or_never(), Some(Err(JobError::Canceled)));
        assert_eq!(ids(&q.drain()), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_wait_suspends_until_room() {
        let q = Queue::new(QueueCapacity::Bounded(1), FullQueuePolicy::Wait);
        assert!(push(&q, item(1).0).await.is_ok());

        let pending = push(&q, item(2).0);
        tokio::pin!(pending);
        assert!((&mut pending).now_or_never().is_none());

        let first = q.receiver().recv().await.ok().map(|i| i.id().get());
        assert_eq!(first, Some(1));
        assert!(pending.await.is_ok());
        assert_eq!(ids(&q.drain()), vec![2]);
    }

    #[tokio::test]
    async fn test_closed_rejects_but_keeps_queued() {
        let q = Queue::new(QueueCapacity::Bounded(4), FullQueuePolicy::Wait);
        assert!(push(&q, item(1).0).await.is_ok());
        assert!(q.close());
        assert!(!q.close());
        assert!(matches!(push(&q, item(2).0).await, Err(PushError::Closed(_))));
        assert_eq!(ids(&q.drain()), vec![1]);
    }
}
