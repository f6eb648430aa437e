//! # Worker: one sequential consumer of the job queue.
//!
//! The engine starts `max_workers` of these. Concurrency comes from the
//! number of workers; a single worker never runs two items at once.
//!
//! ## Loop
//! ```text
//! report ready
//! loop {
//!   ├─► wait for: engine token cancelled ─► exit
//!   │             queue item             ─► runner::execute(item) (to completion)
//!   │             queue closed and empty ─► exit
//!   └─► repeat
//! }
//! ```
//!
//! ## Rules
//! - Items are received in queue (FIFO) order.
//! - Cancellation is checked between items only; a running job is never interrupted
//!   by the loop, it sees the engine token through its effective signal.
//! - A job's failure or panic is an outcome, not a loop error: the worker keeps going.

use std::sync::Arc;

use async_channel::Receiver;
use tokio::sync::mpsc;

use crate::core::{engine::Shared, runner};
use crate::jobs::WorkItem;

/// Queue consumer bound to one worker index.
pub(crate) struct Worker {
    index: usize,
    rx: Receiver<WorkItem>,
    shared: Arc<Shared>,
}

impl Worker {
    pub(crate) fn new(index: usize, rx: Receiver<WorkItem>, shared: Arc<Shared>) -> Self {
        Self { index, rx, shared }
    }

    /// Reports ready on `ready`, then consumes the queue until it closes or the engine token fires.
    pub(crate) async fn run(self, ready: mpsc::Sender<usize>) {
        if ready.send(self.index).await.is_err() {
            // Start gave up waiting; the engine is already tearing down.
            return;
        }
        drop(ready);

        loop {
            let item = tokio::select! {
                biased;
                _ = self.shared.token.cancelled() => break,
                res = self.rx.recv() => match res {
                    Ok(item) => item,
                    Err(_closed) => break,
                },
            };
            runner::execute(item, self.index, &self.shared).await;
        }
        tracing::trace!(worker = self.index, "worker exited");
    }
}
