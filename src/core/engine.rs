//! # Engine: submission API, worker pool and lifecycle.
//!
//! The [`Engine`] owns the job queue, the worker pool, the per-engine metrics
//! and the event bus. Callers submit jobs and get a [`JobHandle`] back; the
//! host drives [`Engine::start`] and [`Engine::stop`].
//!
//! ## High-level architecture
//! ```text
//! submit(job) ──► Completion::pair ──► Bridge{job, completion} ──► WorkItem
//!                      │                                              │
//!                      ▼                                              ▼
//!                 JobHandle (caller)                     Queue::push (policy)
//!                                                          ├─ Ok        → JobSubmitted
//!                                                          ├─ evicted   → JobEvicted (cancelled)
//!                                                          ├─ Full      → JobRejected (QueueFull)
//!                                                          └─ Closed    → JobRejected (Closed)
//!
//! start():  spawn N × Worker::run ──► each reports ready ──► Running
//!
//! Worker i: recv ──► runner::execute ──► bridge settles handle ──► metrics + event
//!
//! stop(deadline):
//!   close queue ──► join workers within deadline
//!                     ├─ Ok        → AllDrained
//!                     └─ exceeded  → cancel engine token
//!                                    cancel still-queued items
//!                                    detach workers
//!                                    ShutdownTimeout (stuck = in-flight snapshot)
//!   ──► Stopped
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use jobvisor::{Engine, EngineConfig, JobError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = EngineConfig { max_workers: 2, ..EngineConfig::default() };
//!     let engine = Engine::builder(cfg).build()?;
//!     engine.start().await?;
//!
//!     let handle = engine.submit(|_ctx| async { Ok::<_, JobError>(21 * 2) }).await;
//!     assert_eq!(handle.await?, 42);
//!
//!     engine.stop(Duration::from_secs(5)).await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::core::builder::EngineBuilder;
use crate::core::inflight::InFlight;
use crate::core::lifecycle::{LifecycleState, StateCell};
use crate::core::metrics::{Metrics, MetricsSnapshot};
use crate::core::queue::{PushError, Queue};
use crate::core::worker::Worker;
use crate::error::{JobError, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::jobs::{Bridge, Completion, JobHandle, JobId, SubmitOptions, WorkItem};
use crate::subscribers::SubscriberSet;

/// State shared between the engine and its workers.
pub(crate) struct Shared {
    pub(crate) cfg: EngineConfig,
    pub(crate) bus: Bus,
    pub(crate) metrics: Metrics,
    pub(crate) inflight: InFlight,
    /// Engine-wide shutdown token.
    pub(crate) token: CancellationToken,
}

/// In-process async job execution engine.
pub struct Engine {
    shared: Arc<Shared>,
    queue: Queue,
    state: StateCell,
    workers: Mutex<JoinSet<()>>,
    next_id: AtomicU64,
    /// Stops the event listener task when the engine is dropped.
    listener_token: CancellationToken,
    /// Fired once the engine reaches `Stopped`.
    stopped: CancellationToken,
}

impl Engine {
    /// Creates a builder with the given configuration.
    pub fn builder(cfg: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(cfg)
    }

    /// Wires an engine around an already-validated config. Spawns the event listener.
    pub(crate) fn new_internal(cfg: EngineConfig, bus: Bus, subs: SubscriberSet) -> Self {
        let queue = Queue::new(cfg.queue_capacity, cfg.full_queue_policy);
        let listener_token = CancellationToken::new();
        subs.listen(listener_token.clone());

        Self {
            shared: Arc::new(Shared {
                cfg,
                bus,
                metrics: Metrics::default(),
                inflight: InFlight::default(),
                token: CancellationToken::new(),
            }),
            queue,
            state: StateCell::new(),
            workers: Mutex::new(JoinSet::new()),
            next_id: AtomicU64::new(0),
            listener_token,
            stopped: CancellationToken::new(),
        }
    }

    /// Submits a job with default [`SubmitOptions`] (kind `"job"`, no caller token).
    ///
    /// See [`Engine::submit_with`].
    pub async fn submit<F, Fut, T>(&self, job: F) -> JobHandle<T>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, JobError>> + Send + 'static,
        T: Send + 'static,
    {
        self.submit_with(SubmitOptions::default(), job).await
    }

    /// Submits a job and returns the handle to its outcome.
    ///
    /// No job code runs here. The call only suspends under
    /// [`FullQueuePolicy::Wait`](crate::FullQueuePolicy::Wait) while a bounded
    /// queue is full. When the submission is refused (queue full under
    /// `RejectWithError`, or the engine is stopping) the returned handle is
    /// already settled with the error.
    ///
    /// The job receives its effective cancellation token; to finish as
    /// *cancelled* it returns `Err(JobError::Canceled)`.
    pub async fn submit_with<F, Fut, T>(&self, opts: SubmitOptions, job: F) -> JobHandle<T>
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, JobError>> + Send + 'static,
        T: Send + 'static,
    {
        let id = JobId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let kind: Arc<str> = Arc::from(opts.kind());
        let (completion, handle) = Completion::pair(id, kind.clone());
        let item = WorkItem::new(
            id,
            kind.clone(),
            opts.cancellation().cloned(),
            Box::new(Bridge::new(job, completion)),
        );

        let mut evicted = Vec::new();
        let pushed = self.queue.push(item, &mut evicted).await;
        for old in evicted {
            self.evict(old);
        }

        match pushed {
            Ok(()) => {
                self.shared.metrics.record_submitted();
                self.shared
                    .bus
                    .publish(Event::new(EventKind::JobSubmitted).with_job(id, kind));
            }
            Err(PushError::Full(item)) => {
                let capacity = self.shared.cfg.queue_capacity.bound().unwrap_or(0);
                self.reject(item, JobError::QueueFull { capacity });
            }
            Err(PushError::Closed(item)) => self.reject(item, JobError::Closed),
        }
        handle
    }

    /// Spawns the worker pool and waits until every worker reports ready.
    ///
    /// Bounded by [`EngineConfig::start_timeout`]. A failed start is fatal:
    /// the engine ends up `Stopped` and queued jobs are cancelled.
    pub async fn start(&self) -> Result<(), RuntimeError> {
        if let Err(state) = self
            .state
            .transition(LifecycleState::Created, LifecycleState::Starting)
        {
            return Err(RuntimeError::InvalidState {
                action: "start",
                state: state.as_str(),
            });
        }

        let expected = self.shared.cfg.max_workers;
        let timeout = self.shared.cfg.start_timeout;
        self.shared
            .bus
            .publish(Event::new(EventKind::EngineStarting).with_worker(expected));

        let (ready_tx, mut ready_rx) = mpsc::channel(expected);
        {
            let mut set = self.workers.lock().await;
            for index in 0..expected {
                let worker = Worker::new(index, self.queue.receiver(), Arc::clone(&self.shared));
                set.spawn(worker.run(ready_tx.clone()));
            }
        }
        drop(ready_tx);

        let mut ready = 0;
        let waited = tokio::time::timeout(timeout, async {
            while ready < expected && ready_rx.recv().await.is_some() {
                ready += 1;
            }
        })
        .await;

        let err = match waited {
            Ok(()) if ready == expected => {
                // Only start moves out of Starting, so this cannot race.
                let _ = self
                    .state
                    .transition(LifecycleState::Starting, LifecycleState::Running);
                self.shared.bus.publish(Event::new(EventKind::EngineRunning));
                return Ok(());
            }
            Ok(()) => RuntimeError::WorkersExited { ready, expected },
            Err(_elapsed) => RuntimeError::StartTimeout {
                timeout,
                ready,
                expected,
            },
        };

        self.abort_start().await;
        Err(err)
    }

    /// Stops accepting jobs and drains the queue within `deadline`.
    ///
    /// - Queued and in-flight jobs keep running until the queue is empty.
    /// - Past `deadline` the engine token is cancelled, still-queued jobs are
    ///   settled cancelled, and [`RuntimeError::ShutdownTimeout`] is returned.
    ///   The engine is `Stopped` either way.
    /// - Called before `start`, queued jobs are cancelled right away.
    /// - Called while another `stop` is in progress, waits for it to reach
    ///   `Stopped` and returns `Ok(())`; the first caller gets the drain result.
    /// - Called once stopped, returns `Ok(())`.
    pub async fn stop(&self, deadline: Duration) -> Result<(), RuntimeError> {
        let Some(from) = self.begin_stop()? else {
            self.stopped.cancelled().await;
            return Ok(());
        };

        self.shared
            .bus
            .publish(Event::new(EventKind::EngineStopping).with_deadline(deadline));
        self.queue.close();

        let res = match from {
            LifecycleState::Running => self.drain(deadline).await,
            _ => {
                self.cancel_queued();
                Ok(())
            }
        };

        self.finish();
        res
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.shared.cfg
    }

    /// Snapshot of counters and gauges.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared
            .metrics
            .snapshot(self.queue.len(), self.shared.inflight.len())
    }

    /// Receiver observing every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }

    /// Moves into `Stopping`; returns the state stopped from, or `None` if already stopping/stopped.
    fn begin_stop(&self) -> Result<Option<LifecycleState>, RuntimeError> {
        loop {
            let current = self.state.get();
            match current {
                LifecycleState::Created | LifecycleState::Running => {
                    if self
                        .state
                        .transition(current, LifecycleState::Stopping)
                        .is_ok()
                    {
                        return Ok(Some(current));
                    }
                }
                LifecycleState::Starting => {
                    return Err(RuntimeError::InvalidState {
                        action: "stop",
                        state: current.as_str(),
                    });
                }
                LifecycleState::Stopping | LifecycleState::Stopped => return Ok(None),
            }
        }
    }

    /// Waits for the workers to drain the closed queue, up to `deadline`.
    async fn drain(&self, deadline: Duration) -> Result<(), RuntimeError> {
        let mut set = self.workers.lock().await;
        let joined = tokio::time::timeout(deadline, async {
            while let Some(res) = set.join_next().await {
                if let Err(e) = res {
                    tracing::error!(error = %e, "worker task ended abnormally");
                }
            }
        })
        .await;

        match joined {
            Ok(()) => {
                self.shared.bus.publish(Event::new(EventKind::AllDrained));
                Ok(())
            }
            Err(_elapsed) => {
                self.shared.token.cancel();
                let cancelled = self.cancel_queued();
                let stuck = self.shared.inflight.snapshot();
                // Running jobs were told to stop through their signal; they settle on their own.
                set.detach_all();

                let err = RuntimeError::ShutdownTimeout {
                    deadline,
                    cancelled,
                    stuck,
                };
                self.shared.bus.publish(
                    Event::new(EventKind::ShutdownTimeout)
                        .with_deadline(deadline)
                        .with_reason(err.as_message()),
                );
                Err(err)
            }
        }
    }

    /// Tears down after a failed start.
    ///
    /// Workers are aborted, so jobs they were running never report an outcome;
    /// their handles resolve cancelled and they are accounted for here.
    async fn abort_start(&self) {
        self.shared.token.cancel();
        self.queue.close();
        self.workers.lock().await.shutdown().await;
        for (id, kind) in self.shared.inflight.take_all() {
            self.shared.metrics.record_cancelled();
            self.shared
                .bus
                .publish(Event::new(EventKind::JobCancelled).with_job(id, kind));
        }
        self.cancel_queued();
        self.finish();
    }

    /// Enters the terminal state and wakes pending `stop` callers.
    fn finish(&self) {
        self.shared.token.cancel();
        self.state.finish();
        self.shared.bus.publish(Event::new(EventKind::EngineStopped));
        self.stopped.cancel();
    }

    /// Settles every still-queued item as cancelled. Returns how many there were.
    fn cancel_queued(&self) -> usize {
        let items = self.queue.drain();
        let count = items.len();
        for item in items {
            self.shared
                .bus
                .publish_item(EventKind::JobCancelled, &item, |ev| ev);
            self.shared.metrics.record_cancelled();
            item.cancel();
        }
        count
    }

    fn evict(&self, item: WorkItem) {
        self.shared
            .bus
            .publish_item(EventKind::JobEvicted, &item, |ev| ev);
        self.shared.metrics.record_cancelled();
        item.cancel();
    }

    fn reject(&self, item: WorkItem, err: JobError) {
        let reason = err.to_string();
        self.shared
            .bus
            .publish_item(EventKind::JobRejected, &item, |ev| ev.with_reason(reason));
        self.shared.metrics.record_failed();
        item.reject(err);
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.queue.close();
        self.shared.token.cancel();
        self.listener_token.cancel();
    }
}
