//! # jobvisor
//!
//! **Jobvisor** is an in-process async job execution engine for Rust.
//!
//! Callers submit async jobs and get an awaitable handle to each job's
//! outcome. A fixed pool of workers pulls jobs from a (optionally bounded)
//! FIFO queue, so at most `max_workers` jobs run at once. Every job receives a
//! cancellation token composed from the engine's shutdown token and an
//! optional caller token; on stop the engine drains the queue up to a deadline.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!    submit(job)         submit(job)         submit_with(opts, job)
//!         │                   │                   │
//!         ▼                   ▼                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Engine                                                           │
//! │  - Completion::pair   (single-assignment result per job)          │
//! │  - Queue              (Unbounded | Bounded(n) + FullQueuePolicy)  │
//! │  - Metrics, InFlight  (counters, currently executing jobs)        │
//! │  - StateCell          (Created → Starting → Running → Stopping →  │
//! │                        Stopped)                                   │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │   Worker 0   │   │   Worker 1   │   │   Worker N   │   │
//!     │ (FIFO loop)  │   │ (FIFO loop)  │   │ (FIFO loop)  │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ JobDequeued      │ JobSucceeded     │ JobCancelled    │ JobSubmitted
//!      │ JobFailed        │ ...              │ ...             │ JobRejected
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │               (capacity: EngineConfig::bus_capacity)              │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                         ┌───────────────────┐
//!                         │  event listener   │
//!                         └─────────┬─────────┘
//!                                   ▼
//!                      Interest filter per subscriber
//!                            (per-sub queues)
//!                        ┌──────────┼──────────┐
//!                        ▼          ▼          ▼
//!                    LogWriter     sub1       subN
//! ```
//!
//! ### Job lifecycle
//! ```text
//! submit ──► queued ──► dequeued by worker ──► running ──► Succeeded
//!              │                                  ├──────► Failed (error or panic)
//!              │                                  └──────► Cancelled (observed signal)
//!              ├─ evicted (DropOldest)  ──► Cancelled
//!              ├─ rejected (full/closed) ─► Failed
//!              └─ still queued at stop deadline ─► Cancelled
//! ```
//!
//! ## Features
//! | Area              | Description                                                         | Key types                               |
//! |-------------------|---------------------------------------------------------------------|-----------------------------------------|
//! | **Submission**    | Submit closures, await typed outcomes                               | [`Engine`], [`JobHandle`]               |
//! | **Backpressure**  | Wait, drop the oldest, or reject when a bounded queue is full      | [`QueueCapacity`], [`FullQueuePolicy`]  |
//! | **Cancellation**  | Engine shutdown token composed with a per-job caller token          | [`SubmitOptions`]                       |
//! | **Lifecycle**     | Start with ready barrier, stop with bounded graceful drain          | [`LifecycleState`], [`HostedService`]   |
//! | **Observability** | Counters plus runtime events routed to subscribers by interest      | [`MetricsSnapshot`], [`Event`], [`Subscribe`], [`Interest`] |
//! | **Errors**        | Typed errors with stable labels                                     | [`RuntimeError`], [`JobError`]          |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use jobvisor::{Engine, EngineConfig, FullQueuePolicy, JobError, QueueCapacity, SubmitOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = EngineConfig {
//!         max_workers: 4,
//!         queue_capacity: QueueCapacity::Bounded(64),
//!         full_queue_policy: FullQueuePolicy::Wait,
//!         ..EngineConfig::default()
//!     };
//!     let engine = Engine::builder(cfg).build()?;
//!     engine.start().await?;
//!
//!     let handle = engine
//!         .submit_with(SubmitOptions::new("greet"), |token| async move {
//!             tokio::select! {
//!                 _ = token.cancelled() => Err(JobError::Canceled),
//!                 _ = tokio::time::sleep(Duration::from_millis(10)) => Ok("hello"),
//!             }
//!         })
//!         .await;
//!     assert_eq!(handle.await?, "hello");
//!
//!     engine.stop(Duration::from_secs(5)).await?;
//!     assert_eq!(engine.metrics().completed, 1);
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod jobs;
mod subscribers;

// ---- Public re-exports ----

pub use config::{EngineConfig, FullQueuePolicy, QueueCapacity};
pub use core::{Engine, EngineBuilder, HostedService, LifecycleState, MetricsSnapshot};
pub use error::{JobError, RuntimeError};
pub use events::{Event, EventKind};
pub use jobs::{Completion, JobHandle, JobId, SubmitOptions};
pub use subscribers::{Interest, LogWriter, Subscribe};
