//! Engine core: queue, workers and lifecycle.
//!
//! The public API from this module is [`Engine`] (built through
//! [`EngineBuilder`]) plus the [`HostedService`] contract it implements.
//!
//! Internal modules:
//! - [`queue`]: job queue with the full-queue policies;
//! - [`worker`]: one sequential queue consumer;
//! - [`runner`]: executes one work item and records its outcome;
//! - [`lifecycle`]: `Created → Starting → Running → Stopping → Stopped`;
//! - [`metrics`]: submission/outcome counters;
//! - [`inflight`]: jobs currently executing, reported on shutdown timeout;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod engine;
mod hosting;
mod inflight;
mod lifecycle;
mod metrics;
mod queue;
mod runner;
mod shutdown;
mod worker;

pub use builder::EngineBuilder;
pub use engine::Engine;
pub use hosting::HostedService;
pub use lifecycle::LifecycleState;
pub use metrics::MetricsSnapshot;
