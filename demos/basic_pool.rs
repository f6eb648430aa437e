//! # Example: basic_pool
//!
//! Submits a batch of jobs to a small worker pool and awaits their results.
//!
//! Shows how to:
//! - Build and start an [`Engine`].
//! - Submit typed jobs and await each [`JobHandle`](jobvisor::JobHandle).
//! - Attach a custom [`Subscribe`] implementation.
//! - Stop with a drain deadline and read the final [`MetricsSnapshot`](jobvisor::MetricsSnapshot).
//!
//! ## Flow
//! ```text
//! submit(job) ×8 ──► Queue ──► Worker 0..3 ──► handle resolves
//!                                 └─► Bus ──► LogWriter, ProgressPrinter
//! stop(5s) ──► drain ──► Stopped
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example basic_pool
//! ```

use std::{sync::Arc, time::Duration};

use jobvisor::{
    Engine, EngineConfig, Event, EventKind, Interest, JobError, QueueCapacity, Subscribe,
    SubmitOptions,
};

/// Prints one line per finished job.
struct ProgressPrinter;

#[async_trait::async_trait]
impl Subscribe for ProgressPrinter {
    async fn on_event(&self, ev: &Event) {
        let job = ev.job.map(|id| id.to_string()).unwrap_or_default();
        match ev.kind {
            EventKind::JobSucceeded => {
                println!("[progress] done   {job} on worker {}", ev.worker.unwrap_or(0));
            }
            EventKind::JobFailed => println!(
                "[progress] failed {job}: {}",
                ev.reason.as_deref().unwrap_or("<none>")
            ),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "progress"
    }

    fn interest(&self) -> Interest {
        Interest::Jobs
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = EngineConfig {
        max_workers: 4,
        queue_capacity: QueueCapacity::Bounded(16),
        detailed_logging: true,
        ..EngineConfig::default()
    };
    let engine = Engine::builder(cfg)
        .with_subscribers(vec![Arc::new(ProgressPrinter)])
        .build()?;
    engine.start().await?;

    let mut handles = Vec::new();
    for n in 1..=8u64 {
        let handle = engine
            .submit_with(SubmitOptions::new("square"), move |ctx| async move {
                tokio::select! {
                    _ = ctx.cancelled() => Err(JobError::Canceled),
                    _ = tokio::time::sleep(Duration::from_millis(50 * n)) => {
                        if n == 5 {
                            Err(JobError::fail("five is unlucky"))
                        } else {
                            Ok(n * n)
                        }
                    }
                }
            })
            .await;
        handles.push(handle);
    }

    for handle in handles {
        let id = handle.id();
        match handle.await {
            Ok(v) => println!("[main] {id} = {v}"),
            Err(e) => println!("[main] {id} -> {}", e.as_label()),
        }
    }

    engine.stop(Duration::from_secs(5)).await?;
    let m = engine.metrics();
    println!(
        "[main] submitted={} completed={} failed={} cancelled={}",
        m.submitted, m.completed, m.failed, m.cancelled
    );
    Ok(())
}
