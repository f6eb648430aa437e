//! # Example: backpressure
//!
//! Floods a one-slot queue under each [`FullQueuePolicy`] and shows what
//! happens to the submissions that do not fit, then stops past a short
//! deadline to show leftover cancellation.
//!
//! ## Run
//! ```bash
//! cargo run --example backpressure
//! ```

use std::time::Duration;

use jobvisor::{Engine, EngineConfig, FullQueuePolicy, JobError, QueueCapacity, RuntimeError};

async fn flood(policy: FullQueuePolicy) -> anyhow::Result<()> {
    let cfg = EngineConfig {
        max_workers: 1,
        queue_capacity: QueueCapacity::Bounded(1),
        full_queue_policy: policy,
        ..EngineConfig::default()
    };
    let engine = Engine::builder(cfg).build()?;
    engine.start().await?;

    let mut handles = Vec::new();
    for n in 0..4u32 {
        let handle = engine
            .submit(move |ctx| async move {
                tokio::select! {
                    _ = ctx.cancelled() => Err(JobError::Canceled),
                    _ = tokio::time::sleep(Duration::from_millis(100)) => Ok(n),
                }
            })
            .await;
        handles.push(handle);
    }

    // Past the deadline, whatever is still queued is cancelled.
    match engine.stop(Duration::from_millis(150)).await {
        Ok(()) => println!("[{policy:?}] drained"),
        Err(e @ RuntimeError::ShutdownTimeout { .. }) => println!("[{policy:?}] {}", e.as_message()),
        Err(e) => return Err(e.into()),
    }

    for handle in handles {
        let id = handle.id();
        match handle.await {
            Ok(n) => println!("[{policy:?}]   {id} ok({n})"),
            Err(e) => println!("[{policy:?}]   {id} {}", e.as_label()),
        }
    }
    println!("[{policy:?}] {:?}", engine.metrics());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    for policy in [
        FullQueuePolicy::Wait,
        FullQueuePolicy::DropOldest,
        FullQueuePolicy::RejectWithError,
    ] {
        flood(policy).await?;
    }
    Ok(())
}
