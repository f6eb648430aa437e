//! # Host integration.
//!
//! [`HostedService`] is the start/stop contract a host process drives. The
//! [`Engine`] implements it, so a host can treat it like any other
//! long-running service and park on OS signals with
//! [`HostedService::run_until_signal`].

use std::time::Duration;

use async_trait::async_trait;

use crate::core::{engine::Engine, shutdown};
use crate::error::RuntimeError;

/// A service with an async start/stop lifecycle.
#[async_trait]
pub trait HostedService: Send + Sync {
    /// Brings the service up. Fatal errors are returned to the host.
    async fn start(&self) -> Result<(), RuntimeError>;

    /// Brings the service down within `deadline`.
    async fn stop(&self, deadline: Duration) -> Result<(), RuntimeError>;

    /// Starts the service, waits for SIGINT/SIGTERM/SIGQUIT (Ctrl-C elsewhere), then stops it.
    ///
    /// `deadline` bounds the drain; after `SIGQUIT` there is none and queued
    /// jobs are cancelled right away.
    async fn run_until_signal(&self, deadline: Duration) -> Result<(), RuntimeError> {
        self.start().await?;
        match shutdown::wait_for_shutdown_signal().await {
            Ok(sig) => {
                let deadline = sig.drain_deadline(deadline);
                tracing::info!(signal = sig.as_str(), ?deadline, "shutdown signal received");
                self.stop(deadline).await
            }
            Err(e) => {
                let err = RuntimeError::Signal {
                    error: e.to_string(),
                };
                tracing::error!(error = %err, "signal listener failed; stopping");
                self.stop(deadline).await?;
                Err(err)
            }
        }
    }
}

#[async_trait]
impl HostedService for Engine {
    async fn start(&self) -> Result<(), RuntimeError> {
        Engine::start(self).await
    }

    async fn stop(&self, deadline: Duration) -> Result<(), RuntimeError> {
        Engine::stop(self, deadline).await
    }
}
