//! # Cross-platform OS signal handling.
//!
//! [`wait_for_shutdown_signal`] completes with the [`ShutdownSignal`] that asked
//! the process to terminate. [`HostedService::run_until_signal`](crate::HostedService::run_until_signal)
//! turns it into a drain deadline:
//!
//! | Signal               | Drain                                          |
//! |----------------------|------------------------------------------------|
//! | Ctrl-C, `SIGINT`, `SIGTERM` | graceful, up to the host's deadline     |
//! | `SIGQUIT`            | none; queued jobs are cancelled at once        |
//!
//! **Unix:** `SIGINT`, `SIGTERM`, `SIGQUIT`. **Elsewhere:** Ctrl-C.

use std::time::Duration;

/// Signal that ended [`wait_for_shutdown_signal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ShutdownSignal {
    CtrlC,
    Interrupt,
    Terminate,
    Quit,
}

impl ShutdownSignal {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            ShutdownSignal::CtrlC => "ctrl_c",
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::Quit => "SIGQUIT",
        }
    }

    /// Drain deadline for `stop` after this signal.
    pub(crate) fn drain_deadline(&self, graceful: Duration) -> Duration {
        match self {
            ShutdownSignal::Quit => Duration::ZERO,
            _ => graceful,
        }
    }
}

/// Waits for a termination signal.
///
/// Returns `Err` if a listener cannot be registered.
#[cfg(unix)]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<ShutdownSignal> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let received = tokio::select! {
        res = tokio::signal::ctrl_c() => { res?; ShutdownSignal::CtrlC },
        _ = sigint.recv()  => ShutdownSignal::Interrupt,
        _ = sigterm.recv() => ShutdownSignal::Terminate,
        _ = sigquit.recv() => ShutdownSignal::Quit,
    };
    Ok(received)
}

/// Waits for a termination signal.
///
/// Returns `Err` if the Ctrl-C listener cannot be registered.
#[cfg(not(unix))]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<ShutdownSignal> {
    tokio::signal::ctrl_c().await?;
    Ok(ShutdownSignal::CtrlC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_skips_drain() {
        let graceful = Duration::from_secs(30);
        assert_eq!(ShutdownSignal::Quit.drain_deadline(graceful), Duration::ZERO);
        assert_eq!(ShutdownSignal::Terminate.drain_deadline(graceful), graceful);
        assert_eq!(ShutdownSignal::CtrlC.drain_deadline(graceful), graceful);
    }

    #[test]
    fn test_signal_names() {
        assert_eq!(ShutdownSignal::Interrupt.as_str(), "SIGINT");
        assert_eq!(ShutdownSignal::Quit.as_str(), "SIGQUIT");
    }
}
