//! # Single-assignment outcome cell.
//!
//! [`Completion`] and [`JobHandle`] are the two ends of one submission's result:
//! the engine keeps the `Completion` inside the queued job, the caller keeps the
//! `JobHandle` and awaits it.
//!
//! ## Terminal states
//! ```text
//! succeed(v)  ──► handle resolves Ok(v)
//! fail(e)     ──► handle resolves Err(e)
//! cancel()    ──► handle resolves Err(JobError::Canceled)
//! dropped     ──► handle resolves Err(JobError::Canceled)
//! ```
//!
//! ## Rules
//! - The first settlement wins; later calls return `false` and change nothing.
//! - A dropped `Completion` that was never settled counts as cancelled, so a
//!   job lost on shutdown never leaves its caller waiting forever.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::JobError;
use crate::jobs::JobId;

/// Settable side of a submission's outcome.
#[derive(Debug)]
pub struct Completion<T> {
    tx: Option<oneshot::Sender<Result<T, JobError>>>,
}

impl<T> Completion<T> {
    /// Creates a connected `(Completion, JobHandle)` pair.
    pub fn pair(id: JobId, kind: impl Into<Arc<str>>) -> (Completion<T>, JobHandle<T>) {
        let (tx, rx) = oneshot::channel();
        let handle = JobHandle {
            id,
            kind: kind.into(),
            rx,
        };
        (Completion { tx: Some(tx) }, handle)
    }

    /// Settles as succeeded. Returns `false` if already settled.
    pub fn succeed(&mut self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settles as failed. Returns `false` if already settled.
    pub fn fail(&mut self, err: JobError) -> bool {
        self.settle(Err(err))
    }

    /// Settles as cancelled. Returns `false` if already settled.
    pub fn cancel(&mut self) -> bool {
        self.settle(Err(JobError::Canceled))
    }

    /// True once any terminal state was set.
    pub fn is_settled(&self) -> bool {
        self.tx.is_none()
    }

    fn settle(&mut self, outcome: Result<T, JobError>) -> bool {
        match self.tx.take() {
            Some(tx) => {
                // The caller may have dropped its handle; the job still counts as settled.
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }
}

/// Caller side of a submission: a future resolving to the job's outcome.
///
/// Dropping the handle does not cancel the job; use a caller token in
/// [`SubmitOptions`](crate::SubmitOptions) for that.
///
/// ## Example
/// ```rust
/// use futures::FutureExt;
/// use jobvisor::{Completion, JobError, JobId};
///
/// let (mut completion, handle) = Completion::<u32>::pair(JobId::new(1), "demo");
/// assert!(completion.succeed(42));
/// assert!(!completion.cancel()); // already settled
/// assert_eq!(handle.now_or_never(), Some(Ok(42)));
/// ```
#[derive(Debug)]
#[must_use = "a JobHandle does nothing unless awaited; dropping it leaves the job running"]
pub struct JobHandle<T> {
    id: JobId,
    kind: Arc<str>,
    rx: oneshot::Receiver<Result<T, JobError>>,
}

impl<T> JobHandle<T> {
    /// Id assigned at submission.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Kind label given at submission.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

impl<T> Future for JobHandle<T> {
    type Output = Result<T, JobError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|res| res.unwrap_or(Err(JobError::Canceled)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[test]
    fn test_first_settlement_wins() {
        let (mut c, h) = Completion::pair(JobId::new(1), "t");
        assert!(c.succeed(7));
        assert!(c.is_settled());
        assert!(!c.cancel());
        assert!(!c.fail(JobError::fail("late")));
        assert_eq!(h.now_or_never(), Some(Ok(7)));
    }

    #[test]
    fn test_cancel_then_succeed_keeps_cancelled() {
        let (mut c, h) = Completion::pair(JobId::new(2), "t");
        assert!(c.cancel());
        assert!(!c.succeed(1));
        assert_eq!(h.now_or_never(), Some(Err(JobError::Canceled)));
    }

    #[test]
    fn test_dropped_completion_resolves_cancelled() {
        let (c, h) = Completion::<()>::pair(JobId::new(3), "t");
        drop(c);
        assert_eq!(h.now_or_never(), Some(Err(JobError::Canceled)));
    }

    #[test]
    fn test_unsettled_handle_is_pending() {
        let (_c, h) = Completion::<()>::pair(JobId::new(4), "report");
        assert_eq!(h.id(), JobId::new(4));
        assert_eq!(h.kind(), "report");
        assert!(h.now_or_never().is_none());
    }

    #[test]
    fn test_settle_after_handle_dropped() {
        let (mut c, h) = Completion::pair(JobId::new(5), "t");
        drop(h);
        assert!(c.fail(JobError::fail("nobody listening")));
        assert!(!c.succeed(()));
    }
}
