//! # Completion bridge: the closure-wrapped job.
//!
//! [`Bridge`] owns a caller's job closure together with the [`Completion`] of
//! that submission. Once boxed as a [`Runnable`] it is type-erased, so the
//! queue and workers handle every job the same way, while the typed value
//! still reaches the caller through the completion.
//!
//! ## Settlement rules
//! ```text
//! job(ctx).await
//!   ├─ Ok(v)                    → completion.succeed(v)   → Outcome::Succeeded
//!   ├─ Err(JobError::Canceled)  → completion.cancel()     → Outcome::Cancelled
//!   ├─ Err(e)                   → completion.fail(e)      → Outcome::Failed(reason)
//!   └─ panic                    → completion.fail(Panicked) → Outcome::Failed(reason)
//!
//! never run (evicted / rejected / shutdown) → Runnable::abandon(err) → completion.fail(err)
//! ```
//!
//! Settlement happens inside the returned future, before the worker loop regains
//! control, so nothing the loop does afterwards can leave a handle unsettled.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::JobError;
use crate::jobs::{Completion, panic_message};

/// Untyped result of one execution, for metrics and events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Succeeded,
    Failed(Arc<str>),
    Cancelled,
}

/// A type-erased job that settles its own completion.
pub(crate) trait Runnable: Send + 'static {
    /// Runs the job with its effective signal and settles the completion.
    fn run(self: Box<Self>, ctx: CancellationToken) -> BoxFuture<'static, Outcome>;

    /// Settles the completion with `err` without running the job.
    fn abandon(self: Box<Self>, err: JobError);
}

/// Job closure bundled with the completion it settles.
pub(crate) struct Bridge<F, T> {
    job: F,
    completion: Completion<T>,
}

impl<F, T> Bridge<F, T> {
    pub(crate) fn new(job: F, completion: Completion<T>) -> Self {
        Self { job, completion }
    }
}

impl<F, Fut, T> Runnable for Bridge<F, T>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, JobError>> + Send + 'static,
    T: Send + 'static,
{
    fn run(self: Box<Self>, ctx: CancellationToken) -> BoxFuture<'static, Outcome> {
        let Bridge {
            job,
            mut completion,
        } = *self;

        Box::pin(async move {
            // The closure call sits inside the guarded future so a panic while
            // building the job future is caught the same way as one while polling it.
            let res = AssertUnwindSafe(async move { job(ctx).await })
                .catch_unwind()
                .await;

            match res {
                Ok(Ok(value)) => {
                    completion.succeed(value);
                    Outcome::Succeeded
                }
                Ok(Err(JobError::Canceled)) => {
                    completion.cancel();
                    Outcome::Cancelled
                }
                Ok(Err(err)) => {
                    let reason: Arc<str> = err.to_string().into();
                    completion.fail(err);
                    Outcome::Failed(reason)
                }
                Err(panic_err) => {
                    let err = JobError::Panicked {
                        info: panic_message(panic_err.as_ref()),
                    };
                    let reason: Arc<str> = err.to_string().into();
                    completion.fail(err);
                    Outcome::Failed(reason)
                }
            }
        })
    }

    fn abandon(self: Box<Self>, err: JobError) {
        let mut completion = self.completion;
        completion.fail(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobId;

    fn boxed<F, Fut, T>(job: F) -> (Box<dyn Runnable>, crate::JobHandle<T>)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, JobError>> + Send + 'static,
        T: Send + 'static,
    {
        let (completion, handle) = Completion::pair(JobId::new(1), "test");
        (Box::new(Bridge::new(job, completion)), handle)
    }

    #[tokio::test]
    async fn test_value_routes_to_handle() {
        let (job, handle) = boxed(|_ctx| async { Ok::<_, JobError>("done") });
        assert_eq!(job.run(CancellationToken::new()).await, Outcome::Succeeded);
        assert_eq!(handle.await, Ok("done"));
    }

    #[tokio::test]
    async fn test_observed_cancellation_is_cancelled() {
        let (job, handle) = boxed(|ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err::<(), _>(JobError::Canceled)
        });
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(job.run(token).await, Outcome::Cancelled);
        assert_eq!(handle.await, Err(JobError::Canceled));
    }

    #[tokio::test]
    async fn test_error_routes_to_failed() {
        let (job, handle) = boxed(|_ctx| async { Err::<(), _>(JobError::fail("disk full")) });
        let outcome = job.run(CancellationToken::new()).await;
        assert!(matches!(outcome, Outcome::Failed(ref r) if r.contains("disk full")));
        assert_eq!(handle.await, Err(JobError::fail("disk full")));
    }

    #[tokio::test]
    async fn test_panic_is_caught_as_failure() {
        let (job, handle) = boxed(|_ctx| async {
            if true {
                panic!("kaboom");
            }
            Ok::<(), JobError>(())
        });
        let outcome = job.run(CancellationToken::new()).await;
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(
            handle.await,
            Err(JobError::Panicked {
                info: "kaboom".into()
            })
        );
    }

    #[tokio::test]
    async fn test_abandon_without_running() {
        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = ran.clone();
        let (job, handle) = boxed(move |_ctx| async move {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok::<(), JobError>(())
        });
        job.abandon(JobError::Canceled);
        assert_eq!(handle.await, Err(JobError::Canceled));
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    }
}
