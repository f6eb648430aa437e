//! # Queued unit of work.
//!
//! A [`WorkItem`] pairs a type-erased job with the metadata the engine needs
//! for diagnostics. It has no setters: [`WorkItem::execute`] and
//! [`WorkItem::cancel`] consume it, so an item runs at most once.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::JobError;
use crate::jobs::{JobId, Outcome, bridge::Runnable};

/// Per-submission options.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use jobvisor::SubmitOptions;
///
/// let caller = CancellationToken::new();
/// let opts = SubmitOptions::new("thumbnail").with_cancellation(caller.clone());
/// assert_eq!(opts.kind(), "thumbnail");
/// ```
#[derive(Clone, Debug)]
pub struct SubmitOptions {
    kind: Cow<'static, str>,
    caller: Option<CancellationToken>,
}

impl SubmitOptions {
    /// Options with the given kind label and no caller token.
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: kind.into(),
            caller: None,
        }
    }

    /// Attaches the caller's cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.caller = Some(token);
        self
    }

    /// Returns the kind label.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the caller token, if any.
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.caller.as_ref()
    }
}

impl Default for SubmitOptions {
    /// Kind `"job"`, no caller token.
    fn default() -> Self {
        Self::new("job")
    }
}

/// One queued, not-yet-executed job plus its metadata.
pub(crate) struct WorkItem {
    id: JobId,
    kind: Arc<str>,
    caller: Option<CancellationToken>,
    enqueued_at: Instant,
    job: Box<dyn Runnable>,
}

impl WorkItem {
    pub(crate) fn new(
        id: JobId,
        kind: Arc<str>,
        caller: Option<CancellationToken>,
        job: Box<dyn Runnable>,
    ) -> Self {
        Self {
            id,
            kind,
            caller,
            enqueued_at: Instant::now(),
            job,
        }
    }

    pub(crate) fn id(&self) -> JobId {
        self.id
    }

    pub(crate) fn kind(&self) -> &Arc<str> {
        &self.kind
    }

    pub(crate) fn caller(&self) -> Option<&CancellationToken> {
        self.caller.as_ref()
    }

    /// Time since the item was built.
    pub(crate) fn queued_for(&self) -> Duration {
        self.enqueued_at.elapsed()
    }

    /// Runs the job with its effective signal; the returned future settles the handle.
    pub(crate) fn execute(self, ctx: CancellationToken) -> BoxFuture<'static, Outcome> {
        self.job.run(ctx)
    }

    /// Settles the handle as cancelled without running the job.
    pub(crate) fn cancel(self) {
        self.job.abandon(JobError::Canceled);
    }

    /// Settles the handle as failed with `err` without running the job.
    pub(crate) fn reject(self, err: JobError) {
        self.job.abandon(err);
    }
}
