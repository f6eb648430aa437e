//! # Effective cancellation signal for one execution.
//!
//! [`EffectiveSignal`] decides which token a job observes:
//!
//! | `use_global_stopping_signal` | caller token | job observes                              |
//! |------------------------------|--------------|-------------------------------------------|
//! | `true`                       | yes          | child of engine token, linked to caller   |
//! | `true`                       | no           | child of engine token                     |
//! | `false`                      | yes          | child of caller token                     |
//! | `false`                      | no           | fresh token that never fires              |
//!
//! Jobs always get a child, so cancelling their own token reaches neither the
//! engine nor the caller. The caller link of the composite case only lives
//! while [`EffectiveSignal::scope`] is polling the job: when the execution
//! ends the link and the child are dropped and detached from the engine token.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Token handed to a job plus the optional second source linked into it.
pub(crate) struct EffectiveSignal {
    token: CancellationToken,
    link: Option<CancellationToken>,
}

impl EffectiveSignal {
    /// Composes the engine and caller tokens according to `use_global`.
    pub(crate) fn compose(
        engine: &CancellationToken,
        caller: Option<&CancellationToken>,
        use_global: bool,
    ) -> Self {
        match (use_global, caller) {
            (true, Some(caller)) => {
                let token = engine.child_token();
                // The link is only polled inside `scope`; an already fired caller must show up at once.
                if caller.is_cancelled() {
                    token.cancel();
                }
                Self {
                    token,
                    link: Some(caller.clone()),
                }
            }
            (true, None) => Self {
                token: engine.child_token(),
                link: None,
            },
            (false, Some(caller)) => Self {
                token: caller.child_token(),
                link: None,
            },
            (false, None) => Self {
                token: CancellationToken::new(),
                link: None,
            },
        }
    }

    /// Token to pass into the job.
    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Drives `fut` to completion, forwarding the linked source into the token meanwhile.
    pub(crate) async fn scope<F: Future>(self, fut: F) -> F::Output {
        let Self { token, link } = self;
        let Some(link) = link else {
            return fut.await;
        };

        tokio::pin!(fut);
        let mut forwarded = false;
        loop {
            tokio::select! {
                biased;
                _ = link.cancelled(), if !forwarded => {
                    token.cancel();
                    forwarded = true;
                }
                out = &mut fut => return out,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Runs a job that waits on its token; returns whether it fired within `wait`.
    async fn fires(signal: EffectiveSignal, trigger: impl FnOnce(), wait: Duration) -> bool {
        let token = signal.token();
        let job = async move {
            tokio::time::timeout(wait, token.cancelled()).await.is_ok()
        };
        let run = signal.scope(job);
        trigger();
        run.await
    }

    #[tokio::test]
    async fn test_composite_fires_on_engine() {
        let engine = CancellationToken::new();
        let caller = CancellationToken::new();
        let sig = EffectiveSignal::compose(&engine, Some(&caller), true);
        assert!(fires(sig, || engine.cancel(), Duration::from_secs(1)).await);
        assert!(!caller.is_cancelled());
    }

    #[tokio::test]
    async fn test_composite_fires_on_caller() {
        let engine = CancellationToken::new();
        let caller = CancellationToken::new();
        let sig = EffectiveSignal::compose(&engine, Some(&caller), true);
        assert!(fires(sig, || caller.cancel(), Duration::from_secs(1)).await);
        assert!(!engine.is_cancelled());
    }

    #[tokio::test]
    async fn test_composite_quiet_without_trigger() {
        let engine = CancellationToken::new();
        let caller = CancellationToken::new();
        let sig = EffectiveSignal::compose(&engine, Some(&caller), true);
        assert!(!fires(sig, || {}, Duration::from_millis(50)).await);
    }

    #[tokio::test]
    async fn test_composite_sees_already_cancelled_caller() {
        let engine = CancellationToken::new();
        let caller = CancellationToken::new();
        caller.cancel();
        let sig = EffectiveSignal::compose(&engine, Some(&caller), true);
        assert!(fires(sig, || {}, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_already_cancelled_caller_visible_before_first_await() {
        let engine = CancellationToken::new();
        let caller = CancellationToken::new();
        caller.cancel();
        let sig = EffectiveSignal::compose(&engine, Some(&caller), true);
        let token = sig.token();
        assert!(sig.scope(async move { token.is_cancelled() }).await);
    }

    #[tokio::test]
    async fn test_caller_cancel_forwarded_before_job_resumes() {
        let engine = CancellationToken::new();
        let caller = CancellationToken::new();
        let sig = EffectiveSignal::compose(&engine, Some(&caller), true);
        let token = sig.token();
        let trigger = caller.clone();
        let seen = sig
            .scope(async move {
                trigger.cancel();
                tokio::task::yield_now().await;
                token.is_cancelled()
            })
            .await;
        assert!(seen);
    }

    #[tokio::test]
    async fn test_local_only_ignores_engine() {
        let engine = CancellationToken::new();
        let caller = CancellationToken::new();
        let sig = EffectiveSignal::compose(&engine, Some(&caller), false);
        assert!(!fires(sig, || engine.cancel(), Duration::from_millis(50)).await);

        let sig = EffectiveSignal::compose(&engine, Some(&caller), false);
        assert!(fires(sig, || caller.cancel(), Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_no_sources_never_fires() {
        let engine = CancellationToken::new();
        let sig = EffectiveSignal::compose(&engine, None, false);
        assert!(!fires(sig, || engine.cancel(), Duration::from_millis(50)).await);
    }

    #[test]
    fn test_job_cancelling_its_token_stays_local() {
        let engine = CancellationToken::new();
        let caller = CancellationToken::new();
        for use_global in [true, false] {
            let sig = EffectiveSignal::compose(&engine, Some(&caller), use_global);
            sig.token().cancel();
        }
        assert!(!engine.is_cancelled());
        assert!(!caller.is_cancelled());
    }
}
