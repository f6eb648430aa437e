//! # Fan-out of engine events to subscribers.
//!
//! The engine owns one [`SubscriberSet`]. Its listener task reads the
//! [`Bus`] and routes each event to the subscribers whose [`Interest`]
//! matches, each through its own bounded queue and worker task.
//!
//! ```text
//! Bus ──► listen() ──► route(ev)
//!                        ├─ interest miss  → skipped, no queue slot used
//!                        ├─ queue has room → worker → sub.on_event(ev)
//!                        │                              └─ panic → SubscriberPanicked
//!                        └─ queue full     → dropped, counted
//!                                            first drop of a burst → SubscriberOverflow
//! ```
//!
//! A subscriber is never sent overflow/panic events about itself, so a stuck
//! subscriber cannot feed its own backlog.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::jobs::panic_message;
use crate::subscribers::{Interest, Subscribe};

struct Route {
    name: &'static str,
    interest: Interest,
    tx: mpsc::Sender<Arc<Event>>,
    dropped: u64,
    overflowing: bool,
}

impl Route {
    fn wants(&self, ev: &Event) -> bool {
        let about_self = matches!(
            ev.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        ) && ev.job_kind.as_deref() == Some(self.name);
        !about_self && self.interest.matches(ev)
    }
}

/// Subscribers of one engine, each behind its own queue and worker.
pub(crate) struct SubscriberSet {
    routes: Vec<Route>,
    workers: JoinSet<()>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one delivery worker per subscriber. Needs a Tokio runtime.
    pub(crate) fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut routes = Vec::with_capacity(subs.len());
        let mut workers = JoinSet::new();

        for sub in subs {
            let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
            routes.push(Route {
                name: sub.name(),
                interest: sub.interest(),
                tx,
                dropped: 0,
                overflowing: false,
            });
            workers.spawn(deliver(sub, rx, bus.clone()));
        }
        Self {
            routes,
            workers,
            bus,
        }
    }

    /// Routes `ev` to every interested subscriber without waiting.
    pub(crate) fn route(&mut self, ev: Event) {
        let mut shared_ev: Option<Arc<Event>> = None;

        for route in &mut self.routes {
            if !route.wants(&ev) {
                continue;
            }
            let queued = shared_ev.get_or_insert_with(|| Arc::new(ev.clone()));
            match route.tx.try_send(Arc::clone(queued)) {
                Ok(()) => route.overflowing = false,
                Err(_) => {
                    route.dropped += 1;
                    if !route.overflowing {
                        route.overflowing = true;
                        tracing::warn!(
                            subscriber = route.name,
                            dropped = route.dropped,
                            "subscriber queue full, dropping events"
                        );
                        self.bus
                            .publish(Event::subscriber_overflow(route.name, route.dropped));
                    }
                }
            }
        }
    }

    /// Forwards bus events until `stop` fires or the bus closes, then flushes
    /// every subscriber queue.
    pub(crate) fn listen(mut self, stop: CancellationToken) {
        let mut rx = self.bus.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Ok(ev) => self.route(ev),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "event fan-out lagged behind the bus");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => break,
                }
            }
            self.shutdown().await;
        });
    }

    /// Closes every queue and waits for the workers to finish what they hold.
    pub(crate) async fn shutdown(mut self) {
        self.routes.clear();
        while self.workers.join_next().await.is_some() {}
    }
}

/// Delivery loop of one subscriber.
async fn deliver(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        if let Err(payload) = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await {
            let info = panic_message(payload.as_ref());
            tracing::warn!(subscriber = sub.name(), %info, "subscriber panicked");
            bus.publish(Event::subscriber_panicked(sub.name(), info));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobId;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::Semaphore;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
        fn interest(&self) -> Interest {
            Interest::Jobs
        }
    }

    struct Stalled {
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl Subscribe for Stalled {
        async fn on_event(&self, _ev: &Event) {
            let _permit = self.gate.acquire().await;
        }
        fn name(&self) -> &'static str {
            "stalled"
        }
        fn queue_capacity(&self) -> usize {
            1
        }
    }

    struct Panicky;

    #[async_trait]
    impl Subscribe for Panicky {
        async fn on_event(&self, _ev: &Event) {
            panic!("subscriber bug");
        }
        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    #[tokio::test]
    async fn test_interest_filters_before_queueing() {
        let bus = Bus::new(16);
        let rec = Arc::new(Recorder::default());
        let mut set = SubscriberSet::new(vec![rec.clone() as Arc<dyn Subscribe>], bus);

        set.route(Event::new(EventKind::EngineRunning));
        set.route(Event::new(EventKind::JobSucceeded).with_job(JobId::new(1), "a"));
        set.shutdown().await;

        assert_eq!(*rec.seen.lock().unwrap(), vec![EventKind::JobSucceeded]);
    }

    #[tokio::test]
    async fn test_overflow_reported_once_per_burst() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let gate = Arc::new(Semaphore::new(0));
        let mut set = SubscriberSet::new(
            vec![Arc::new(Stalled {
                gate: Arc::clone(&gate),
            }) as Arc<dyn Subscribe>],
            bus,
        );

        for _ in 0..4 {
            set.route(Event::new(EventKind::EngineRunning));
        }
        assert_eq!(set.routes[0].dropped, 3);

        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.reason.as_deref(), Some("subscriber=stalled dropped=1"));
        assert!(rx.try_recv().is_err());

        gate.add_permits(16);
        set.shutdown().await;
    }

    #[tokio::test]
    async fn test_panic_is_isolated_and_published() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let rec = Arc::new(Recorder::default());
        let mut set = SubscriberSet::new(
            vec![Arc::new(Panicky) as Arc<dyn Subscribe>, rec.clone()],
            bus,
        );

        set.route(Event::new(EventKind::JobFailed).with_job(JobId::new(2), "b"));
        set.shutdown().await;

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.job_kind.as_deref(), Some("panicky"));
        assert_eq!(*rec.seen.lock().unwrap(), vec![EventKind::JobFailed]);
    }
}
