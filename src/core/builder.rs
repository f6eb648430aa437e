use std::sync::Arc;

use crate::{
    config::EngineConfig,
    error::RuntimeError,
    events::Bus,
    subscribers::{LogWriter, Subscribe, SubscriberSet},
};
use super::engine::Engine;

/// Builder for constructing an [`Engine`] with optional subscribers.
pub struct EngineBuilder {
    cfg: EngineConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl EngineBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (job outcomes, lifecycle, etc.)
    /// through dedicated workers with bounded queues. The built-in
    /// [`LogWriter`] is always installed in front of them.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and builds the engine in the `Created` state.
    ///
    /// Must be called inside a Tokio runtime: subscriber workers and the
    /// event listener are spawned here. Jobs submitted before
    /// [`Engine::start`] wait in the queue.
    pub fn build(self) -> Result<Arc<Engine>, RuntimeError> {
        self.cfg.validate()?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        let mut subscribers: Vec<Arc<dyn Subscribe>> = Vec::with_capacity(self.subscribers.len() + 1);
        subscribers.push(Arc::new(LogWriter::new(self.cfg.detailed_logging)));
        subscribers.extend(self.subscribers);
        let subs = SubscriberSet::new(subscribers, bus.clone());

        Ok(Arc::new(Engine::new_internal(self.cfg, bus, subs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueueCapacity;
    use crate::core::LifecycleState;

    #[tokio::test]
    async fn test_build_starts_in_created() {
        let engine = EngineBuilder::new(EngineConfig::default()).build().unwrap();
        assert_eq!(engine.state(), LifecycleState::Created);
        assert_eq!(engine.metrics().submitted, 0);
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        let cfg = EngineConfig {
            queue_capacity: QueueCapacity::Bounded(0),
            ..EngineConfig::default()
        };
        let err = EngineBuilder::new(cfg).build().err().unwrap();
        assert_eq!(err.as_label(), "runtime_invalid_config");
    }
}
