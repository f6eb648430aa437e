//! # Engine configuration.
//!
//! Provides [`EngineConfig`], the settings the engine reads once at
//! [`Engine::builder`](crate::Engine::builder) and never again.
//!
//! ## Validation
//! [`EngineConfig::validate`] runs inside [`EngineBuilder::build`](crate::EngineBuilder::build):
//! - `max_workers = 0` → rejected
//! - `QueueCapacity::Bounded(0)` → rejected
//! - `bus_capacity = 0` → clamped to 1 (not an error)

use std::time::Duration;

use crate::error::RuntimeError;

/// Capacity of the job queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueCapacity {
    /// Submissions never wait and never get rejected for lack of room.
    Unbounded,
    /// At most `n` jobs wait in the queue; [`FullQueuePolicy`] applies beyond that.
    Bounded(usize),
}

impl QueueCapacity {
    /// Returns the bound, if any.
    #[inline]
    pub fn bound(&self) -> Option<usize> {
        match self {
            QueueCapacity::Unbounded => None,
            QueueCapacity::Bounded(n) => Some(*n),
        }
    }
}

/// What a submission does when a bounded queue is full.
///
/// Ignored for [`QueueCapacity::Unbounded`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FullQueuePolicy {
    /// Suspend the submitter until room frees up. Nothing is lost.
    #[default]
    Wait,
    /// Evict the oldest queued job (its handle resolves cancelled) and enqueue the new one.
    DropOldest,
    /// Settle the new job's handle to [`JobError::QueueFull`](crate::JobError::QueueFull) right away.
    RejectWithError,
}

/// Configuration for the job engine.
///
/// ## Field semantics
/// - `max_workers`: number of worker loops, i.e. the concurrency cap (`>= 1`)
/// - `queue_capacity`: unbounded or bounded queue (`Bounded(n)` needs `n >= 1`)
/// - `full_queue_policy`: behavior of a submission hitting a full bounded queue
/// - `use_global_stopping_signal`: whether the engine's shutdown token takes part in every job's effective signal
/// - `detailed_logging`: log per-job submit/dequeue/success events, not only failures and lifecycle
/// - `start_timeout`: upper bound on [`Engine::start`](crate::Engine::start) waiting for workers
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Number of worker loops started by the engine.
    pub max_workers: usize,

    /// Queue capacity.
    pub queue_capacity: QueueCapacity,

    /// Policy applied when a bounded queue is full.
    pub full_queue_policy: FullQueuePolicy,

    /// Compose the engine shutdown token into each job's signal.
    ///
    /// - `true`: jobs observe engine shutdown (and their caller's token, if any)
    /// - `false`: jobs observe only their caller's token
    pub use_global_stopping_signal: bool,

    /// Verbose per-job logging.
    pub detailed_logging: bool,

    /// Maximum time `start` waits for every worker to report ready.
    pub start_timeout: Duration,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Slow subscribers lagging more than `bus_capacity` events skip older ones.
    pub bus_capacity: usize,
}

impl EngineConfig {
    /// Checks invariants the engine relies on.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.max_workers == 0 {
            return Err(RuntimeError::InvalidConfig {
                reason: "max_workers must be at least 1".into(),
            });
        }
        if self.queue_capacity == QueueCapacity::Bounded(0) {
            return Err(RuntimeError::InvalidConfig {
                reason: "bounded queue capacity must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for EngineConfig {
    /// Default configuration:
    ///
    /// - `max_workers` = available parallelism (1 if unknown)
    /// - `queue_capacity = Bounded(1024)`
    /// - `full_queue_policy = Wait`
    /// - `use_global_stopping_signal = true`
    /// - `detailed_logging = false`
    /// - `start_timeout = 5s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            max_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            queue_capacity: QueueCapacity::Bounded(1024),
            full_queue_policy: FullQueuePolicy::default(),
            use_global_stopping_signal: true,
            detailed_logging: false,
            start_timeout: Duration::from_secs(5),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let cfg = EngineConfig {
            max_workers: 0,
            ..EngineConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.as_label(), "runtime_invalid_config");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let cfg = EngineConfig {
            queue_capacity: QueueCapacity::Bounded(0),
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_unbounded_has_no_bound() {
        assert_eq!(QueueCapacity::Unbounded.bound(), None);
        assert_eq!(QueueCapacity::Bounded(8).bound(), Some(8));
    }

    #[test]
    fn test_bus_capacity_clamped() {
        let cfg = EngineConfig {
            bus_capacity: 0,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
