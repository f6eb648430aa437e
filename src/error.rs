//! Error types used by the jobvisor engine and the jobs it runs.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`]: errors raised by the engine lifecycle itself.
//! - [`JobError`]: the failure side of a single submission's outcome.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the engine lifecycle.
///
/// Only [`RuntimeError::StartTimeout`], [`RuntimeError::WorkersExited`] and
/// [`RuntimeError::InvalidConfig`] are fatal for the host. A
/// [`RuntimeError::ShutdownTimeout`] is informative: the engine is stopped
/// when it is returned.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration rejected by [`EngineBuilder::build`](crate::EngineBuilder::build).
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// Workers did not report ready within the start timeout.
    #[error("workers not ready after {timeout:?} ({ready}/{expected} ready)")]
    StartTimeout {
        /// The configured start timeout.
        timeout: Duration,
        /// Workers that did report ready.
        ready: usize,
        /// Workers that were spawned.
        expected: usize,
    },

    /// Workers exited before all of them reported ready.
    #[error("workers exited during startup ({ready}/{expected} ready)")]
    WorkersExited {
        /// Workers that did report ready.
        ready: usize,
        /// Workers that were spawned.
        expected: usize,
    },

    /// Lifecycle call made from a state that does not allow it.
    #[error("cannot {action} engine in state {state}")]
    InvalidState {
        /// Attempted lifecycle action (`start`, `stop`).
        action: &'static str,
        /// State observed at the time of the call.
        state: &'static str,
    },

    /// Shutdown deadline was exceeded while draining; leftovers were cancelled.
    #[error("shutdown deadline {deadline:?} exceeded; cancelled {cancelled} queued; stuck: {stuck:?}")]
    ShutdownTimeout {
        /// The deadline supplied to `stop`.
        deadline: Duration,
        /// Number of queued jobs settled to cancelled.
        cancelled: usize,
        /// Jobs still executing when the deadline hit (`kind#id`).
        stuck: Vec<String>,
    },

    /// Registering OS signal listeners failed.
    #[error("signal handling failed: {error}")]
    Signal {
        /// The underlying io error message.
        error: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jobvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::ShutdownTimeout { deadline: Duration::from_secs(5), cancelled: 0, stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_shutdown_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvalidConfig { .. } => "runtime_invalid_config",
            RuntimeError::StartTimeout { .. } => "runtime_start_timeout",
            RuntimeError::WorkersExited { .. } => "runtime_workers_exited",
            RuntimeError::InvalidState { .. } => "runtime_invalid_state",
            RuntimeError::ShutdownTimeout { .. } => "runtime_shutdown_timeout",
            RuntimeError::Signal { .. } => "runtime_signal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::InvalidConfig { reason } => format!("config: {reason}"),
            RuntimeError::StartTimeout {
                timeout,
                ready,
                expected,
            } => format!("start timeout after {timeout:?}; ready={ready}/{expected}"),
            RuntimeError::WorkersExited { ready, expected } => {
                format!("workers exited; ready={ready}/{expected}")
            }
            RuntimeError::InvalidState { action, state } => {
                format!("{action} rejected in state={state}")
            }
            RuntimeError::ShutdownTimeout {
                deadline,
                cancelled,
                stuck,
            } => format!("deadline exceeded after {deadline:?}; cancelled={cancelled} stuck={stuck:?}"),
            RuntimeError::Signal { error } => format!("signal: {error}"),
        }
    }

    /// Whether the host should treat this error as fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RuntimeError::ShutdownTimeout { .. })
    }
}

/// # Errors produced for a single submission.
///
/// A [`JobHandle`](crate::JobHandle) resolves to `Err(JobError)` when the job
/// did not succeed. [`JobError::Canceled`] is the *cancelled* terminal state;
/// every other variant is the *failed* terminal state.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// Job code failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Job code panicked; the worker survived.
    #[error("job panicked: {info}")]
    Panicked {
        /// Panic payload, when it was a string.
        info: String,
    },

    /// Bounded queue was full under [`FullQueuePolicy::RejectWithError`](crate::FullQueuePolicy::RejectWithError).
    #[error("queue full (capacity {capacity})")]
    QueueFull {
        /// Capacity of the queue that rejected the job.
        capacity: usize,
    },

    /// Engine stopped accepting work.
    #[error("engine is not accepting jobs")]
    Closed,

    /// Job was cancelled: it observed its signal, was evicted, or was still queued at the shutdown deadline.
    #[error("job cancelled")]
    Canceled,
}

impl JobError {
    /// Builds a [`JobError::Fail`] from anything displayable.
    ///
    /// # Example
    /// ```
    /// use jobvisor::JobError;
    ///
    /// let err = JobError::fail("connection refused");
    /// assert_eq!(err.to_string(), "execution failed: connection refused");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        JobError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Fail { .. } => "job_failed",
            JobError::Panicked { .. } => "job_panicked",
            JobError::QueueFull { .. } => "job_queue_full",
            JobError::Closed => "job_closed",
            JobError::Canceled => "job_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            JobError::Fail { error } => format!("error: {error}"),
            JobError::Panicked { info } => format!("panic: {info}"),
            JobError::QueueFull { capacity } => format!("queue full: capacity={capacity}"),
            JobError::Closed => "engine closed".to_string(),
            JobError::Canceled => "cancelled".to_string(),
        }
    }

    /// True for the *cancelled* terminal state.
    pub fn is_canceled(&self) -> bool {
        matches!(self, JobError::Canceled)
    }
}
