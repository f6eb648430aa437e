//! # Engine lifecycle states.
//!
//! ```text
//! Created ──start()──► Starting ──workers ready──► Running ──stop()──► Stopping ──drained/deadline──► Stopped
//!    │                     │
//!    └──stop()─────────────┴──start failed──────────────────────────────────────────────────────────► Stopped
//! ```
//!
//! Transitions are linear and one-way; `Stopped` is terminal.

use std::sync::atomic::{AtomicU8, Ordering};

/// Where the engine is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LifecycleState {
    /// Built; no workers yet. Submissions queue up.
    Created = 0,
    /// Workers spawned, waiting for them to report ready.
    Starting = 1,
    /// Workers consuming the queue.
    Running = 2,
    /// Queue closed, draining.
    Stopping = 3,
    /// Terminal.
    Stopped = 4,
}

impl LifecycleState {
    /// Stable lowercase name for logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Created => "created",
            LifecycleState::Starting => "starting",
            LifecycleState::Running => "running",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Stopped => "stopped",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LifecycleState::Created,
            1 => LifecycleState::Starting,
            2 => LifecycleState::Running,
            3 => LifecycleState::Stopping,
            _ => LifecycleState::Stopped,
        }
    }
}

/// Atomic holder of a [`LifecycleState`].
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(LifecycleState::Created as u8))
    }

    pub(crate) fn get(&self) -> LifecycleState {
        LifecycleState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `from → to`; on mismatch returns the state actually observed.
    pub(crate) fn transition(
        &self,
        from: LifecycleState,
        to: LifecycleState,
    ) -> Result<(), LifecycleState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(LifecycleState::from_u8)
    }

    /// Unconditionally enters the terminal state.
    pub(crate) fn finish(&self) {
        self.0.store(LifecycleState::Stopped as u8, Ordering::Release);
    }
}
