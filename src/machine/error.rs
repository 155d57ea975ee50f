//! Errors surfaced by `fire`.

use crate::core::ActionError;
use thiserror::Error;

/// Errors that can occur while firing an event.
///
/// Finding no applicable transition is not an error; `fire` returns
/// `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum FireError<S, E> {
    /// More than one guard-allowed transition at the same hierarchy level.
    /// The machine is left untouched.
    #[error("Multiple [{candidates}] transitions possible for event [{event:?}]")]
    Ambiguous { event: E, candidates: usize },

    /// A transition resolved to a state that is not part of the structure.
    /// Detected before any stage runs, so the machine is left untouched.
    #[error("Transition leads to state [{state:?}] which is not part of the structure")]
    UnknownState { state: S },

    /// An action or listener failed. The error is passed through as-is and
    /// the machine stays wherever the staged transition had reached.
    #[error(transparent)]
    Callback(#[from] ActionError),

    /// An earlier transition between disjoint trees failed during its
    /// between stage, leaving the machine without a current state. No
    /// further event can be handled.
    #[error("Machine has no current state after a failed transition")]
    Detached,

    /// An asynchronous fire was cancelled before it started.
    #[error("Fire was cancelled before it started")]
    Cancelled,

    /// The asynchronous event queue was full.
    #[error("Event queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// The asynchronous worker is gone.
    #[error("State machine worker has stopped")]
    WorkerStopped,
}

impl<S, E> FireError<S, E> {
    /// True for errors produced by a user action or listener.
    pub fn is_callback(&self) -> bool {
        matches!(self, FireError::Callback(_))
    }
}
