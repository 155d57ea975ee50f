//! Core building blocks shared by the graph, the transitions and the engine.
//!
//! - State and event identifiers via the `State` and `Event` traits
//! - Guard predicates over the machine context
//! - Entrance, exit and transition actions
//! - An in-memory history of completed transitions

mod action;
mod guard;
mod history;
mod state;

pub use action::{Action, ActionError, ActionResult, TransitionAction};
pub use guard::Guard;
pub use history::{HistoryRecorder, TransitionHistory, TransitionRecord};
pub use state::{Event, State};
