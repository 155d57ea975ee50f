//! Stratum: a hierarchical state machine engine
//!
//! States form a forest: a state may be nested under a parent and inherits
//! the parent's transitions. Firing an event picks the single guard-allowed
//! transition nearest to the current state in the hierarchy, then runs it in
//! three stages (exit, between, enter) bounded by the common ancestor of the
//! current and destination states.
//!
//! # Core Concepts
//!
//! - **Graph**: arena of internal states with parent/child links and ordered
//!   entrance/exit actions
//! - **Transitions**: guarded moves whose destination may be computed at fire
//!   time, frozen into a snapshot once per `fire`
//! - **Machine**: the synchronous staged engine with transition listeners
//! - **Async**: a wrapper running events one at a time on a worker thread
//!
//! # Example
//!
//! ```rust
//! use stratum::builder::StructureBuilder;
//! use stratum::core::Action;
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Player { Alive, Walking, Running, Dead }
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Input { Sprint, Stop, Hit }
//!
//! let mut builder = StructureBuilder::<Player, Input, u32>::new();
//! builder.configure(Player::Alive).handle(Input::Hit, Player::Dead);
//! builder
//!     .configure(Player::Walking)
//!     .child_of(Player::Alive)
//!     .handle(Input::Sprint, Player::Running);
//! builder
//!     .configure(Player::Running)
//!     .child_of(Player::Alive)
//!     .on_entry(Action::infallible(|_, _, _, sprints: &mut u32| *sprints += 1))
//!     .handle(Input::Stop, Player::Walking);
//! builder.configure(Player::Dead);
//!
//! let mut machine = builder.build(Player::Walking, 0).unwrap();
//! machine.fire(Input::Sprint).unwrap();
//! machine.fire(Input::Hit).unwrap();
//!
//! assert_eq!(machine.state(), Some(&Player::Dead));
//! assert_eq!(*machine.context(), 1);
//! ```

pub mod asynchronous;
pub mod builder;
pub mod config;
pub mod core;
pub mod graph;
pub mod machine;
pub mod structure;
pub mod transition;

// Re-export commonly used types
pub use asynchronous::{AsyncStateMachine, FireHandle};
pub use core::{Action, ActionError, Event, Guard, State, TransitionAction};
pub use machine::{FireError, FireResult, StateMachine, TransitionStage};
pub use structure::{Structure, StructureError};
pub use transition::{Destination, Transition};
