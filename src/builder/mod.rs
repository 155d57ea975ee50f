//! Builder API for assembling a state graph and transition table.
//!
//! ```rust
//! use stratum::builder::StructureBuilder;
//! use stratum::core::Action;
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Link { Online, Idle, Busy, Offline }
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! enum Signal { Request, Done, Drop }
//!
//! let mut builder = StructureBuilder::<Link, Signal, Vec<String>>::new();
//! builder
//!     .configure(Link::Online)
//!     .handle(Signal::Drop, Link::Offline)
//!     .on_exit(Action::infallible(|_, _, _, log: &mut Vec<String>| log.push("offline".into())));
//! builder.configure(Link::Idle).child_of(Link::Online).handle(Signal::Request, Link::Busy);
//! builder.configure(Link::Busy).child_of(Link::Online).handle(Signal::Done, Link::Idle);
//! builder.configure(Link::Offline);
//!
//! let mut machine = builder.build(Link::Idle, Vec::new()).unwrap();
//!
//! // Inherited from `Online`.
//! machine.fire(Signal::Drop).unwrap();
//! assert_eq!(machine.state(), Some(&Link::Offline));
//! assert_eq!(machine.context(), &vec!["offline".to_string()]);
//! ```

mod state;

pub use state::StateBuilder;

use crate::asynchronous::{AsyncStateMachine, StartError};
use crate::config::EngineConfig;
use crate::core::{Event, State};
use crate::graph::{ActionOrdering, StateGraph};
use crate::machine::StateMachine;
use crate::structure::{Structure, StructureError, TransitionTable, Violation};
use crate::transition::Transition;

/// Builder collecting states, hierarchy, actions and transitions.
pub struct StructureBuilder<S, E, C> {
    graph: StateGraph<S, E, C>,
    transitions: TransitionTable<S, E, C>,
    violations: Vec<Violation>,
}

impl<S: State, E: Event, C> StructureBuilder<S, E, C> {
    /// Create a builder whose entry and exit actions run in insertion order.
    pub fn new() -> Self {
        Self::from_graph(StateGraph::new())
    }

    /// Create a builder whose entry and exit actions are sorted by the given
    /// comparators.
    pub fn with_action_ordering(
        entrance: ActionOrdering<S, E, C>,
        exit: ActionOrdering<S, E, C>,
    ) -> Self {
        Self::from_graph(StateGraph::with_action_ordering(entrance, exit))
    }

    fn from_graph(graph: StateGraph<S, E, C>) -> Self {
        Self {
            graph,
            transitions: TransitionTable::new(),
            violations: Vec::new(),
        }
    }

    /// Register `state` (if new) and configure it.
    pub fn configure(&mut self, state: S) -> StateBuilder<'_, S, E, C> {
        self.graph.insert(state.clone());
        StateBuilder {
            builder: self,
            state,
        }
    }

    /// Add a transition for `event` as-is.
    pub fn add_transition(&mut self, event: E, transition: Transition<S, E, C>) -> &mut Self {
        self.transitions.entry(event).or_default().push(transition);
        self
    }

    /// Validate and produce the structure.
    ///
    /// Hierarchy conflicts recorded while configuring are reported together
    /// with every transition defect.
    pub fn build_structure(self) -> Result<Structure<S, E, C>, StructureError> {
        Structure::with_violations(self.graph, self.transitions, self.violations)
    }

    /// Build a synchronous machine starting in `starting`.
    pub fn build(self, starting: S, context: C) -> Result<StateMachine<S, E, C>, StructureError> {
        StateMachine::new(self.build_structure()?, starting, context)
    }
}

impl<S: State, E: Event, C: Send + 'static> StructureBuilder<S, E, C> {
    /// Build a machine and start its asynchronous worker.
    pub fn build_async(
        self,
        starting: S,
        context: C,
        config: &EngineConfig,
    ) -> Result<AsyncStateMachine<S, E, C>, StartError> {
        let machine = self.build(starting, context)?;
        AsyncStateMachine::with_config(machine, config)
    }
}

impl<S: State, E: Event, C> Default for StructureBuilder<S, E, C> {
    fn default() -> Self {
        Self::new()
    }
}
