//! The synchronous transition engine.
//!
//! `fire` resolves one transition for an event by walking up the hierarchy
//! from the current state, freezes its destination, and runs it in three
//! stages:
//!
//! 1. **exit**: listeners (`Before`), then exit actions from the current state
//!    up to, not including, the common ancestor; the machine is now in the
//!    common ancestor
//! 2. **between**: listeners (`Between`), then the transition's own action
//! 3. **enter**: the machine moves to the destination, entrance actions run
//!    from just below the common ancestor down to the destination, then
//!    listeners (`After`)
//!
//! Errors from actions and listeners abort the call where they happen.
//! Nothing is rolled back: [`StateMachine::state`] reports how far the
//! transition got.

mod error;
mod listener;

pub use error::FireError;
pub use listener::{Listener, ListenerId, TransitionStage};

use crate::core::{ActionResult, Event, State};
use crate::graph::{StateGraph, StateId};
use crate::structure::{Structure, StructureError};
use crate::transition::Transition;
use listener::Listeners;
use std::fmt;
use tracing::{trace, trace_span, warn};
use uuid::Uuid;

/// Result of firing an event: the snapshot of the transition taken, if any.
pub type FireResult<S, E, C> = Result<Option<Transition<S, E, C>>, FireError<S, E>>;

/// Hierarchical state machine driving one current state over a [`Structure`].
///
/// # Example
///
/// ```rust
/// use stratum::builder::StructureBuilder;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door { Closed, Open }
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Push { Push }
///
/// let mut builder = StructureBuilder::<Door, Push, ()>::new();
/// builder.configure(Door::Closed).handle(Push::Push, Door::Open);
/// builder.configure(Door::Open).handle(Push::Push, Door::Closed);
///
/// let mut machine = builder.build(Door::Closed, ()).unwrap();
/// let taken = machine.fire(Push::Push).unwrap().unwrap();
///
/// assert_eq!(taken.destination(), Door::Open);
/// assert_eq!(machine.state(), Some(&Door::Open));
/// ```
pub struct StateMachine<S, E, C> {
    id: Uuid,
    structure: Structure<S, E, C>,
    context: C,
    state: Option<S>,
    listeners: Listeners<S, E, C>,
}

impl<S: State, E: Event, C> StateMachine<S, E, C> {
    /// Create a machine over `structure`, starting in `starting`.
    pub fn new(structure: Structure<S, E, C>, starting: S, context: C) -> Result<Self, StructureError> {
        structure.check_starting_state(&starting)?;
        Ok(Self {
            id: Uuid::new_v4(),
            structure,
            context,
            state: Some(starting),
            listeners: Listeners::new(),
        })
    }

    /// Identifier used to tell machines apart in logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The current state.
    ///
    /// Only `None` when an action or listener failed during the between
    /// stage of a transition whose source and destination share no ancestor.
    /// Every later [`fire`](Self::fire) then fails with
    /// [`FireError::Detached`].
    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Register a listener notified at every stage of every transition.
    pub fn add_transition_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(TransitionStage, &E, &Transition<S, E, C>, &C) -> ActionResult + Send + 'static,
    {
        self.listeners.add(Box::new(listener))
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn remove_transition_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Fire an event.
    ///
    /// Returns the snapshot of the transition taken, `None` if no transition
    /// applies, or an error. See the module documentation for the exact order
    /// of actions and notifications.
    pub fn fire(&mut self, event: E) -> FireResult<S, E, C> {
        let span = trace_span!("fire", machine = %self.id, event = ?event);
        let _entered = span.enter();
        trace!("Event fired");

        let Some(current) = self.state.clone() else {
            warn!("Machine is detached after a failed transition");
            return Err(FireError::Detached);
        };

        let candidates = self.structure.transitions(&event);
        if candidates.is_empty() {
            trace!("No transitions for event");
            return Ok(None);
        }

        let graph = self.structure.graph();
        let current_id = graph
            .id(&current)
            .ok_or_else(|| FireError::UnknownState {
                state: current.clone(),
            })?;

        // Freeze the destination once; every action and listener below sees
        // this snapshot.
        let transition = match resolve(graph, candidates, current_id, &self.context).as_slice() {
            [] => {
                trace!("No transitions possible for event");
                return Ok(None);
            }
            [single] => single.snapshot(),
            many => {
                warn!(candidates = many.len(), "Multiple transitions possible for event");
                return Err(FireError::Ambiguous {
                    event,
                    candidates: many.len(),
                });
            }
        };

        let destination = transition.destination();
        let destination_id = graph
            .id(&destination)
            .ok_or_else(|| FireError::UnknownState {
                state: destination.clone(),
            })?;
        let ancestor = graph.common_ancestor(current_id, destination_id);
        let ancestor_state = ancestor.map(|id| graph.node(id).state().clone());
        trace!(
            from = ?current,
            to = ?destination,
            ancestor = ?ancestor_state,
            "Resolved transition"
        );

        // exit
        self.listeners
            .notify(TransitionStage::Before, &event, &transition, &self.context)?;
        for id in graph.exit_path(current_id, ancestor) {
            let node = graph.node(id);
            trace!(state = ?node.state(), "Performing exit actions");
            node.exit(&event, &transition, &mut self.context)?;
        }
        self.state = ancestor_state;

        // between
        self.listeners
            .notify(TransitionStage::Between, &event, &transition, &self.context)?;
        trace!(state = ?self.state, "Performing transition action");
        transition
            .action()
            .perform(self.state.as_ref(), &event, &transition, &mut self.context)?;

        // enter
        self.state = Some(destination);
        for id in graph.entry_path(destination_id, ancestor) {
            let node = graph.node(id);
            trace!(state = ?node.state(), "Performing entrance actions");
            node.enter(&event, &transition, &mut self.context)?;
        }
        self.listeners
            .notify(TransitionStage::After, &event, &transition, &self.context)?;

        trace!(state = ?self.state, "Finished transition");
        Ok(Some(transition))
    }
}

impl<S: fmt::Debug, E: fmt::Debug, C: fmt::Debug> fmt::Debug for StateMachine<S, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("context", &self.context)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

/// Guard-allowed candidates at the nearest level of the hierarchy that has
/// any, starting from `from` and moving up the parent chain.
fn resolve<'a, S: State, E, C>(
    graph: &StateGraph<S, E, C>,
    candidates: &'a [Transition<S, E, C>],
    from: StateId,
    context: &C,
) -> Vec<&'a Transition<S, E, C>> {
    for id in graph.ancestors(from) {
        let state = graph.node(id).state();
        trace!(state = ?state, "Looking for allowed transitions");
        let allowed: Vec<_> = candidates
            .iter()
            .filter(|t| t.source() == state)
            .filter(|t| t.is_allowed(context))
            .collect();
        if !allowed.is_empty() {
            return allowed;
        }
    }
    Vec::new()
}
