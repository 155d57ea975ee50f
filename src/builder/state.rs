//! Per-state configuration.

use super::StructureBuilder;
use crate::core::{Action, Event, Guard, State, TransitionAction};
use crate::transition::Transition;

/// Fluent configuration of one state, returned by
/// [`StructureBuilder::configure`].
///
/// Transitions added here use the configured state as their source.
pub struct StateBuilder<'a, S, E, C> {
    pub(super) builder: &'a mut StructureBuilder<S, E, C>,
    pub(super) state: S,
}

impl<S: State, E: Event, C> StateBuilder<'_, S, E, C> {
    /// Nest this state under `parent`.
    ///
    /// A conflicting parent or a cycle is reported when the structure is
    /// built.
    pub fn child_of(&mut self, parent: S) -> &mut Self {
        if let Err(violation) = self.builder.graph.set_parent(self.state.clone(), parent) {
            self.builder.violations.push(violation);
        }
        self
    }

    pub fn on_entry(&mut self, action: Action<S, E, C>) -> &mut Self {
        self.builder
            .graph
            .add_entrance_action(self.state.clone(), action);
        self
    }

    pub fn on_exit(&mut self, action: Action<S, E, C>) -> &mut Self {
        self.builder.graph.add_exit_action(self.state.clone(), action);
        self
    }

    /// Move to `destination` on `event`.
    pub fn handle(&mut self, event: E, destination: S) -> &mut Self {
        self.push(event, Transition::new(self.state.clone(), destination))
    }

    /// Move to `destination` on `event` while `predicate` allows it.
    pub fn handle_if<F>(&mut self, event: E, destination: S, predicate: F) -> &mut Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        let transition =
            Transition::new(self.state.clone(), destination).with_guard(Guard::new(predicate));
        self.push(event, transition)
    }

    /// Move to `destination` on `event`, running `action` in between.
    pub fn handle_with(
        &mut self,
        event: E,
        destination: S,
        action: TransitionAction<S, E, C>,
    ) -> &mut Self {
        let transition = Transition::new(self.state.clone(), destination).with_action(action);
        self.push(event, transition)
    }

    /// Move to whatever state `supplier` returns when `event` fires.
    pub fn handle_dynamic<F>(&mut self, event: E, supplier: F) -> &mut Self
    where
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.push(event, Transition::dynamic(self.state.clone(), supplier))
    }

    /// Add a fully configured transition. Its source is replaced by this
    /// state.
    pub fn handle_transition(&mut self, event: E, transition: Transition<S, E, C>) -> &mut Self {
        let transition = Transition::from_parts(
            self.state.clone(),
            transition.destination_supplier().clone(),
            transition.guard().clone(),
            transition.action().clone(),
        );
        self.push(event, transition)
    }

    fn push(&mut self, event: E, transition: Transition<S, E, C>) -> &mut Self {
        self.builder.add_transition(event, transition);
        self
    }
}
