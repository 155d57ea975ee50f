//! Internal state nodes and their ordered action sets.

use super::StateId;
use crate::core::{Action, ActionResult};
use crate::transition::Transition;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Comparator used to keep an [`ActionSet`] sorted.
pub type ActionOrdering<S, E, C> =
    Arc<dyn Fn(&Action<S, E, C>, &Action<S, E, C>) -> Ordering + Send + Sync>;

/// Set of actions run in a deterministic order.
///
/// Without a comparator the order is insertion order. With one, each action is
/// placed after every action that does not compare greater than it, so actions
/// the comparator considers equal keep their insertion order. Adding the same
/// action twice (a clone sharing its closure) is a no-op.
pub struct ActionSet<S, E, C> {
    actions: Vec<Action<S, E, C>>,
    ordering: Option<ActionOrdering<S, E, C>>,
}

impl<S, E, C> ActionSet<S, E, C> {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            ordering: None,
        }
    }

    pub fn ordered_by(ordering: ActionOrdering<S, E, C>) -> Self {
        Self {
            actions: Vec::new(),
            ordering: Some(ordering),
        }
    }

    /// Add an action. Returns `false` if it was already present.
    pub fn insert(&mut self, action: Action<S, E, C>) -> bool {
        if self.actions.iter().any(|existing| existing.same_as(&action)) {
            return false;
        }

        match &self.ordering {
            Some(compare) => {
                let position = self
                    .actions
                    .partition_point(|existing| compare(existing, &action) != Ordering::Greater);
                self.actions.insert(position, action);
            }
            None => self.actions.push(action),
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action<S, E, C>> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Run every action in order, stopping at the first failure.
    pub fn perform_all(
        &self,
        state: &S,
        event: &E,
        transition: &Transition<S, E, C>,
        context: &mut C,
    ) -> ActionResult {
        for action in &self.actions {
            action.perform(state, event, transition, context)?;
        }
        Ok(())
    }
}

impl<S, E, C> Default for ActionSet<S, E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E, C> fmt::Debug for ActionSet<S, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSet")
            .field("actions", &self.actions)
            .field("ordered", &self.ordering.is_some())
            .finish()
    }
}

/// A user state wrapped with its place in the hierarchy and its actions.
///
/// Nodes live in a [`StateGraph`](super::StateGraph) arena and refer to each
/// other by [`StateId`].
pub struct InternalState<S, E, C> {
    state: S,
    pub(super) parent: Option<StateId>,
    pub(super) children: Vec<StateId>,
    entrance_actions: ActionSet<S, E, C>,
    exit_actions: ActionSet<S, E, C>,
}

impl<S, E, C> InternalState<S, E, C> {
    pub(super) fn new(
        state: S,
        entrance_actions: ActionSet<S, E, C>,
        exit_actions: ActionSet<S, E, C>,
    ) -> Self {
        Self {
            state,
            parent: None,
            children: Vec::new(),
            entrance_actions,
            exit_actions,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    pub fn children(&self) -> &[StateId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn entrance_actions(&self) -> &ActionSet<S, E, C> {
        &self.entrance_actions
    }

    pub fn exit_actions(&self) -> &ActionSet<S, E, C> {
        &self.exit_actions
    }

    pub fn add_entrance_action(&mut self, action: Action<S, E, C>) -> bool {
        self.entrance_actions.insert(action)
    }

    pub fn add_exit_action(&mut self, action: Action<S, E, C>) -> bool {
        self.exit_actions.insert(action)
    }

    /// Run this node's entrance actions.
    pub fn enter(&self, event: &E, transition: &Transition<S, E, C>, context: &mut C) -> ActionResult {
        self.entrance_actions
            .perform_all(&self.state, event, transition, context)
    }

    /// Run this node's exit actions.
    pub fn exit(&self, event: &E, transition: &Transition<S, E, C>, context: &mut C) -> ActionResult {
        self.exit_actions
            .perform_all(&self.state, event, transition, context)
    }
}

impl<S: fmt::Debug, E, C> fmt::Debug for InternalState<S, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalState")
            .field("state", &self.state)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("entrance_actions", &self.entrance_actions.len())
            .field("exit_actions", &self.exit_actions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum Lamp {
        Off,
        On,
    }

    type Log = Vec<&'static str>;

    fn push(tag: &'static str) -> Action<Lamp, (), Log> {
        Action::infallible(move |_, _, _, log: &mut Log| log.push(tag)).named(tag)
    }

    fn run(set: &ActionSet<Lamp, (), Log>) -> Log {
        let transition = Transition::new(Lamp::Off, Lamp::On);
        let mut log = Vec::new();
        set.perform_all(&Lamp::Off, &(), &transition, &mut log)
            .unwrap();
        log
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut set = ActionSet::new();
        set.insert(push("b"));
        set.insert(push("a"));
        set.insert(push("c"));

        assert_eq!(run(&set), vec!["b", "a", "c"]);
        assert_eq!(run(&set), vec!["b", "a", "c"]);
    }

    #[test]
    fn duplicate_actions_are_ignored() {
        let mut set = ActionSet::new();
        let action = push("once");

        assert!(set.insert(action.clone()));
        assert!(!set.insert(action));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn comparator_orders_actions() {
        let mut set: ActionSet<Lamp, (), Log> =
            ActionSet::ordered_by(Arc::new(|a: &Action<Lamp, (), Log>, b: &Action<Lamp, (), Log>| {
                a.priority().cmp(&b.priority())
            }));
        set.insert(push("late").with_priority(5));
        set.insert(push("early").with_priority(-1));
        set.insert(push("middle").with_priority(2));
        set.insert(push("middle-too").with_priority(2));

        assert_eq!(run(&set), vec!["early", "middle", "middle-too", "late"]);
    }

    #[test]
    fn failure_stops_remaining_actions() {
        let mut set = ActionSet::new();
        set.insert(push("first"));
        set.insert(Action::new(|_, _, _, _: &mut Log| Err("stop".into())));
        set.insert(push("never"));

        let transition = Transition::new(Lamp::Off, Lamp::On);
        let mut log = Vec::new();
        let result = set.perform_all(&Lamp::Off, &(), &transition, &mut log);

        assert!(result.is_err());
        assert_eq!(log, vec!["first"]);
    }

    #[test]
    fn node_runs_actions_with_its_own_state() {
        let mut node: InternalState<Lamp, (), Vec<String>> =
            InternalState::new(Lamp::On, ActionSet::new(), ActionSet::new());
        node.add_entrance_action(Action::infallible(|state, _, _, log: &mut Vec<String>| {
            log.push(format!("enter {state:?}"));
        }));
        node.add_exit_action(Action::infallible(|state, _, _, log: &mut Vec<String>| {
            log.push(format!("exit {state:?}"));
        }));

        let transition = Transition::new(Lamp::Off, Lamp::On);
        let mut log = Vec::new();
        node.enter(&(), &transition, &mut log).unwrap();
        node.exit(&(), &transition, &mut log).unwrap();

        assert!(node.is_root());
        assert_eq!(log, vec!["enter On".to_string(), "exit On".to_string()]);
    }

    #[test]
    fn node_lists_its_actions_in_order() {
        let mut node: InternalState<Lamp, (), Log> =
            InternalState::new(Lamp::Off, ActionSet::new(), ActionSet::new());
        node.add_entrance_action(push("warm up"));
        node.add_entrance_action(push("glow"));
        node.add_exit_action(push("dim"));

        let names = |set: &ActionSet<Lamp, (), Log>| -> Vec<Option<String>> {
            set.iter().map(|action| action.name().map(str::to_string)).collect()
        };

        assert_eq!(
            names(node.entrance_actions()),
            vec![Some("warm up".to_string()), Some("glow".to_string())]
        );
        assert_eq!(names(node.exit_actions()), vec![Some("dim".to_string())]);
        assert_eq!(node.state(), &Lamp::Off);
        assert!(node.children().is_empty());
    }
}
