//! Arena-backed state hierarchy.
//!
//! Every state is wrapped in an [`InternalState`] node stored in a
//! [`StateGraph`]. Parent and child links are [`StateId`] indices into the
//! arena, so the back-references carry no ownership and ancestor walks are
//! O(depth).
//!
//! The graph keeps its invariants at mutation time:
//! - each state maps to exactly one node
//! - parent and child links always agree
//! - a node has at most one parent and the parent links never form a cycle

mod node;

pub use node::{ActionOrdering, ActionSet, InternalState};

use crate::core::{Action, State};
use crate::structure::Violation;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Handle of a node in a [`StateGraph`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct StateId(usize);

/// Forest of internal states, addressed by state or by [`StateId`].
pub struct StateGraph<S, E, C> {
    nodes: Vec<InternalState<S, E, C>>,
    index: HashMap<S, StateId>,
    entrance_ordering: Option<ActionOrdering<S, E, C>>,
    exit_ordering: Option<ActionOrdering<S, E, C>>,
}

impl<S: State, E, C> StateGraph<S, E, C> {
    /// Create a graph whose action sets run in insertion order.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            entrance_ordering: None,
            exit_ordering: None,
        }
    }

    /// Create a graph whose entrance and exit action sets are kept sorted by
    /// the given comparators.
    pub fn with_action_ordering(
        entrance: ActionOrdering<S, E, C>,
        exit: ActionOrdering<S, E, C>,
    ) -> Self {
        Self {
            entrance_ordering: Some(entrance),
            exit_ordering: Some(exit),
            ..Self::new()
        }
    }

    /// Add a state, returning its id. Adding a known state returns the
    /// existing id.
    pub fn insert(&mut self, state: S) -> StateId {
        if let Some(id) = self.index.get(&state) {
            return *id;
        }

        let id = StateId(self.nodes.len());
        let entrance = match &self.entrance_ordering {
            Some(ordering) => ActionSet::ordered_by(ordering.clone()),
            None => ActionSet::new(),
        };
        let exit = match &self.exit_ordering {
            Some(ordering) => ActionSet::ordered_by(ordering.clone()),
            None => ActionSet::new(),
        };
        self.nodes.push(InternalState::new(state.clone(), entrance, exit));
        self.index.insert(state, id);
        id
    }

    pub fn id(&self, state: &S) -> Option<StateId> {
        self.index.get(state).copied()
    }

    pub fn contains(&self, state: &S) -> bool {
        self.index.contains_key(state)
    }

    pub fn get(&self, id: StateId) -> Option<&InternalState<S, E, C>> {
        self.nodes.get(id.0)
    }

    /// Node for an id handed out by this graph.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this graph.
    pub fn node(&self, id: StateId) -> &InternalState<S, E, C> {
        &self.nodes[id.0]
    }

    pub fn node_of(&self, state: &S) -> Option<&InternalState<S, E, C>> {
        self.id(state).map(|id| self.node(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_entrance_action(&mut self, state: S, action: Action<S, E, C>) -> bool {
        let id = self.insert(state);
        self.nodes[id.0].add_entrance_action(action)
    }

    pub fn add_exit_action(&mut self, state: S, action: Action<S, E, C>) -> bool {
        let id = self.insert(state);
        self.nodes[id.0].add_exit_action(action)
    }

    /// Make `parent` the parent of `child`, adding either state if unknown.
    ///
    /// Setting the same parent twice is a no-op. Giving a state a second,
    /// different parent or creating a cycle is rejected and leaves the graph
    /// unchanged.
    pub fn set_parent(&mut self, child: S, parent: S) -> Result<(), Violation> {
        let child_id = self.insert(child);
        let parent_id = self.insert(parent);

        if self.ancestors(parent_id).any(|id| id == child_id) {
            return Err(Violation::Cycle {
                child: format!("{:?}", self.node(child_id).state()),
                parent: format!("{:?}", self.node(parent_id).state()),
            });
        }

        match self.nodes[child_id.0].parent {
            Some(existing) if existing == parent_id => Ok(()),
            Some(existing) => Err(Violation::Reparent {
                child: format!("{:?}", self.node(child_id).state()),
                existing: format!("{:?}", self.node(existing).state()),
                requested: format!("{:?}", self.node(parent_id).state()),
            }),
            None => {
                self.nodes[child_id.0].parent = Some(parent_id);
                self.nodes[parent_id.0].children.push(child_id);
                Ok(())
            }
        }
    }

    /// Walk from `id` (inclusive) up to its root.
    pub fn ancestors(&self, id: StateId) -> Ancestors<'_, S, E, C> {
        Ancestors {
            graph: self,
            next: Some(id),
        }
    }

    /// Number of ancestors above `id`; roots have depth zero.
    pub fn depth(&self, id: StateId) -> usize {
        self.ancestors(id).count() - 1
    }

    /// Nearest node present in the ancestor chains of both `a` and `b`.
    ///
    /// Each chain starts at the node itself, so the common ancestor of a node
    /// and one of its descendants is the node. Returns `None` when the two
    /// nodes live in different trees.
    pub fn common_ancestor(&self, a: StateId, b: StateId) -> Option<StateId> {
        let chain: HashSet<StateId> = self.ancestors(a).collect();
        self.ancestors(b).find(|id| chain.contains(id))
    }

    /// Nodes exited when leaving `from` for `ancestor`, nearest first.
    ///
    /// Runs up to but excluding `ancestor`; with no ancestor the whole chain
    /// up to and including the root is returned.
    pub fn exit_path(&self, from: StateId, ancestor: Option<StateId>) -> Vec<StateId> {
        self.ancestors(from)
            .take_while(|id| Some(*id) != ancestor)
            .collect()
    }

    /// Nodes entered when descending from `ancestor` to `to`, outermost
    /// first and ending with `to`.
    pub fn entry_path(&self, to: StateId, ancestor: Option<StateId>) -> Vec<StateId> {
        let mut path = self.exit_path(to, ancestor);
        path.reverse();
        path
    }
}

impl<S: State, E, C> Default for StateGraph<S, E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug, E, C> fmt::Debug for StateGraph<S, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.nodes.iter()).finish()
    }
}

/// Iterator over a node and its ancestors, nearest first.
pub struct Ancestors<'a, S, E, C> {
    graph: &'a StateGraph<S, E, C>,
    next: Option<StateId>,
}

impl<S, E, C> Iterator for Ancestors<'_, S, E, C> {
    type Item = StateId;

    fn next(&mut self) -> Option<StateId> {
        let current = self.next?;
        self.next = self.graph.nodes.get(current.0).and_then(|node| node.parent);
        Some(current)
    }
}
