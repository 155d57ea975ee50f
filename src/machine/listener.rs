//! Transition listeners.

use crate::core::ActionResult;
use crate::transition::Transition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of a transition a listener is notified about.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TransitionStage {
    /// Before any exit action runs.
    Before,
    /// After the exit stage, before the transition's own action.
    Between,
    /// After the destination has been entered.
    After,
}

impl fmt::Display for TransitionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransitionStage::Before => "before",
            TransitionStage::Between => "between",
            TransitionStage::After => "after",
        };
        f.write_str(name)
    }
}

/// Callback notified at every stage of every transition.
pub type Listener<S, E, C> =
    Box<dyn FnMut(TransitionStage, &E, &Transition<S, E, C>, &C) -> ActionResult + Send>;

/// Handle returned when registering a listener, used to remove it again.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ListenerId(pub(crate) u64);

/// Listeners in registration order.
pub(crate) struct Listeners<S, E, C> {
    entries: Vec<(ListenerId, Listener<S, E, C>)>,
    next_id: u64,
}

impl<S, E, C> Listeners<S, E, C> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub(crate) fn add(&mut self, listener: Listener<S, E, C>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Notify every listener in order, stopping at the first failure.
    pub(crate) fn notify(
        &mut self,
        stage: TransitionStage,
        event: &E,
        transition: &Transition<S, E, C>,
        context: &C,
    ) -> ActionResult {
        for (_, listener) in self.entries.iter_mut() {
            listener(stage, event, transition, context)?;
        }
        Ok(())
    }
}
