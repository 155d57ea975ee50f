//! Side-effecting actions run at state entry, state exit, and mid-transition.

use crate::transition::Transition;
use std::fmt;
use std::sync::Arc;

/// Error returned by actions and listeners.
///
/// The engine never inspects or wraps these; they are handed back to the
/// caller of `fire` as-is.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Result type of actions and listeners.
pub type ActionResult = Result<(), ActionError>;

type StateActionFn<S, E, C> =
    dyn Fn(&S, &E, &Transition<S, E, C>, &mut C) -> ActionResult + Send + Sync;

type TransitionActionFn<S, E, C> =
    dyn Fn(Option<&S>, &E, &Transition<S, E, C>, &mut C) -> ActionResult + Send + Sync;

/// Entrance or exit action attached to a state.
///
/// Invoked with the state being entered or exited, the fired event, the
/// transition snapshot, and the mutable context. Clones share the underlying
/// closure, which is also what makes two actions "the same" for action sets.
///
/// # Example
///
/// ```rust
/// use stratum::core::Action;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Light { Red, Green }
///
/// let log_entry: Action<Light, &'static str, Vec<String>> =
///     Action::infallible(|state, _event, _transition, log: &mut Vec<String>| {
///         log.push(format!("entered {state:?}"));
///     })
///     .named("log-entry")
///     .with_priority(10);
///
/// assert_eq!(log_entry.name(), Some("log-entry"));
/// assert_eq!(log_entry.priority(), 10);
/// ```
pub struct Action<S, E, C> {
    name: Option<Arc<str>>,
    priority: i32,
    run: Arc<StateActionFn<S, E, C>>,
}

impl<S, E, C> Action<S, E, C> {
    /// Create an action from a fallible closure.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn(&S, &E, &Transition<S, E, C>, &mut C) -> ActionResult + Send + Sync + 'static,
    {
        Self {
            name: None,
            priority: 0,
            run: Arc::new(run),
        }
    }

    /// Create an action from a closure that cannot fail.
    pub fn infallible<F>(run: F) -> Self
    where
        F: Fn(&S, &E, &Transition<S, E, C>, &mut C) + Send + Sync + 'static,
    {
        Self::new(move |state, event, transition, context| {
            run(state, event, transition, context);
            Ok(())
        })
    }

    /// Attach a name, used in logs and available to action comparators.
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a priority, available to action comparators.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Run the action.
    pub fn perform(
        &self,
        state: &S,
        event: &E,
        transition: &Transition<S, E, C>,
        context: &mut C,
    ) -> ActionResult {
        (self.run)(state, event, transition, context)
    }

    /// True when both actions share the same closure.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.run, &other.run)
    }
}

impl<S, E, C> Clone for Action<S, E, C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            priority: self.priority,
            run: Arc::clone(&self.run),
        }
    }
}

impl<S, E, C> fmt::Debug for Action<S, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Action performed by a transition between its exit and enter stages.
///
/// The state argument is the common ancestor of the source and destination,
/// or `None` when the two live in disjoint trees.
pub struct TransitionAction<S, E, C> {
    run: Arc<TransitionActionFn<S, E, C>>,
}

impl<S, E, C> TransitionAction<S, E, C> {
    pub fn new<F>(run: F) -> Self
    where
        F: Fn(Option<&S>, &E, &Transition<S, E, C>, &mut C) -> ActionResult
            + Send
            + Sync
            + 'static,
    {
        Self { run: Arc::new(run) }
    }

    pub fn infallible<F>(run: F) -> Self
    where
        F: Fn(Option<&S>, &E, &Transition<S, E, C>, &mut C) + Send + Sync + 'static,
    {
        Self::new(move |state, event, transition, context| {
            run(state, event, transition, context);
            Ok(())
        })
    }

    /// An action that does nothing.
    pub fn none() -> Self {
        Self::new(|_, _, _, _| Ok(()))
    }

    pub fn perform(
        &self,
        state: Option<&S>,
        event: &E,
        transition: &Transition<S, E, C>,
        context: &mut C,
    ) -> ActionResult {
        (self.run)(state, event, transition, context)
    }
}

impl<S, E, C> Clone for TransitionAction<S, E, C> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<S, E, C> Default for TransitionAction<S, E, C> {
    fn default() -> Self {
        Self::none()
    }
}

impl<S, E, C> fmt::Debug for TransitionAction<S, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionAction").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum Phase {
        One,
        Two,
    }

    type Log = Vec<String>;

    fn transition() -> Transition<Phase, u8, Log> {
        Transition::new(Phase::One, Phase::Two)
    }

    #[test]
    fn action_receives_state_and_context() {
        let action: Action<Phase, u8, Log> = Action::infallible(|state, event, _, log: &mut Log| {
            log.push(format!("{state:?}:{event}"));
        });

        let mut log = Vec::new();
        action
            .perform(&Phase::One, &3, &transition(), &mut log)
            .unwrap();

        assert_eq!(log, vec!["One:3".to_string()]);
    }

    #[test]
    fn failing_action_returns_its_error() {
        let action: Action<Phase, u8, Log> = Action::new(|_, _, _, _| Err("boom".into()));

        let err = action
            .perform(&Phase::One, &0, &transition(), &mut Vec::new())
            .unwrap_err();

        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn clones_are_the_same_action() {
        let action: Action<Phase, u8, Log> = Action::infallible(|_, _, _, _| {});
        let other: Action<Phase, u8, Log> = Action::infallible(|_, _, _, _| {});

        assert!(action.same_as(&action.clone()));
        assert!(!action.same_as(&other));
    }

    #[test]
    fn transition_action_sees_optional_state() {
        let action: TransitionAction<Phase, u8, Log> =
            TransitionAction::infallible(|state, _, _, log: &mut Log| {
                log.push(format!("{state:?}"));
            });

        let mut log = Vec::new();
        action
            .perform(Some(&Phase::One), &0, &transition(), &mut log)
            .unwrap();
        action.perform(None, &0, &transition(), &mut log).unwrap();

        assert_eq!(log, vec!["Some(One)".to_string(), "None".to_string()]);
    }
}
