//! Transitions and their (possibly dynamic) destinations.

use crate::core::{Guard, TransitionAction};
use std::fmt;
use std::sync::Arc;

/// Where a transition leads.
///
/// A `Dynamic` destination is a supplier evaluated on demand; it may be
/// non-deterministic or read shared state. Use [`Transition::snapshot`] to
/// freeze it before reasoning about "the" destination across several steps.
pub enum Destination<S> {
    Fixed(S),
    Dynamic(Arc<dyn Fn() -> S + Send + Sync>),
}

impl<S: Clone> Destination<S> {
    /// Evaluate the destination. Calls the supplier for dynamic destinations.
    pub fn resolve(&self) -> S {
        match self {
            Destination::Fixed(state) => state.clone(),
            Destination::Dynamic(supplier) => supplier(),
        }
    }
}

impl<S> Destination<S> {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Destination::Dynamic(_))
    }

    /// The fixed destination, if this is not a supplier.
    pub fn fixed(&self) -> Option<&S> {
        match self {
            Destination::Fixed(state) => Some(state),
            Destination::Dynamic(_) => None,
        }
    }
}

impl<S: Clone> Clone for Destination<S> {
    fn clone(&self) -> Self {
        match self {
            Destination::Fixed(state) => Destination::Fixed(state.clone()),
            Destination::Dynamic(supplier) => Destination::Dynamic(Arc::clone(supplier)),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Destination<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Fixed(state) => f.debug_tuple("Fixed").field(state).finish(),
            Destination::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// A guarded, event-triggered move from a source state to a destination.
///
/// Transitions are immutable once built. The engine never hands out the
/// configured transition itself: every `fire` works on (and returns) a
/// [`snapshot`](Transition::snapshot) whose destination is fixed.
///
/// # Example
///
/// ```rust
/// use stratum::Transition;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Phase { Draft, Review }
///
/// let transition: Transition<Phase, (), ()> = Transition::new(Phase::Draft, Phase::Review)
///     .when(|_: &()| true);
///
/// let snapshot = transition.snapshot();
/// assert_eq!(snapshot.source(), &Phase::Draft);
/// assert_eq!(snapshot.destination(), Phase::Review);
/// ```
pub struct Transition<S, E, C> {
    source: S,
    destination: Destination<S>,
    guard: Guard<C>,
    action: TransitionAction<S, E, C>,
}

impl<S: Clone, E, C> Transition<S, E, C> {
    /// Unguarded transition to a fixed destination, with no action.
    pub fn new(source: S, destination: S) -> Self {
        Self {
            source,
            destination: Destination::Fixed(destination),
            guard: Guard::always(),
            action: TransitionAction::none(),
        }
    }

    /// Unguarded transition whose destination is computed by `supplier`.
    pub fn dynamic<F>(source: S, supplier: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
    {
        Self {
            source,
            destination: Destination::Dynamic(Arc::new(supplier)),
            guard: Guard::always(),
            action: TransitionAction::none(),
        }
    }

    pub fn from_parts(
        source: S,
        destination: Destination<S>,
        guard: Guard<C>,
        action: TransitionAction<S, E, C>,
    ) -> Self {
        Self {
            source,
            destination,
            guard,
            action,
        }
    }

    pub fn with_guard(mut self, guard: Guard<C>) -> Self {
        self.guard = guard;
        self
    }

    /// Guard the transition with a predicate over the context.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.with_guard(Guard::new(predicate))
    }

    pub fn with_action(mut self, action: TransitionAction<S, E, C>) -> Self {
        self.action = action;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Evaluate the destination.
    ///
    /// For dynamic transitions this calls the supplier on every invocation.
    pub fn destination(&self) -> S {
        self.destination.resolve()
    }

    pub fn destination_supplier(&self) -> &Destination<S> {
        &self.destination
    }

    pub fn guard(&self) -> &Guard<C> {
        &self.guard
    }

    pub fn action(&self) -> &TransitionAction<S, E, C> {
        &self.action
    }

    /// Check the guard against the context.
    pub fn is_allowed(&self, context: &C) -> bool {
        self.guard.allowed(context)
    }

    /// Copy this transition with its destination frozen.
    ///
    /// The supplier is evaluated exactly once here; the copy's destination is
    /// a constant and reading it again never re-invokes the supplier.
    pub fn snapshot(&self) -> Self {
        Self {
            source: self.source.clone(),
            destination: Destination::Fixed(self.destination.resolve()),
            guard: self.guard.clone(),
            action: self.action.clone(),
        }
    }
}

impl<S: Clone, E, C> Clone for Transition<S, E, C> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            destination: self.destination.clone(),
            guard: self.guard.clone(),
            action: self.action.clone(),
        }
    }
}

impl<S: fmt::Debug, E, C> fmt::Debug for Transition<S, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum Step {
        Start,
        Left,
        Right,
    }

    #[test]
    fn fixed_destination_is_stable() {
        let transition: Transition<Step, (), ()> = Transition::new(Step::Start, Step::Left);

        assert_eq!(transition.destination(), Step::Left);
        assert_eq!(transition.destination(), Step::Left);
        assert!(!transition.destination_supplier().is_dynamic());
    }

    #[test]
    fn dynamic_destination_is_evaluated_each_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let transition: Transition<Step, (), ()> = Transition::dynamic(Step::Start, move || {
            if counter.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Step::Left
            } else {
                Step::Right
            }
        });

        assert_eq!(transition.destination(), Step::Left);
        assert_eq!(transition.destination(), Step::Right);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn snapshot_freezes_dynamic_destination() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let transition: Transition<Step, (), ()> = Transition::dynamic(Step::Start, move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Step::Right
            } else {
                Step::Left
            }
        });

        let snapshot = transition.snapshot();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(snapshot.destination(), Step::Right);
        assert_eq!(snapshot.destination(), Step::Right);
        assert_eq!(snapshot.snapshot().destination(), Step::Right);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(snapshot.destination_supplier().fixed(), Some(&Step::Right));
    }

    #[test]
    fn snapshot_keeps_guard_and_source() {
        let transition: Transition<Step, (), u32> =
            Transition::new(Step::Start, Step::Left).when(|n: &u32| *n > 1);

        let snapshot = transition.snapshot();

        assert_eq!(snapshot.source(), &Step::Start);
        assert!(snapshot.is_allowed(&2));
        assert!(!snapshot.is_allowed(&1));
    }

    #[test]
    fn debug_does_not_evaluate_suppliers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let transition: Transition<Step, (), ()> = Transition::dynamic(Step::Start, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Step::Left
        });

        let rendered = format!("{transition:?}");

        assert!(rendered.contains("Dynamic"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
