//! Guard predicates for controlling transitions.
//!
//! Guards are boolean functions over the machine context. They decide whether
//! a transition is currently eligible and must not have side effects: the
//! engine may evaluate the same guard several times while walking up the state
//! hierarchy during a single `fire`.

use std::fmt;
use std::sync::Arc;

/// Read-only predicate that determines if a transition may fire.
///
/// Cloning a guard is cheap; clones share the same predicate.
///
/// # Example
///
/// ```rust
/// use stratum::core::Guard;
///
/// struct Door {
///     locked: bool,
/// }
///
/// let unlocked = Guard::new(|door: &Door| !door.locked);
///
/// assert!(unlocked.allowed(&Door { locked: false }));
/// assert!(!unlocked.allowed(&Door { locked: true }));
/// ```
pub struct Guard<C> {
    predicate: Arc<dyn Fn(&C) -> bool + Send + Sync>,
}

impl<C> Guard<C> {
    /// Create a guard from a predicate function.
    ///
    /// The predicate must be deterministic with respect to the context and
    /// thread-safe (`Send + Sync`).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// A guard that always allows the transition.
    pub fn always() -> Self {
        Guard::new(|_| true)
    }

    /// Check if the guard allows the transition for this context.
    pub fn allowed(&self, context: &C) -> bool {
        (self.predicate)(context)
    }
}

impl<C> Clone for Guard<C> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<C> Default for Guard<C> {
    fn default() -> Self {
        Self::always()
    }
}

impl<C> fmt::Debug for Guard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}
