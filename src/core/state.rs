//! Identifier traits for states and events.
//!
//! States and events are opaque, application-defined values. The engine only
//! ever compares, hashes, clones and debug-prints them, so both traits are
//! blanket-implemented for every type with those capabilities.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state identifiers.
///
/// Any `Clone + Eq + Hash + Debug` type that can cross threads is a state;
/// enums are the usual choice.
///
/// # Example
///
/// ```rust
/// use stratum::core::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Connection {
///     Idle,
///     Connecting,
///     Connected,
/// }
///
/// fn assert_state<S: State>(_: &S) {}
/// assert_state(&Connection::Idle);
/// ```
pub trait State: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> State for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Trait for event identifiers.
///
/// Events key the transition table, so they carry the same requirements as
/// states.
pub trait Event: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Event for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}
