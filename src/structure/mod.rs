//! The state graph and transition table a machine runs on.
//!
//! A [`Structure`] is validated once when it is created and is read-only
//! afterwards. Validation uses Stillwater's `Validation` so that every defect
//! is reported in one pass instead of stopping at the first.

mod error;

pub use error::{StructureError, Violation};

use crate::core::{Event, State};
use crate::graph::StateGraph;
use crate::transition::Transition;
use std::collections::HashMap;
use std::fmt;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Event → candidate transitions.
pub type TransitionTable<S, E, C> = HashMap<E, Vec<Transition<S, E, C>>>;

/// State graph plus transition table, owned by one machine.
pub struct Structure<S, E, C> {
    graph: StateGraph<S, E, C>,
    transitions: TransitionTable<S, E, C>,
}

impl<S: State, E: Event, C> Structure<S, E, C> {
    /// Assemble a structure, checking that every transition's source and
    /// fixed destination exist in the graph.
    ///
    /// Dynamic destinations cannot be checked here; an unknown state produced
    /// by a supplier is reported when the transition fires.
    pub fn new(
        graph: StateGraph<S, E, C>,
        transitions: TransitionTable<S, E, C>,
    ) -> Result<Self, StructureError> {
        Self::with_violations(graph, transitions, Vec::new())
    }

    /// Like [`Structure::new`], also reporting `recorded` violations found
    /// while the graph was assembled.
    pub(crate) fn with_violations(
        graph: StateGraph<S, E, C>,
        transitions: TransitionTable<S, E, C>,
        recorded: Vec<Violation>,
    ) -> Result<Self, StructureError> {
        let structure = Self { graph, transitions };
        into_result(structure.validate_transitions(recorded))?;
        Ok(structure)
    }

    /// Check that `state` can be used as a starting state.
    pub fn check_starting_state(&self, state: &S) -> Result<(), StructureError> {
        into_result(check_known(&self.graph, state, || {
            Violation::UnknownStartingState {
                state: format!("{state:?}"),
            }
        }))
    }

    pub fn graph(&self) -> &StateGraph<S, E, C> {
        &self.graph
    }

    /// Transitions registered for `event`, in registration order.
    pub fn transitions(&self, event: &E) -> &[Transition<S, E, C>] {
        self.transitions
            .get(event)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn validate_transitions(&self, recorded: Vec<Violation>) -> Validation<(), NonEmptyVec<Violation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<Violation>>> =
            recorded.into_iter().map(Validation::fail).collect();

        for (event, transitions) in &self.transitions {
            for transition in transitions {
                let source = transition.source();
                checks.push(check_known(&self.graph, source, || {
                    Violation::UnknownSource {
                        event: format!("{event:?}"),
                        state: format!("{source:?}"),
                    }
                }));

                if let Some(destination) = transition.destination_supplier().fixed() {
                    checks.push(check_known(&self.graph, destination, || {
                        Violation::UnknownDestination {
                            event: format!("{event:?}"),
                            state: format!("{destination:?}"),
                        }
                    }));
                }
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }
}

impl<S: fmt::Debug, E: fmt::Debug, C> fmt::Debug for Structure<S, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Structure")
            .field("graph", &self.graph)
            .field("transitions", &self.transitions)
            .finish()
    }
}

fn check_known<S: State, E, C>(
    graph: &StateGraph<S, E, C>,
    state: &S,
    violation: impl FnOnce() -> Violation,
) -> Validation<(), NonEmptyVec<Violation>> {
    if graph.contains(state) {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

fn into_result(validation: Validation<(), NonEmptyVec<Violation>>) -> Result<(), StructureError> {
    match validation {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => {
            let mut violations: Vec<Violation> = errors.iter().cloned().collect();
            violations.sort();
            Err(StructureError::Invalid(violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum Mode {
        Off,
        On,
        Broken,
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum Signal {
        Toggle,
        Smash,
    }

    fn graph() -> StateGraph<Mode, Signal, ()> {
        let mut graph = StateGraph::new();
        graph.insert(Mode::Off);
        graph.insert(Mode::On);
        graph
    }

    #[test]
    fn valid_structure_builds() {
        let mut table = TransitionTable::new();
        table.insert(
            Signal::Toggle,
            vec![
                Transition::new(Mode::Off, Mode::On),
                Transition::new(Mode::On, Mode::Off),
            ],
        );

        let structure = Structure::new(graph(), table).unwrap();

        assert_eq!(structure.transitions(&Signal::Toggle).len(), 2);
        assert!(structure.transitions(&Signal::Smash).is_empty());
        assert!(structure.check_starting_state(&Mode::Off).is_ok());
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let mut table = TransitionTable::new();
        table.insert(
            Signal::Smash,
            vec![
                Transition::new(Mode::On, Mode::Broken),
                Transition::new(Mode::Broken, Mode::Off),
            ],
        );

        let result = Structure::new(graph(), table);

        match result {
            Err(StructureError::Invalid(violations)) => {
                assert_eq!(violations.len(), 2);
                assert!(violations
                    .iter()
                    .any(|v| matches!(v, Violation::UnknownSource { .. })));
                assert!(violations
                    .iter()
                    .any(|v| matches!(v, Violation::UnknownDestination { .. })));
            }
            other => panic!("Expected invalid structure, got {other:?}"),
        }
    }

    #[test]
    fn dynamic_destinations_are_not_checked_at_build_time() {
        let mut table = TransitionTable::new();
        table.insert(
            Signal::Smash,
            vec![Transition::dynamic(Mode::On, || Mode::Broken)],
        );

        assert!(Structure::new(graph(), table).is_ok());
    }

    #[test]
    fn unknown_starting_state_is_reported() {
        let structure = Structure::new(graph(), TransitionTable::new()).unwrap();

        let err = structure.check_starting_state(&Mode::Broken).unwrap_err();

        assert_eq!(
            err.violations(),
            &[Violation::UnknownStartingState {
                state: "Broken".to_string()
            }]
        );
        assert!(err.to_string().contains("Broken"));
    }
}
