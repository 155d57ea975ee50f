//! Errors raised while assembling a state machine structure.

use thiserror::Error;

/// A single configuration defect found while validating a structure.
///
/// States and events are rendered with their `Debug` form.
#[derive(Debug, Clone, Error, PartialEq, Eq, PartialOrd, Ord)]
pub enum Violation {
    #[error("Transition for event [{event}] starts from unknown state [{state}]")]
    UnknownSource { event: String, state: String },

    #[error("Transition for event [{event}] leads to unknown state [{state}]")]
    UnknownDestination { event: String, state: String },

    #[error("Starting state [{state}] is not part of the structure")]
    UnknownStartingState { state: String },

    #[error("Making [{parent}] the parent of [{child}] would create a cycle")]
    Cycle { child: String, parent: String },

    #[error("State [{child}] already has parent [{existing}], cannot move it under [{requested}]")]
    Reparent {
        child: String,
        existing: String,
        requested: String,
    },
}

/// Errors that can occur when building the state graph and transition table.
///
/// Every defect found is reported at once, sorted.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("Invalid state machine structure ({} violation(s)): {}", .0.len(), render(.0))]
    Invalid(Vec<Violation>),
}

impl StructureError {
    pub fn violations(&self) -> &[Violation] {
        match self {
            StructureError::Invalid(violations) => violations,
        }
    }
}

fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
