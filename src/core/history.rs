//! In-memory record of completed transitions.
//!
//! [`TransitionHistory`] is an immutable log: `record` returns a new history
//! with the entry appended. [`HistoryRecorder`] plugs a shared history into a
//! machine as a transition listener. Records only live as long as the
//! recorder; nothing is written out.

use crate::core::ActionResult;
use crate::machine::TransitionStage;
use crate::transition::Transition;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// One completed transition.
///
/// `source` is the state the transition was declared on, which may be an
/// ancestor of the state the machine was actually in.
///
/// # Example
///
/// ```rust
/// use stratum::core::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     event: "start",
///     source: "idle",
///     destination: "running",
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.destination, "running");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionRecord<S, E> {
    pub event: E,
    pub source: S,
    pub destination: S,
    pub timestamp: DateTime<Utc>,
}

/// Ordered log of completed transitions.
#[derive(Clone, Debug)]
pub struct TransitionHistory<S, E> {
    records: Vec<TransitionRecord<S, E>>,
}

impl<S, E> Default for TransitionHistory<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E> TransitionHistory<S, E> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[TransitionRecord<S, E>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path of declared states: the first source, then every destination.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(&first.source);
        }
        for record in &self.records {
            path.push(&record.destination);
        }
        path
    }

    /// Time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.first()?, self.records.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }
}

impl<S: Clone, E: Clone> TransitionHistory<S, E> {
    /// Return a new history with `record` appended. `self` is unchanged.
    pub fn record(&self, record: TransitionRecord<S, E>) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }
}

/// Shared history fed by a machine listener.
///
/// # Example
///
/// ```rust
/// use stratum::builder::StructureBuilder;
/// use stratum::core::HistoryRecorder;
///
/// let mut builder = StructureBuilder::<&'static str, &'static str, ()>::new();
/// builder.configure("idle").handle("start", "running");
/// builder.configure("running");
/// let mut machine = builder.build("idle", ()).unwrap();
///
/// let recorder = HistoryRecorder::new();
/// machine.add_transition_listener(recorder.listener());
/// machine.fire("start").unwrap();
///
/// assert_eq!(recorder.history().get_path(), vec![&"idle", &"running"]);
/// ```
pub struct HistoryRecorder<S, E> {
    history: Arc<Mutex<TransitionHistory<S, E>>>,
}

impl<S: Clone + Send + 'static, E: Clone + Send + 'static> HistoryRecorder<S, E> {
    pub fn new() -> Self {
        Self {
            history: Arc::new(Mutex::new(TransitionHistory::new())),
        }
    }

    /// Listener that records each transition once it has completed.
    pub fn listener<C: 'static>(
        &self,
    ) -> impl FnMut(TransitionStage, &E, &Transition<S, E, C>, &C) -> ActionResult + Send + 'static
    {
        let history = Arc::clone(&self.history);
        move |stage, event, transition, _context| {
            if stage == TransitionStage::After {
                let mut guard = history.lock();
                *guard = guard.record(TransitionRecord {
                    event: event.clone(),
                    source: transition.source().clone(),
                    destination: transition.destination(),
                    timestamp: Utc::now(),
                });
            }
            Ok(())
        }
    }

    /// Copy of the history recorded so far.
    pub fn history(&self) -> TransitionHistory<S, E> {
        self.history.lock().clone()
    }
}

impl<S: Clone + Send + 'static, E: Clone + Send + 'static> Default for HistoryRecorder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E> Clone for HistoryRecorder<S, E> {
    fn clone(&self) -> Self {
        Self {
            history: Arc::clone(&self.history),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Initial,
        Processing,
        Complete,
    }

    fn record(source: TestState, destination: TestState) -> TransitionRecord<TestState, u8> {
        TransitionRecord {
            event: 0,
            source,
            destination,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: TransitionHistory<TestState, u8> = TransitionHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = TransitionHistory::new();

        let new_history = history.record(record(TestState::Initial, TestState::Processing));

        assert_eq!(history.len(), 0);
        assert_eq!(new_history.len(), 1);
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let history = TransitionHistory::new()
            .record(record(TestState::Initial, TestState::Processing))
            .record(record(TestState::Processing, TestState::Complete));

        let path = history.get_path();
        assert_eq!(
            path,
            vec![
                &TestState::Initial,
                &TestState::Processing,
                &TestState::Complete
            ]
        );
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let history = TransitionHistory::new().record(record(TestState::Initial, TestState::Processing));

        std::thread::sleep(Duration::from_millis(10));

        let history = history.record(record(TestState::Processing, TestState::Complete));

        assert!(history.duration().unwrap() >= Duration::from_millis(10));
    }

    #[test]
    fn recorder_only_records_completed_transitions() {
        let recorder: HistoryRecorder<TestState, u8> = HistoryRecorder::new();
        let mut listener = recorder.listener::<()>();
        let transition = Transition::new(TestState::Initial, TestState::Processing);

        listener(TransitionStage::Before, &1, &transition, &()).unwrap();
        listener(TransitionStage::Between, &1, &transition, &()).unwrap();
        assert!(recorder.history().is_empty());

        listener(TransitionStage::After, &1, &transition, &()).unwrap();
        let history = recorder.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history.records()[0].event, 1);
        assert_eq!(history.records()[0].destination, TestState::Processing);
    }
}
