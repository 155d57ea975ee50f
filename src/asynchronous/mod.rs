//! Asynchronous wrapper serializing `fire` calls onto one worker thread.
//!
//! Events are queued on a bounded channel and run strictly one at a time, in
//! submission order, by a dedicated worker that owns execution. The machine
//! sits behind a mutex held for the whole staged transition, so accessors on
//! the wrapper only ever observe a machine between transitions.
//!
//! Actions and listeners run on the worker thread. A callback that blocks
//! stalls every event queued behind it. Calling [`AsyncStateMachine::fire`]
//! from a callback is fine (it only enqueues); calling the other accessors of
//! the same wrapper from a callback deadlocks.

mod handle;

pub use handle::FireHandle;

use crate::config::{ConfigError, EngineConfig};
use crate::core::{ActionResult, Event, State};
use crate::machine::{FireError, FireResult, ListenerId, StateMachine, TransitionStage};
use crate::structure::StructureError;
use crate::transition::Transition;
use handle::JobStatus;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};
use uuid::Uuid;

/// Errors that can occur while starting an [`AsyncStateMachine`].
#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

struct Job<S, E, C> {
    event: E,
    status: JobStatus,
    reply: oneshot::Sender<FireResult<S, E, C>>,
}

/// A [`StateMachine`] driven from any thread through a serialized queue.
///
/// # Example
///
/// ```rust
/// use stratum::asynchronous::AsyncStateMachine;
/// use stratum::builder::StructureBuilder;
///
/// let mut builder = StructureBuilder::<&'static str, &'static str, ()>::new();
/// builder.configure("idle").handle("start", "running");
/// builder.configure("running").handle("stop", "idle");
///
/// let machine = AsyncStateMachine::new(builder.build("idle", ()).unwrap()).unwrap();
///
/// machine.fire("start").wait().unwrap();
/// assert_eq!(machine.state(), Some("running"));
/// ```
pub struct AsyncStateMachine<S, E, C> {
    id: Uuid,
    shared: Arc<Mutex<StateMachine<S, E, C>>>,
    sender: Option<mpsc::Sender<Job<S, E, C>>>,
    capacity: usize,
    worker: Option<thread::JoinHandle<()>>,
}

impl<S: State, E: Event, C: Send + 'static> AsyncStateMachine<S, E, C> {
    /// Start a worker for `machine` with the default configuration.
    pub fn new(machine: StateMachine<S, E, C>) -> Result<Self, StartError> {
        Self::with_config(machine, &EngineConfig::default())
    }

    pub fn with_config(machine: StateMachine<S, E, C>, config: &EngineConfig) -> Result<Self, StartError> {
        config.validate()?;

        let id = machine.id();
        let shared = Arc::new(Mutex::new(machine));
        let (sender, receiver) = mpsc::channel(config.queue_capacity);

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(config.worker_name.clone())
            .spawn(move || run_worker(worker_shared, receiver))?;
        debug!(machine = %id, worker = %config.worker_name, "Started state machine worker");

        Ok(Self {
            id,
            shared,
            sender: Some(sender),
            capacity: config.queue_capacity,
            worker: Some(worker),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue an event.
    ///
    /// Returns immediately; the handle resolves once the worker has run the
    /// event. A full queue or a stopped worker is reported through the handle.
    pub fn fire(&self, event: E) -> FireHandle<S, E, C> {
        let (reply, receiver) = oneshot::channel();
        let status = JobStatus::new();
        let job = Job {
            event,
            status: status.clone(),
            reply,
        };

        let rejected = match &self.sender {
            Some(sender) => match sender.try_send(job) {
                Ok(()) => None,
                Err(TrySendError::Full(job)) => Some((
                    job,
                    FireError::QueueFull {
                        capacity: self.capacity,
                    },
                )),
                Err(TrySendError::Closed(job)) => Some((job, FireError::WorkerStopped)),
            },
            None => None,
        };

        if let Some((job, error)) = rejected {
            debug!(machine = %self.id, event = ?job.event, %error, "Event rejected");
            job.status.start();
            let _ = job.reply.send(Err(error));
        }

        FireHandle::new(receiver, status)
    }

    /// The current state, once any in-flight transition has finished.
    pub fn state(&self) -> Option<S> {
        self.shared.lock().state().cloned()
    }

    /// Run `f` with the context, once any in-flight transition has finished.
    pub fn with_context<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(self.shared.lock().context())
    }

    pub fn with_context_mut<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(self.shared.lock().context_mut())
    }

    pub fn add_transition_listener<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(TransitionStage, &E, &Transition<S, E, C>, &C) -> ActionResult + Send + 'static,
    {
        self.shared.lock().add_transition_listener(listener)
    }

    pub fn remove_transition_listener(&self, id: ListenerId) -> bool {
        self.shared.lock().remove_transition_listener(id)
    }

    /// Stop accepting events, run everything already queued, and hand back
    /// the machine.
    pub fn into_inner(self) -> Option<StateMachine<S, E, C>> {
        let shared = Arc::clone(&self.shared);
        drop(self);
        Arc::try_unwrap(shared).ok().map(Mutex::into_inner)
    }
}

impl<S, E, C> AsyncStateMachine<S, E, C> {
    fn stop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            // A callback may hold the last reference; never join ourselves.
            if worker.thread().id() != thread::current().id() && worker.join().is_err() {
                debug!(machine = %self.id, "State machine worker panicked");
            }
        }
    }
}

impl<S, E, C> Drop for AsyncStateMachine<S, E, C> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker<S: State, E: Event, C>(
    shared: Arc<Mutex<StateMachine<S, E, C>>>,
    mut receiver: mpsc::Receiver<Job<S, E, C>>,
) {
    while let Some(job) = receiver.blocking_recv() {
        if !job.status.start() {
            trace!(event = ?job.event, "Skipping cancelled event");
            continue;
        }

        let result = shared.lock().fire(job.event);
        if job.reply.send(result).is_err() {
            trace!("Fire handle dropped before the result was delivered");
        }
    }
    debug!("State machine worker stopped");
}
