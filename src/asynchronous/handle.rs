//! Pending result of an asynchronous `fire`.

use crate::machine::{FireError, FireResult};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

const PENDING: u8 = 0;
const STARTED: u8 = 1;
const CANCELLED: u8 = 2;

/// Lifecycle of a queued job, shared between its handle and the worker.
#[derive(Clone, Debug)]
pub(crate) struct JobStatus(Arc<AtomicU8>);

impl JobStatus {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicU8::new(PENDING)))
    }

    /// Claim the job for execution. Fails if it was cancelled first.
    pub(crate) fn start(&self) -> bool {
        self.0
            .compare_exchange(PENDING, STARTED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn cancel(&self) -> bool {
        self.0
            .compare_exchange(PENDING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst) == CANCELLED
    }
}

/// Future resolving to the outcome of one queued event.
///
/// Dropping the handle does not cancel the event; it still runs and its
/// result is discarded.
#[must_use = "the event runs regardless, but its result is only observable through the handle"]
pub struct FireHandle<S, E, C> {
    receiver: oneshot::Receiver<FireResult<S, E, C>>,
    status: JobStatus,
}

impl<S, E, C> FireHandle<S, E, C> {
    pub(crate) fn new(receiver: oneshot::Receiver<FireResult<S, E, C>>, status: JobStatus) -> Self {
        Self { receiver, status }
    }

    /// Cancel the event if the worker has not started it yet.
    ///
    /// Returns `true` when the event will never run; the handle then resolves
    /// to [`FireError::Cancelled`]. Returns `false` once the transition has
    /// started (or finished), in which case it runs to completion.
    pub fn cancel(&self) -> bool {
        self.status.cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }

    /// Block the current thread until the result is available.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context;
    /// `.await` the handle there instead.
    pub fn wait(self) -> FireResult<S, E, C> {
        let Self { receiver, status } = self;
        if status.is_cancelled() {
            return Err(FireError::Cancelled);
        }
        match receiver.blocking_recv() {
            Ok(result) => result,
            Err(_) => Err(closed_error(&status)),
        }
    }
}

fn closed_error<S, E>(status: &JobStatus) -> FireError<S, E> {
    if status.is_cancelled() {
        FireError::Cancelled
    } else {
        FireError::WorkerStopped
    }
}

impl<S, E, C> Future for FireHandle<S, E, C> {
    type Output = FireResult<S, E, C>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.status.is_cancelled() {
            return Poll::Ready(Err(FireError::Cancelled));
        }
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(closed_error(&this.status))),
            Poll::Pending => Poll::Pending,
        }
    }
}
