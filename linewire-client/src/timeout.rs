//! Cancel-able timeouts.
//!
//! A [`Timeout`] is a future that fails with [`CompletionError::Timeout`]
//! once its delay has elapsed, unless [`TimeoutHandle::cancel`] was called
//! first. A cancelled timeout never settles through this mechanism; it is
//! meant to be raced against something else that does, see [`with_timeout`].
//!
//! Creating a timeout requires a tokio runtime with the time driver enabled.

use crate::error::CompletionError;
use pin_project_lite::pin_project;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use std::time::Duration;
use tokio::time::{Instant, Sleep};

#[derive(Debug)]
struct TimeoutState {
    deadline: Instant,
    cancelled: AtomicBool,
}

pin_project! {
    /// Future that fails with a timeout error after a fixed delay.
    ///
    /// `T` is the success type of whatever the timeout is raced against; this
    /// future itself never succeeds.
    #[derive(Debug)]
    #[must_use = "futures do nothing unless polled"]
    pub struct Timeout<T> {
        #[pin]
        sleep: Sleep,
        delay: Duration,
        state: Arc<TimeoutState>,
        _output: PhantomData<fn() -> T>,
    }
}

impl<T> Timeout<T> {
    /// Schedules a timeout that fires after `delay`.
    pub fn new(delay: Duration) -> Self {
        let deadline = Instant::now() + delay;
        Self {
            sleep: tokio::time::sleep_until(deadline),
            delay,
            state: Arc::new(TimeoutState {
                deadline,
                cancelled: AtomicBool::new(false),
            }),
            _output: PhantomData,
        }
    }

    /// Returns a handle that can cancel this timeout from elsewhere.
    pub fn handle(&self) -> TimeoutHandle {
        TimeoutHandle {
            state: self.state.clone(),
        }
    }

    /// Cancels the timeout. See [`TimeoutHandle::cancel`].
    pub fn cancel(&self) {
        self.handle().cancel();
    }

    /// Returns the configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T> Future for Timeout<T> {
    type Output = Result<T, CompletionError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        if this.state.cancelled.load(Ordering::Acquire) {
            return Poll::Pending;
        }
        ready!(this.sleep.poll(cx));
        if this.state.cancelled.load(Ordering::Acquire) {
            return Poll::Pending;
        }
        Poll::Ready(Err(CompletionError::Timeout { after: *this.delay }))
    }
}

/// Cancels a [`Timeout`]. Cloneable; all clones control the same timeout.
#[derive(Debug, Clone)]
pub struct TimeoutHandle {
    state: Arc<TimeoutState>,
}

impl TimeoutHandle {
    /// Suppresses the timeout permanently if its delay has not elapsed yet.
    ///
    /// Idempotent. Once the deadline has passed the timeout has fired and this
    /// is a no-op.
    pub fn cancel(&self) {
        if Instant::now() < self.state.deadline {
            self.state.cancelled.store(true, Ordering::Release);
        }
    }

    /// Returns whether the timeout was cancelled before firing.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }
}

/// Races `future` against a timeout of `delay`.
///
/// Whichever settles first decides the outcome; the timeout is cancelled as
/// soon as either side settles so no timer outlives the exchange.
pub async fn with_timeout<F, T>(future: F, delay: Duration) -> Result<T, CompletionError>
where
    F: Future<Output = Result<T, CompletionError>>,
{
    let timeout = Timeout::<T>::new(delay);
    let handle = timeout.handle();

    let outcome = tokio::select! {
        outcome = future => outcome,
        outcome = timeout => outcome,
    };
    handle.cancel();
    outcome
}
