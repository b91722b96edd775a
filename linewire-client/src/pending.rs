//! In-flight write tracking for backpressure.
//!
//! The socket-write path owns a [`PendingWrites`] and reports every write it
//! issues and every write the transport confirms. Anyone who wants to know
//! whether everything queued so far has actually been flushed awaits
//! [`PendingWrites::completion`].
//!
//! The tracker moves forward only:
//!
//! ```text
//! Open --(count back to zero after > 0)--> Flushed (counting continues)
//! Open | Flushed --err(e)--> Failed   (terminal)
//! Open | Flushed --close()--> Closed  (terminal)
//! ```
//!
//! The completion settles exactly once: with `Ok(())` on the first drain, or
//! with the error from `err` / [`CompletionError::Closed`] if that comes first.

use crate::error::CompletionError;
use std::future::Future;
use tokio::sync::watch;

type Settlement = Option<Result<(), CompletionError>>;

/// Tracker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Accepting writes.
    Open,
    /// Failed with a transport error; further calls are ignored.
    Failed,
    /// Closed by the owner; further calls are ignored.
    Closed,
}

/// Counter of outstanding written bytes plus a one-shot completion signal.
#[derive(Debug)]
pub struct PendingWrites {
    pending: usize,
    written_once: bool,
    state: TrackerState,
    settled: watch::Sender<Settlement>,
}

impl PendingWrites {
    pub fn new() -> Self {
        let (settled, _) = watch::channel(None);
        Self {
            pending: 0,
            written_once: false,
            state: TrackerState::Open,
            settled,
        }
    }

    /// Records `bytes` handed to the transport.
    pub fn write(&mut self, bytes: usize) {
        if self.state != TrackerState::Open {
            return;
        }
        self.pending += bytes;
        if bytes > 0 {
            self.written_once = true;
        }
    }

    /// Records `bytes` confirmed by the transport.
    ///
    /// Acknowledging more than is outstanding saturates the counter at zero.
    pub fn wrote(&mut self, bytes: usize) {
        if self.state != TrackerState::Open {
            return;
        }
        self.pending = self.pending.saturating_sub(bytes);
        if self.pending == 0 && self.written_once {
            self.settle(Ok(()));
        }
    }

    /// Fails the tracker. An unsettled completion settles with `error`.
    pub fn err(&mut self, error: CompletionError) {
        if self.state != TrackerState::Open {
            return;
        }
        self.state = TrackerState::Failed;
        self.settle(Err(error));
    }

    /// Closes the tracker. An unsettled completion settles with
    /// [`CompletionError::Closed`].
    pub fn close(&mut self) {
        if self.state != TrackerState::Open {
            return;
        }
        self.state = TrackerState::Closed;
        self.settle(Err(CompletionError::Closed));
    }

    /// Returns a future that resolves when the tracker's completion settles.
    ///
    /// The future does not borrow the tracker. If the tracker is dropped
    /// before settling, it resolves to [`CompletionError::Abandoned`].
    pub fn completion(
        &self,
    ) -> impl Future<Output = Result<(), CompletionError>> + Send + 'static {
        let mut rx = self.settled.subscribe();
        async move {
            loop {
                let current = rx.borrow_and_update().clone();
                if let Some(outcome) = current {
                    return outcome;
                }
                if rx.changed().await.is_err() {
                    let last = rx.borrow().clone();
                    return last.unwrap_or(Err(CompletionError::Abandoned));
                }
            }
        }
    }

    /// Returns the number of bytes written but not yet confirmed.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> TrackerState {
        self.state
    }

    /// Returns whether the completion has settled.
    pub fn is_settled(&self) -> bool {
        self.settled.borrow().is_some()
    }

    fn settle(&self, outcome: Result<(), CompletionError>) {
        self.settled.send_if_modified(|settled| {
            if settled.is_some() {
                return false;
            }
            *settled = Some(outcome);
            true
        });
    }
}

impl Default for PendingWrites {
    fn default() -> Self {
        Self::new()
    }
}
