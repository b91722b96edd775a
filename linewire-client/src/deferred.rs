//! Single-assignment deferred results.
//!
//! [`deferred`] returns two halves: a [`Deferred`] future held by the issuer
//! and a [`Resolver`] held by whoever produces the outcome. The first call to
//! [`Resolver::succeed`] or [`Resolver::fail`] settles the future; every later
//! call, from any clone of the resolver, is ignored.
//!
//! Awaiting tasks are woken by the settling call and run on their next poll,
//! never inside the resolver call itself.

use crate::error::CompletionError;
use futures::future::{FutureExt, Shared};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use tokio::sync::oneshot;

type Outcome<T> = Result<T, CompletionError>;

/// Creates a linked deferred future and resolver.
pub fn deferred<T>() -> (Deferred<T>, Resolver<T>) {
    let (tx, rx) = oneshot::channel();
    let resolver = Resolver {
        slot: Arc::new(Mutex::new(Some(tx))),
    };
    (Deferred { rx }, resolver)
}

/// The awaiting side of a deferred result.
///
/// Resolves to the settled outcome, or to [`CompletionError::Abandoned`] if
/// every resolver was dropped without settling.
pub struct Deferred<T> {
    rx: oneshot::Receiver<Outcome<T>>,
}

impl<T> Deferred<T> {
    /// Converts into a cloneable future so several observers share one outcome.
    pub fn shared(self) -> Shared<Self>
    where
        T: Clone,
    {
        FutureExt::shared(self)
    }
}

impl<T> Future for Deferred<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(Pin::new(&mut self.rx).poll(cx)) {
            Ok(outcome) => Poll::Ready(outcome),
            Err(_) => Poll::Ready(Err(CompletionError::Abandoned)),
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

/// The completing side of a deferred result. Clones share the same slot.
pub struct Resolver<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<Outcome<T>>>>>,
}

impl<T> Resolver<T> {
    /// Settles the deferred with a value.
    ///
    /// Returns `true` if this call settled it, `false` if it was already settled.
    pub fn succeed(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settles the deferred with an error.
    ///
    /// Returns `true` if this call settled it, `false` if it was already settled.
    pub fn fail(&self, err: CompletionError) -> bool {
        self.settle(Err(err))
    }

    /// Returns whether the deferred has already been settled.
    pub fn is_settled(&self) -> bool {
        self.slot.lock().is_none()
    }

    fn settle(&self, outcome: Outcome<T>) -> bool {
        let Some(tx) = self.slot.lock().take() else {
            return false;
        };
        // The issuer may have stopped waiting; settlement still counts.
        let _ = tx.send(outcome);
        true
    }
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("settled", &self.is_settled())
            .finish()
    }
}
