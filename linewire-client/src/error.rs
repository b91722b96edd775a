//! Client error types.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Outcome errors for deferred results, timeouts and the write tracker.
///
/// Cloneable so one settlement can be observed by several awaiters.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("transport error: {0}")]
    Transport(Arc<std::io::Error>),

    #[error("{0}")]
    Application(Arc<dyn std::error::Error + Send + Sync>),

    #[error("resolver dropped without settling")]
    Abandoned,

    #[error("closed")]
    Closed,
}

impl CompletionError {
    /// Wraps an arbitrary error passed to a deferred's `fail`.
    pub fn application<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CompletionError::Application(Arc::new(err))
    }

    /// Wraps a transport failure.
    pub fn transport(err: std::io::Error) -> Self {
        CompletionError::Transport(Arc::new(err))
    }

    /// Returns whether this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CompletionError::Timeout { .. })
    }

    /// Returns whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::Timeout { .. } | CompletionError::Transport(_)
        )
    }
}

/// Errors from [`IntervalTimer`](crate::timer::IntervalTimer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("label not found: {0}")]
    LabelNotFound(String),
}

/// Errors from the line reader and writer.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] linewire_protocol::ProtocolError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("connection closed")]
    ConnectionClosed,
}

impl ClientError {
    /// Returns whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Io(_) => true,
            ClientError::ConnectionClosed => true,
            ClientError::Completion(e) => e.is_retryable(),
            ClientError::Protocol(_) => false,
        }
    }
}
