//! Socket-write path with in-flight tracking.

use crate::config::ClientConfig;
use crate::error::{ClientError, CompletionError};
use crate::pending::PendingWrites;
use crate::timeout::with_timeout;
use linewire_protocol::Encoder;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Writes CR-LF terminated lines and reports them to a [`PendingWrites`].
pub struct LineWriter<W> {
    inner: W,
    pending: PendingWrites,
    max_line_size: usize,
    flush_timeout: Duration,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, &ClientConfig::default())
    }

    pub fn with_config(inner: W, config: &ClientConfig) -> Self {
        Self {
            inner,
            pending: PendingWrites::new(),
            max_line_size: config.max_line_size,
            flush_timeout: config.flush_timeout(),
        }
    }

    /// Encodes and writes one command.
    ///
    /// A transport failure fails the tracker, so every flush waiter sees it.
    pub async fn send(&mut self, command: &str) -> Result<(), ClientError> {
        let line = Encoder::encode_line_with_limit(command, self.max_line_size)?;
        let n = line.len();

        self.pending.write(n);
        match self.inner.write_all(&line).await {
            Ok(()) => {
                self.pending.wrote(n);
                tracing::trace!(bytes = n, "wrote line");
                Ok(())
            }
            Err(e) => {
                tracing::debug!(error = %e, "write failed");
                let err = CompletionError::transport(e);
                self.pending.err(err.clone());
                Err(ClientError::Completion(err))
            }
        }
    }

    /// Resolves once every line sent so far has been handed to the transport.
    pub fn flushed(&self) -> impl Future<Output = Result<(), CompletionError>> + Send + 'static {
        self.pending.completion()
    }

    /// Like [`LineWriter::flushed`], bounded by the configured flush timeout.
    pub async fn flushed_within(&self) -> Result<(), CompletionError> {
        with_timeout(self.flushed(), self.flush_timeout).await
    }

    /// Flushes and shuts down the sink, then closes the tracker.
    pub async fn shutdown(&mut self) -> Result<(), ClientError> {
        let result = self.inner.shutdown().await;
        self.pending.close();
        result.map_err(ClientError::Io)
    }

    /// Returns the in-flight tracker.
    pub fn pending(&self) -> &PendingWrites {
        &self.pending
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
