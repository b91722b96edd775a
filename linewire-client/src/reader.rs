//! Reading control lines off a byte stream.

use crate::collect::Source;
use crate::config::ClientConfig;
use crate::error::ClientError;
use linewire_protocol::{render_visible, LineDecoder};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Pulls complete CR-LF terminated lines from an [`AsyncRead`].
pub struct LineReader<R> {
    inner: R,
    decoder: LineDecoder,
    buf: Vec<u8>,
    eof: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, &ClientConfig::default())
    }

    pub fn with_config(inner: R, config: &ClientConfig) -> Self {
        Self {
            inner,
            decoder: LineDecoder::with_max_line_size(config.max_line_size),
            buf: vec![0u8; config.read_buffer_size],
            eof: false,
        }
    }

    /// Reads the next line, terminator included.
    ///
    /// Returns `Ok(None)` on a clean end of stream, and
    /// [`ClientError::ConnectionClosed`] if the stream ends mid-line.
    ///
    /// An unrecoverable decode error or a read error ends the stream: it is
    /// returned once and every later call returns `Ok(None)`.
    pub async fn read_line(&mut self) -> Result<Option<String>, ClientError> {
        loop {
            match self.decoder.decode_line() {
                Ok(Some(line)) => {
                    tracing::trace!(line = %render_visible(line.as_bytes()), "read line");
                    return Ok(Some(line));
                }
                Ok(None) => {}
                Err(err) => {
                    if !err.is_recoverable() {
                        tracing::debug!(error = %err, "discarding stream after decode error");
                        self.terminate();
                    }
                    return Err(err.into());
                }
            }

            if self.eof {
                return Ok(None);
            }

            let n = match self.inner.read(&mut self.buf).await {
                Ok(n) => n,
                Err(err) => {
                    tracing::debug!(error = %err, "read failed");
                    self.terminate();
                    return Err(err.into());
                }
            };
            if n == 0 {
                self.eof = true;
                if self.decoder.buffered() > 0 {
                    tracing::debug!(
                        buffered = self.decoder.buffered(),
                        "stream closed with partial line"
                    );
                    self.decoder.clear();
                    return Err(ClientError::ConnectionClosed);
                }
                return Ok(None);
            }

            tracing::trace!(bytes = n, "read from stream");
            self.decoder.extend(&self.buf[..n]);
        }
    }

    /// Returns the number of bytes buffered but not yet returned as a line.
    pub fn buffered(&self) -> usize {
        self.decoder.buffered()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R> LineReader<R> {
    fn terminate(&mut self) {
        self.eof = true;
        self.decoder.clear();
    }
}

impl<R: AsyncRead + Unpin> Source for LineReader<R> {
    type Item = Result<String, ClientError>;

    async fn next(&mut self) -> Option<Self::Item> {
        self.read_line().await.transpose()
    }

    fn close(&mut self) {
        self.terminate();
    }
}
