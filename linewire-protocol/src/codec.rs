//! Line encoder and accumulating line decoder.

use crate::error::ProtocolError;
use crate::frame::{find_frame_boundary, CR, CRLF, LF};
use crate::DEFAULT_MAX_LINE_SIZE;
use bytes::{BufMut, BytesMut};

/// Encodes commands into terminated lines.
pub struct Encoder;

impl Encoder {
    /// Encodes a command into a CR-LF terminated line.
    pub fn encode_line(command: &str) -> Result<BytesMut, ProtocolError> {
        Self::encode_line_with_limit(command, DEFAULT_MAX_LINE_SIZE)
    }

    /// Encodes a command, rejecting lines longer than `max` bytes.
    pub fn encode_line_with_limit(command: &str, max: usize) -> Result<BytesMut, ProtocolError> {
        if command.bytes().any(|b| b == CR || b == LF) {
            return Err(ProtocolError::EmbeddedTerminator);
        }

        let size = command.len() + CRLF.len();
        if size > max {
            return Err(ProtocolError::LineTooLong { size, max });
        }

        let mut buf = BytesMut::with_capacity(size);
        buf.put_slice(command.as_bytes());
        buf.put_slice(CRLF);
        Ok(buf)
    }
}

/// Accumulates socket reads and yields complete lines.
///
/// Each call to [`LineDecoder::decode_line`] rescans the unconsumed remainder,
/// so several lines delivered by one read come out one at a time.
pub struct LineDecoder {
    buffer: BytesMut,
    max_line_size: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::with_max_line_size(DEFAULT_MAX_LINE_SIZE)
    }

    pub fn with_max_line_size(max_line_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
            max_line_size,
        }
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Attempts to take the next complete line, terminator included.
    ///
    /// Returns `Ok(None)` if more data is needed.
    pub fn decode_line(&mut self) -> Result<Option<String>, ProtocolError> {
        let boundary = find_frame_boundary(&self.buffer);
        if boundary == 0 {
            if self.buffer.len() > self.max_line_size {
                return Err(ProtocolError::LineTooLong {
                    size: self.buffer.len(),
                    max: self.max_line_size,
                });
            }
            return Ok(None);
        }

        if boundary > self.max_line_size {
            return Err(ProtocolError::LineTooLong {
                size: boundary,
                max: self.max_line_size,
            });
        }

        let line = self.buffer.split_to(boundary);
        let text = std::str::from_utf8(&line).map_err(|_| ProtocolError::InvalidUtf8)?;
        Ok(Some(text.to_owned()))
    }

    /// Returns the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the configured line limit.
    pub fn max_line_size(&self) -> usize {
        self.max_line_size
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}
