//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while decoding or encoding protocol lines.
///
/// A partial line is not an error: the scanner and decoder report it as
/// "not yet" and the caller accumulates more bytes.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("line too long: {size} bytes (max {max})")]
    LineTooLong { size: usize, max: usize },

    #[error("command contains an embedded CR or LF")]
    EmbeddedTerminator,

    #[error("invalid UTF-8 in line")]
    InvalidUtf8,
}

impl ProtocolError {
    /// Returns whether the stream can keep being read after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProtocolError::EmbeddedTerminator)
    }
}
