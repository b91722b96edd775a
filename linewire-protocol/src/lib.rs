//! # linewire-protocol
//!
//! Wire framing for the linewire client.
//!
//! This crate provides:
//! - A stateless scanner that locates the first CR-LF terminated line in a buffer
//! - An accumulating line decoder for partial socket reads
//! - A line encoder for outgoing commands
//! - A diagnostic renderer that makes control characters visible

pub mod codec;
pub mod error;
pub mod frame;
pub mod visible;

pub use codec::{Encoder, LineDecoder};
pub use error::ProtocolError;
pub use frame::{extract_frame_text, find_frame_boundary, CR, CRLF, LF};
pub use visible::render_visible;

/// Default maximum length of a single control line, terminator included (64 KiB).
pub const DEFAULT_MAX_LINE_SIZE: usize = 64 * 1024;
