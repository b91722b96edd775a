//! Control line framing.
//!
//! Every protocol command is a single line terminated by CR-LF:
//!
//! ```text
//! +----------------------------+----+----+
//! | command text               | CR | LF |
//! +----------------------------+----+----+
//! ```
//!
//! The scanner is stateless. The transport hands it the unconsumed tail of
//! the socket stream; it reports how many bytes form the first complete line
//! or `0` when no terminator is present yet.

use std::borrow::Cow;

/// Carriage return.
pub const CR: u8 = b'\r';

/// Line feed.
pub const LF: u8 = b'\n';

/// Line terminator.
pub const CRLF: &[u8; 2] = b"\r\n";

/// Returns the length of the first complete line in `buf`, terminator included.
///
/// Returns `0` when `buf` holds no CR-LF pair. A trailing lone CR is a
/// terminator split across two reads and is treated as incomplete.
pub fn find_frame_boundary(buf: &[u8]) -> usize {
    buf.windows(CRLF.len())
        .position(|pair| pair == CRLF)
        .map_or(0, |start| start + CRLF.len())
}

/// Returns the text of the first complete line in `buf`, terminator included.
///
/// Returns an empty string when no complete line is present. The empty string
/// is the "nothing yet" sentinel and never a valid zero-length command. Bytes
/// after the first terminator are not inspected.
pub fn extract_frame_text(buf: &[u8]) -> Cow<'_, str> {
    match find_frame_boundary(buf) {
        0 => Cow::Borrowed(""),
        end => String::from_utf8_lossy(&buf[..end]),
    }
}
