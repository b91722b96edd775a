//! linewire - line-oriented messaging protocol client core
//!
//! Re-exports the framing layer ([`protocol`]) and the completion primitives
//! and client plumbing built on it ([`client`]).

pub use linewire_client as client;
pub use linewire_protocol as protocol;

#[cfg(test)]
mod end_to_end;

pub use linewire_client::{
    collect, deferred, ClientConfig, ClientError, CompletionError, Deferred, LineReader,
    LineWriter, PendingWrites, RequestTable, Resolver, Source, Timeout, TimeoutHandle,
};
pub use linewire_protocol::{extract_frame_text, find_frame_boundary, render_visible, LineDecoder};
