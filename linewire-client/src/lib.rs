//! # linewire-client
//!
//! Client runtime core for linewire.
//!
//! This crate provides:
//! - Single-assignment deferred results and cancel-able timeouts
//! - An in-flight write tracker for backpressure
//! - Request/response correlation by id
//! - A collector that drains pull-based asynchronous sequences
//! - Line reader and writer over tokio I/O
//! - Small utilities: shallow object merge, shuffling, interval timing

pub mod collect;
pub mod config;
pub mod deferred;
pub mod error;
pub mod pending;
pub mod reader;
pub mod requests;
pub mod timeout;
pub mod timer;
pub mod util;
pub mod writer;

pub use collect::{collect, Source, StreamSource};
pub use config::{ClientConfig, ConfigError};
pub use deferred::{deferred, Deferred, Resolver};
pub use error::{ClientError, CompletionError, TimerError};
pub use pending::{PendingWrites, TrackerState};
pub use reader::LineReader;
pub use requests::{RequestId, RequestTable};
pub use timeout::{with_timeout, Timeout, TimeoutHandle};
pub use timer::{IntervalTimer, Measurement};
pub use util::{permute, permute_with, shallow_merge};
pub use writer::LineWriter;
