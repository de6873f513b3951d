#![forbid(unsafe_code)]

//! Harness: recording host, deterministic frame loop, tick traces, and
//! reference components.

pub mod fixtures;
pub mod harness;
pub mod host;
pub mod trace;

pub use harness::Harness;
pub use host::RecordingHost;
pub use trace::{TickTrace, TraceEntry};
