//! Event Sink Implementations
//!
//! Provides concrete implementations of RunEventSink:
//! - JsonEventSink: NDJSON output for CI/automation
//! - LogEventSink: `log` records for interactive use

mod json;
mod logging;

pub use self::json::JsonEventSink;
pub use self::logging::LogEventSink;
