#![forbid(unsafe_code)]

//! Process-wide logging facade for a web server.
//!
//! This crate provides:
//! - Syslog severities and per-call records
//! - Console and size-rotated JSON file sinks, with a background writer
//! - A facade with identical methods whether active or degraded
//! - An access-log write stream for HTTP middleware
//! - Opt-in redirection of ambient `tracing`/`log` output

pub mod config;
pub mod error;
pub mod facade;
pub mod global;
pub mod logging;
pub mod macros;
pub mod panic_hook;
pub mod record;
pub mod redirect;
pub mod severity;
pub mod sink;
pub mod sink_error;
pub mod stream;

// Re-export commonly used types
pub use config::{Environment, LogConfig};
pub use error::{Error, Result};
pub use facade::{FacadeState, LogHandle, Logger, LoggerBuilder};
pub use record::LogRecord;
pub use severity::Severity;
pub use sink::{Sink, SinkKind};
pub use sink_error::SinkErrorEvent;
pub use stream::AccessLogStream;
