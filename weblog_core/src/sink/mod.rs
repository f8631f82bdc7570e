//! Log sinks.
//!
//! A sink is one destination for records with its own minimum level. Sinks
//! are independent: the facade hands each record to every sink that accepts
//! its level.

pub mod background;
pub mod console;
pub mod file;
pub mod memory;

pub use background::BackgroundSink;
pub use console::{ConsoleOptions, ConsoleSink};
pub use file::RotatingFileSink;
pub use memory::MemorySink;

use crate::{LogRecord, Severity};
use std::io;

/// Kind of destination behind a sink
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkKind {
    Console,
    File,
    Other,
}

/// Destination for log records.
///
/// Implementations serialize their own writes so a record is always written
/// as one complete line.
pub trait Sink: Send + Sync {
    /// Short name used in sink error events
    fn name(&self) -> &'static str;

    fn kind(&self) -> SinkKind;

    /// Least urgent level this sink accepts
    fn min_level(&self) -> Severity;

    fn accepts(&self, level: Severity) -> bool {
        level >= self.min_level()
    }

    fn write(&self, record: &LogRecord) -> io::Result<()>;

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    /// Records discarded under backpressure
    fn dropped(&self) -> u64 {
        0
    }
}
