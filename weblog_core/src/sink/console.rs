//! Human-readable console output.
//!
//! Lines look like `[14:02:11.532] ERROR: message`. `error` and more urgent
//! levels go to standard error, the rest to standard output.

use super::{Sink, SinkKind};
use crate::{LogRecord, Severity};
use chrono::Local;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";

fn level_color(level: Severity) -> &'static str {
    match level {
        Severity::Emerg | Severity::Crit | Severity::Error | Severity::Warning => RED,
        Severity::Alert | Severity::Notice => YELLOW,
        Severity::Info => GREEN,
        Severity::Debug => BLUE,
        Severity::Silly => MAGENTA,
    }
}

/// Formatting switches for a console sink
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsoleOptions {
    pub timestamp: bool,
    pub colorize: bool,
    /// Send urgent levels to standard error
    pub split_streams: bool,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            timestamp: true,
            colorize: true,
            split_streams: true,
        }
    }
}

impl ConsoleOptions {
    /// Plain `LEVEL: message` lines, everything on standard output
    pub fn plain() -> Self {
        Self {
            timestamp: false,
            colorize: false,
            split_streams: false,
        }
    }
}

type Stream = Mutex<Box<dyn Write + Send>>;

/// Console sink writing to standard output and standard error
pub struct ConsoleSink {
    min_level: Severity,
    options: ConsoleOptions,
    out: Stream,
    err: Stream,
}

impl ConsoleSink {
    pub fn new(min_level: Severity, options: ConsoleOptions) -> Self {
        Self::with_writers(
            min_level,
            options,
            Box::new(io::stdout()),
            Box::new(io::stderr()),
        )
    }

    /// Sink used by the degraded logger: accepts every level, plain lines on
    /// standard output
    pub fn passthrough() -> Self {
        Self::new(Severity::Silly, ConsoleOptions::plain())
    }

    /// Console sink over arbitrary writers
    pub fn with_writers(
        min_level: Severity,
        options: ConsoleOptions,
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            min_level,
            options,
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    /// Render one record, including the trailing newline
    pub fn format_line(&self, record: &LogRecord) -> String {
        let mut line = String::with_capacity(record.message.len() + 32);

        if self.options.timestamp {
            let local = record.timestamp.with_timezone(&Local);
            line.push('[');
            line.push_str(&local.format("%H:%M:%S%.3f").to_string());
            line.push_str("] ");
        }

        if self.options.colorize {
            line.push_str(level_color(record.level));
            line.push_str(record.level.label());
            line.push_str(RESET);
        } else {
            line.push_str(record.level.label());
        }

        line.push_str(": ");
        line.push_str(&record.message);
        line.push('\n');
        line
    }

    fn stream_for(&self, level: Severity) -> &Stream {
        if self.options.split_streams && level.is_urgent() {
            &self.err
        } else {
            &self.out
        }
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }

    fn min_level(&self) -> Severity {
        self.min_level
    }

    fn write(&self, record: &LogRecord) -> io::Result<()> {
        let line = self.format_line(record);
        let mut stream = self
            .stream_for(record.level)
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        stream.write_all(line.as_bytes())?;
        if record.level.is_urgent() {
            stream.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        self.out
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()?;
        self.err
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(min_level: Severity, options: ConsoleOptions) -> (ConsoleSink, Buffer, Buffer) {
        let out = Buffer::default();
        let err = Buffer::default();
        let sink = ConsoleSink::with_writers(
            min_level,
            options,
            Box::new(out.clone()),
            Box::new(err.clone()),
        );
        (sink, out, err)
    }

    #[test]
    fn test_line_format_with_timestamp() {
        let (sink, _, _) = capture(
            Severity::Debug,
            ConsoleOptions {
                colorize: false,
                ..ConsoleOptions::default()
            },
        );
        let line = sink.format_line(&LogRecord::new(Severity::Notice, "listening on :8080"));

        assert!(line.starts_with('['));
        let (stamp, rest) = line.split_once("] ").unwrap();
        assert_eq!(stamp.len(), "[12:00:00.000".len());
        assert_eq!(rest, "NOTICE: listening on :8080\n");
    }

    #[test]
    fn test_colorized_label() {
        let (sink, _, _) = capture(Severity::Debug, ConsoleOptions::default());
        let line = sink.format_line(&LogRecord::new(Severity::Info, "ok"));
        assert!(line.contains("\x1b[32mINFO\x1b[0m: ok"));
    }

    #[test]
    fn test_urgent_levels_go_to_stderr() {
        let (sink, out, err) = capture(
            Severity::Silly,
            ConsoleOptions {
                split_streams: true,
                ..ConsoleOptions::plain()
            },
        );

        for level in Severity::ALL {
            sink.write(&LogRecord::new(level, "m")).unwrap();
        }

        assert_eq!(err.text(), "EMERG: m\nALERT: m\nCRIT: m\nERROR: m\n");
        assert_eq!(
            out.text(),
            "WARNING: m\nNOTICE: m\nINFO: m\nDEBUG: m\nSILLY: m\n"
        );
    }

    #[test]
    fn test_plain_sends_everything_to_stdout() {
        let (sink, out, err) = capture(Severity::Silly, ConsoleOptions::plain());
        sink.write(&LogRecord::new(Severity::Emerg, "down")).unwrap();
        assert_eq!(out.text(), "EMERG: down\n");
        assert!(err.text().is_empty());
    }

    #[test]
    fn test_threshold() {
        let (sink, _, _) = capture(Severity::Info, ConsoleOptions::default());
        assert!(sink.accepts(Severity::Info));
        assert!(sink.accepts(Severity::Emerg));
        assert!(!sink.accepts(Severity::Debug));
        assert!(!sink.accepts(Severity::Silly));
    }
}
