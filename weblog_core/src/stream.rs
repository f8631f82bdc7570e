//! Write-stream adapter for HTTP access-log middleware.
//!
//! Access-log middleware produces one line per request and usually appends a
//! line terminator. Each line becomes one `info` record with the terminator
//! removed.

use crate::LogHandle;
use std::io;

/// Strip one trailing `\n`, `\r\n` or `\r`
pub fn trim_line_terminator(message: &str) -> &str {
    let message = message.strip_suffix('\n').unwrap_or(message);
    message.strip_suffix('\r').unwrap_or(message)
}

/// Line-oriented writer that logs at `info`
pub struct AccessLogStream {
    handle: LogHandle,
    pending: Vec<u8>,
}

impl AccessLogStream {
    pub(crate) fn new(handle: LogHandle) -> Self {
        Self {
            handle,
            pending: Vec::new(),
        }
    }

    /// Log one access line. Never fails.
    pub fn write(&self, message: &str) {
        self.handle.info(trim_line_terminator(message));
    }

    fn write_line(&self, bytes: &[u8]) {
        self.write(&String::from_utf8_lossy(bytes));
    }
}

impl io::Write for AccessLogStream {
    /// Buffer bytes and log every completed line
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.write_line(&line);
        }
        Ok(buf.len())
    }

    /// Log any unterminated remainder as its own line
    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.write_line(&line);
        }
        Ok(())
    }
}

impl Drop for AccessLogStream {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::{Environment, Logger, Severity};
    use std::io::Write;

    fn handle() -> (LogHandle, MemorySink) {
        let memory = MemorySink::new(Severity::Silly);
        let logger = Logger::builder(Environment::Production)
            .sink(memory.clone())
            .build();
        (LogHandle::new(logger), memory)
    }

    #[test]
    fn test_trim_line_terminator() {
        assert_eq!(trim_line_terminator("a\n"), "a");
        assert_eq!(trim_line_terminator("a\r\n"), "a");
        assert_eq!(trim_line_terminator("a\r"), "a");
        assert_eq!(trim_line_terminator("a\n\n"), "a\n");
        assert_eq!(trim_line_terminator("a"), "a");
        assert_eq!(trim_line_terminator(""), "");
    }

    #[test]
    fn test_write_logs_one_info_record() {
        let (handle, memory) = handle();
        let stream = handle.as_write_stream();

        stream.write("127.0.0.1 - GET / 200\n");

        let records = memory.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Severity::Info);
        assert_eq!(records[0].message, "127.0.0.1 - GET / 200");
    }

    #[test]
    fn test_io_write_splits_lines() {
        let (handle, memory) = handle();
        let mut stream = handle.as_write_stream();

        stream.write_all(b"GET /a 200\r\nGET /b").unwrap();
        assert_eq!(memory.messages(), vec!["GET /a 200"]);

        stream.write_all(b" 404\n").unwrap();
        writeln!(stream, "GET /{} {}", "c", 500).unwrap();
        assert_eq!(memory.messages(), vec!["GET /a 200", "GET /b 404", "GET /c 500"]);
    }

    #[test]
    fn test_partial_line_flushed_on_drop() {
        let (handle, memory) = handle();
        {
            let mut stream = handle.as_write_stream();
            stream.write_all(b"no terminator").unwrap();
            assert!(memory.records().is_empty());
        }
        assert_eq!(memory.messages(), vec!["no terminator"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let (handle, memory) = handle();
        let mut stream = handle.as_write_stream();
        stream.write_all(b"bad \xff byte\n").unwrap();
        assert_eq!(memory.messages(), vec!["bad \u{fffd} byte"]);
    }

    #[test]
    fn test_blank_access_line_still_logged_once() {
        let (handle, memory) = handle();
        let stream = handle.as_write_stream();

        stream.write("\n");

        let records = memory.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Severity::Info);
        assert_eq!(records[0].message, "");
    }

    #[test]
    fn test_flush_with_nothing_pending_logs_nothing() {
        let (handle, memory) = handle();
        let mut stream = handle.as_write_stream();

        stream.flush().unwrap();
        stream.write_all(b"GET / 200\n").unwrap();
        stream.flush().unwrap();
        drop(stream);

        assert_eq!(memory.messages(), vec!["GET / 200"]);
    }
}
