//! Concurrency tests for the facade.
//!
//! These tests verify that many request handlers logging at once produce
//! complete, non-interleaved lines in every sink.

use std::fs;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use weblog_core::sink::{ConsoleOptions, ConsoleSink};
use weblog_core::{Environment, LogConfig, LogHandle, LogRecord, Logger, Severity};

const THREADS: usize = 8;
const PER_THREAD: usize = 100;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Split every write in two to expose unserialized writers
        let mid = buf.len() / 2;
        let mut inner = self.0.lock().unwrap();
        inner.extend_from_slice(&buf[..mid]);
        drop(inner);
        thread::yield_now();
        self.0.lock().unwrap().extend_from_slice(&buf[mid..]);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn hammer(handle: &LogHandle, level: Severity) {
    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let handle = handle.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    handle.log(level, format_args!("worker {} request {} {}", t, i, "x".repeat(40)));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker panicked");
    }
}

#[test]
fn test_concurrent_file_writes_are_whole_lines() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = LogConfig {
        log_dir: temp_dir.path().to_path_buf(),
        file_max_bytes: 10 * 1024 * 1024,
        queue_capacity: THREADS * PER_THREAD,
        min_console_level: Some(Severity::Emerg),
        ..LogConfig::default()
    };
    let handle = LogHandle::initialize(&config);

    hammer(&handle, Severity::Error);
    handle.flush();

    let content = fs::read_to_string(config.error_log_path()).unwrap();
    let records: Vec<LogRecord> = content
        .lines()
        .map(|line| LogRecord::from_json_line(line).expect("corrupted line"))
        .collect();
    assert_eq!(records.len() as u64 + handle.dropped(), (THREADS * PER_THREAD) as u64);
    assert_eq!(handle.dropped(), 0);

    // Per-thread order is preserved
    for t in 0..THREADS {
        let prefix = format!("worker {} request ", t);
        let seq: Vec<usize> = records
            .iter()
            .filter_map(|r| r.message.strip_prefix(&prefix))
            .map(|rest| rest.split(' ').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(seq, (0..PER_THREAD).collect::<Vec<_>>());
    }
}

#[test]
fn test_concurrent_console_writes_are_whole_lines() {
    let out = SharedBuffer::default();
    let err = SharedBuffer::default();
    let console = ConsoleSink::with_writers(
        Severity::Debug,
        ConsoleOptions {
            colorize: false,
            ..ConsoleOptions::default()
        },
        Box::new(out.clone()),
        Box::new(err.clone()),
    );
    let handle = LogHandle::new(Logger::builder(Environment::Development).sink(console).build());

    hammer(&handle, Severity::Info);

    let text = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), THREADS * PER_THREAD);
    for line in lines {
        let (_, rest) = line.split_once("] ").expect("missing timestamp");
        assert!(rest.starts_with("INFO: worker "), "interleaved line: {}", line);
        assert!(rest.ends_with(&"x".repeat(40)), "interleaved line: {}", line);
    }
    assert!(err.0.lock().unwrap().is_empty());
}
