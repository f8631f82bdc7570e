//! Bounded, non-blocking handoff to a dedicated writer thread.
//!
//! # Architecture
//!
//! 1. **Producers**: log calls push records into a bounded FIFO and return.
//! 2. **Consumer**: a named worker thread drains the queue in batches and
//!    writes them to the wrapped sink, in push order.
//! 3. **Backpressure**: when the queue is full, records below `error` are
//!    dropped. An urgent record instead evicts the oldest queued non-urgent
//!    record; if only urgent records are queued it may use a small overflow
//!    allowance before it too is dropped. Every drop is counted.

use super::{Sink, SinkKind};
use crate::sink_error::SinkErrors;
use crate::{LogRecord, Severity};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Longest a `flush` waits for the worker before giving up
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Name prefix of every worker thread
pub(crate) const WORKER_THREAD_PREFIX: &str = "weblog-";

struct QueueState {
    records: VecDeque<LogRecord>,
    /// Worker holds a batch that is not yet written
    in_flight: bool,
    closed: bool,
}

struct Shared {
    queue: Mutex<QueueState>,
    available: Condvar,
    drained: Condvar,
    capacity: usize,
    overflow: usize,
    dropped: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn drop_one(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    fn push(&self, record: LogRecord) {
        let mut q = self.lock();
        if q.closed {
            self.drop_one();
            return;
        }

        if q.records.len() >= self.capacity {
            if !record.level.is_urgent() {
                self.drop_one();
                return;
            }
            let evict = q.records.iter().position(|r| !r.level.is_urgent());
            match evict {
                Some(pos) => {
                    q.records.remove(pos);
                    self.drop_one();
                }
                None if q.records.len() >= self.capacity + self.overflow => {
                    self.drop_one();
                    return;
                }
                None => {}
            }
        }

        q.records.push_back(record);
        drop(q);
        self.available.notify_one();
    }
}

/// Wraps a sink so writes happen on a background thread
pub struct BackgroundSink {
    name: &'static str,
    kind: SinkKind,
    min_level: Severity,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundSink {
    /// Spawn the worker thread for `sink`.
    ///
    /// `capacity` bounds the queue; write failures on the worker are
    /// reported to `errors`.
    pub fn spawn<S>(sink: S, capacity: usize, errors: Arc<SinkErrors>) -> io::Result<Self>
    where
        S: Sink + 'static,
    {
        let capacity = capacity.max(1);
        let shared = Arc::new(Shared {
            queue: Mutex::new(QueueState {
                records: VecDeque::with_capacity(capacity),
                in_flight: false,
                closed: false,
            }),
            available: Condvar::new(),
            drained: Condvar::new(),
            capacity,
            overflow: (capacity / 4).max(1),
            dropped: AtomicU64::new(0),
        });

        let name = sink.name();
        let kind = sink.kind();
        let min_level = sink.min_level();

        let worker_shared = shared.clone();
        let worker = thread::Builder::new()
            .name(format!("{}{}", WORKER_THREAD_PREFIX, name))
            .spawn(move || run_worker(sink, &worker_shared, &errors))?;

        Ok(Self {
            name,
            kind,
            min_level,
            shared,
            worker: Some(worker),
        })
    }

    /// Records currently waiting for the worker
    pub fn queued(&self) -> usize {
        self.shared.lock().records.len()
    }
}

fn run_worker<S: Sink>(sink: S, shared: &Shared, errors: &SinkErrors) {
    loop {
        let batch: VecDeque<LogRecord> = {
            let mut q = shared.lock();
            while q.records.is_empty() && !q.closed {
                q = shared
                    .available
                    .wait(q)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            if q.records.is_empty() {
                break;
            }
            q.in_flight = true;
            std::mem::take(&mut q.records)
        };

        for record in &batch {
            if let Err(e) = sink.write(record) {
                errors.report(sink.name(), record.level, e);
            }
        }
        if let Err(e) = sink.flush() {
            let level = batch.back().map_or(Severity::Error, |r| r.level);
            errors.report(sink.name(), level, e);
        }

        shared.lock().in_flight = false;
        shared.drained.notify_all();
    }

    shared.drained.notify_all();
}

impl Sink for BackgroundSink {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> SinkKind {
        self.kind
    }

    fn min_level(&self) -> Severity {
        self.min_level
    }

    fn write(&self, record: &LogRecord) -> io::Result<()> {
        self.shared.push(record.clone());
        Ok(())
    }

    /// Wait until everything queued so far has been written
    fn flush(&self) -> io::Result<()> {
        let deadline = Instant::now() + FLUSH_TIMEOUT;
        let mut q = self.shared.lock();
        while (!q.records.is_empty() || q.in_flight) && !q.closed {
            let now = Instant::now();
            if now >= deadline {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("{} sink did not drain in time", self.name),
                ));
            }
            q = self
                .shared
                .drained
                .wait_timeout(q, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        Ok(())
    }

    fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for BackgroundSink {
    fn drop(&mut self) {
        self.shared.lock().closed = true;
        self.shared.available.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
