//! In-memory sink for tests and embedding hosts.

use super::{Sink, SinkKind};
use crate::{LogRecord, Severity};
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

/// Collects records in memory. Clones share the same buffer.
#[derive(Clone)]
pub struct MemorySink {
    min_level: Severity,
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new(min_level: Severity) -> Self {
        Self {
            min_level,
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of everything received so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Other
    }

    fn min_level(&self) -> Severity {
        self.min_level
    }

    fn write(&self, record: &LogRecord) -> io::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}
