//! The per-call log record.

use crate::{Result, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single log event, created per call and handed to every matching sink.
///
/// Serialized as one JSON object per line with the fields in
/// `timestamp, level, message` order; the timestamp is RFC 3339.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub message: String,
}

impl LogRecord {
    /// Create a record stamped with the current time
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }

    /// Serialize as a single JSON line, without the terminator
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a line written by [`to_json_line`](Self::to_json_line)
    pub fn from_json_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim_end())?)
    }
}
