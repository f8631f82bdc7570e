//! Syslog-style severity levels.
//!
//! Levels are ordered by urgency: `Emerg` is the most urgent and compares
//! greatest, `Silly` the least. A sink with minimum level `L` accepts every
//! record whose level is `>= L`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Verbose tracing, below debug
    Silly,
    Debug,
    Info,
    /// Normal but significant condition
    Notice,
    Warning,
    Error,
    /// Critical condition
    Crit,
    /// Action must be taken immediately
    Alert,
    /// System is unusable
    Emerg,
}

impl Severity {
    /// Every level, most urgent first.
    pub const ALL: [Severity; 9] = [
        Severity::Emerg,
        Severity::Alert,
        Severity::Crit,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
        Severity::Silly,
    ];

    /// Lowercase name, as used in configuration and in file records
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Silly => "silly",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Notice => "notice",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Crit => "crit",
            Severity::Alert => "alert",
            Severity::Emerg => "emerg",
        }
    }

    /// Uppercase label for console lines
    pub fn label(self) -> &'static str {
        match self {
            Severity::Silly => "SILLY",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Crit => "CRIT",
            Severity::Alert => "ALERT",
            Severity::Emerg => "EMERG",
        }
    }

    /// `error` and anything more urgent.
    ///
    /// Urgent records go to standard error on the console and are never
    /// dropped in favour of less urgent ones.
    pub fn is_urgent(self) -> bool {
        self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        Severity::ALL
            .into_iter()
            .find(|level| level.as_str() == name)
            .ok_or_else(|| Error::InvalidLevel(s.to_string()))
    }
}
