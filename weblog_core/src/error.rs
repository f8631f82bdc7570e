//! Error types for the weblog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for weblog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A severity name that is not part of the syslog level set
    #[error("Invalid log level: {0:?}")]
    InvalidLevel(String),

    /// A sink could not accept a record.
    ///
    /// Never returned from a log call; carried by sink error events.
    #[error("Sink '{sink}' failed to write: {source}")]
    SinkWrite {
        sink: &'static str,
        #[source]
        source: io::Error,
    },

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Global console redirection was requested twice
    #[error("Global console redirection is already installed")]
    AlreadyInstalled,
}
