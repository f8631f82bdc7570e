//! Process-wide logger.
//!
//! The first [`init`] builds the logger; it then lives until the process
//! exits and is never torn down. Code that can take a [`LogHandle`] as a
//! parameter should; this module is for the places that cannot.

use crate::{LogConfig, LogHandle, Logger};
use once_cell::sync::OnceCell;

static GLOBAL: OnceCell<LogHandle> = OnceCell::new();
static FALLBACK: OnceCell<LogHandle> = OnceCell::new();

/// Initialize the process-wide logger from `config`.
///
/// Only the first call builds a logger; later calls return the same handle
/// and ignore their configuration.
pub fn init(config: &LogConfig) -> LogHandle {
    GLOBAL
        .get_or_init(|| LogHandle::initialize(config))
        .clone()
}

/// The process-wide logger, or a degraded pass-through logger if [`init`]
/// has not run
pub fn handle() -> LogHandle {
    match GLOBAL.get() {
        Some(handle) => handle.clone(),
        None => FALLBACK
            .get_or_init(|| LogHandle::new(Logger::degraded()))
            .clone(),
    }
}

pub fn is_initialized() -> bool {
    GLOBAL.get().is_some()
}

/// Flush the process-wide logger's background sinks.
///
/// The global logger is never dropped, so hosts call this before exiting.
pub fn flush() {
    if let Some(handle) = GLOBAL.get() {
        handle.flush();
    }
}
