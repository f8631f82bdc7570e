//! Sink failure events.
//!
//! A sink that cannot accept a record never fails the log call. The failure
//! is counted, reported through `tracing`, and passed to an optional hook.

use crate::{Environment, Error, Severity};
use chrono::{DateTime, Utc};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Callback invoked for every sink failure
pub type SinkErrorHook = Arc<dyn Fn(&SinkErrorEvent) + Send + Sync>;

/// A failed delivery of one record to one sink
#[derive(Debug)]
pub struct SinkErrorEvent {
    pub at: DateTime<Utc>,
    /// Level of the record that could not be written
    pub level: Severity,
    pub error: Error,
}

impl SinkErrorEvent {
    /// Name of the failing sink
    pub fn sink(&self) -> &'static str {
        match &self.error {
            Error::SinkWrite { sink, .. } => sink,
            _ => "unknown",
        }
    }
}

/// Shared accounting of sink failures for one logger
pub struct SinkErrors {
    environment: Environment,
    count: AtomicU64,
    hook: RwLock<Option<SinkErrorHook>>,
}

impl SinkErrors {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            count: AtomicU64::new(0),
            hook: RwLock::new(None),
        }
    }

    /// Number of failures seen so far
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Replace the failure hook
    pub fn set_hook(&self, hook: SinkErrorHook) {
        *self.hook.write().unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    /// Record a failed write
    pub fn report(&self, sink: &'static str, level: Severity, source: io::Error) {
        self.count.fetch_add(1, Ordering::Relaxed);

        let event = SinkErrorEvent {
            at: Utc::now(),
            level,
            error: Error::SinkWrite { sink, source },
        };

        if self.environment.is_production() {
            alert_operators(&event);
        } else {
            tracing::warn!(sink, %level, error = %event.error, "log sink write failed");
        }

        let hook = self
            .hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(hook) = hook {
            hook(&event);
        }
    }
}

/// Production alerting entry point. Only captures the event for now.
fn alert_operators(event: &SinkErrorEvent) {
    tracing::error!(
        sink = event.sink(),
        level = %event.level,
        at = %event.at,
        error = %event.error,
        "log sink failure captured for alerting"
    );
}
