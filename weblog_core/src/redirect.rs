//! Opt-in redirection of ambient print-style output into the facade.
//!
//! Third-party crates report through `tracing` (and `log`, bridged by
//! `tracing-subscriber`). [`FacadeLayer`] turns those events into facade
//! records so they reach the same sinks. Nothing is redirected unless the
//! host calls [`install_global`] or composes the layer itself.

use crate::logging::diagnostics_layer;
use crate::{Error, LogHandle, Result, Severity};
use once_cell::sync::OnceCell;
use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Severity for a `tracing` level
pub fn severity_for(level: &Level) -> Severity {
    match *level {
        Level::ERROR => Severity::Error,
        Level::WARN => Severity::Warning,
        Level::INFO => Severity::Info,
        Level::DEBUG => Severity::Debug,
        Level::TRACE => Severity::Silly,
    }
}

/// `tracing` layer forwarding events to a logger
pub struct FacadeLayer {
    handle: LogHandle,
}

impl FacadeLayer {
    pub fn new(handle: LogHandle) -> Self {
        Self { handle }
    }
}

impl<S: Subscriber> Layer<S> for FacadeLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Our own diagnostics would loop back through the sinks
        if metadata.target().starts_with(env!("CARGO_CRATE_NAME")) {
            return;
        }

        let level = severity_for(metadata.level());
        if !self.handle.enabled(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.handle.log(level, format_args!("{}", visitor.finish()));
    }
}

/// Collects the `message` field followed by `key=value` pairs
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }

    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }
}

/// Install [`FacadeLayer`] as the process-wide `tracing` subscriber.
///
/// This crate's own warnings (sink failures, operator alerts) skip the
/// facade and go to standard error through
/// [`diagnostics_layer`](crate::logging::diagnostics_layer).
///
/// Succeeds at most once per process; later calls return
/// [`Error::AlreadyInstalled`].
pub fn install_global(handle: LogHandle) -> Result<()> {
    if INSTALLED.set(()).is_err() {
        return Err(Error::AlreadyInstalled);
    }

    tracing_subscriber::registry()
        .with(FacadeLayer::new(handle))
        .with(diagnostics_layer(std::io::stderr))
        .try_init()
        .map_err(|e| Error::Config(format!("global subscriber already set: {}", e)))?;

    tracing::debug!("console output redirected to the log facade");
    Ok(())
}

/// Whether [`install_global`] has run in this process
pub fn is_installed() -> bool {
    INSTALLED.get().is_some()
}

/// Console-shaped adapter over a logger.
///
/// Hosts that funnel their own print calls through one place can hand them
/// to this adapter instead of writing to standard output directly.
#[derive(Clone)]
pub struct ConsolePrint {
    handle: LogHandle,
}

impl ConsolePrint {
    pub fn new(handle: LogHandle) -> Self {
        Self { handle }
    }

    /// Plain print; logged at `info`
    pub fn log(&self, args: fmt::Arguments<'_>) {
        self.handle.log(Severity::Info, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.handle.log(Severity::Info, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.handle.log(Severity::Warning, args);
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.handle.log(Severity::Error, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.handle.log(Severity::Debug, args);
    }
}
