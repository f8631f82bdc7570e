//! The logging facade.
//!
//! A [`Logger`] is built once from a [`LogConfig`] and is either
//! [`Active`](FacadeState::Active), with a console sink and a background
//! rotating error file, or [`Degraded`](FacadeState::Degraded), with a
//! console-only fallback. Both states expose the same methods, so callers
//! never check which one they hold.

use crate::config::ERROR_LOG_FILE;
use crate::redirect::{self, ConsolePrint};
use crate::sink::{BackgroundSink, ConsoleOptions, ConsoleSink, RotatingFileSink, Sink};
use crate::sink_error::{SinkErrorEvent, SinkErrors};
use crate::stream::AccessLogStream;
use crate::{Environment, LogConfig, LogRecord, Result, Severity};
use std::fmt;
use std::io;
use std::ops::Deref;
use std::sync::Arc;

/// Operational state, fixed at construction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacadeState {
    /// Fully configured, all sinks live
    Active,
    /// Disabled or misconfigured; console fallback only
    Degraded,
}

/// Leveled, multi-sink logger
pub struct Logger {
    state: FacadeState,
    sinks: Vec<Box<dyn Sink>>,
    errors: Arc<SinkErrors>,
}

macro_rules! severity_methods {
    ($($(#[$doc:meta])* $name:ident => $level:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&self, message: impl fmt::Display) {
                self.log(Severity::$level, format_args!("{}", message));
            }
        )*
    };
}

impl Logger {
    /// Build a logger from configuration. Never fails.
    ///
    /// A disabled configuration yields a degraded logger printing plain lines
    /// to standard output. A configuration that cannot be honored (invalid
    /// level, unusable log directory) yields a degraded logger with only the
    /// console sink, and says so on the console.
    pub fn initialize(config: &LogConfig) -> Self {
        if config.is_disabled() {
            tracing::debug!("logging disabled, using pass-through console");
            return Self::builder(config.environment.clone())
                .degraded()
                .sink(ConsoleSink::passthrough())
                .build();
        }

        match Self::configure(config) {
            Ok(logger) => logger,
            Err(e) => {
                tracing::warn!("logging misconfigured, falling back to console: {}", e);
                let level = config
                    .console_level()
                    .unwrap_or_else(|_| config.environment.default_console_level());
                let logger = Self::builder(config.environment.clone())
                    .degraded()
                    .sink(ConsoleSink::new(level, console_options(config)))
                    .build();
                logger.warning(format_args!("file logging unavailable, console only: {}", e));
                logger
            }
        }
    }

    fn configure(config: &LogConfig) -> Result<Self> {
        config.validate()?;

        let console = ConsoleSink::new(config.console_level()?, console_options(config));
        let mut builder = Self::builder(config.environment.clone()).sink(console);

        if config.file_enabled {
            let file = RotatingFileSink::open(
                &config.log_dir,
                ERROR_LOG_FILE,
                Severity::Error,
                config.file_max_bytes,
                config.file_max_rotations,
            )
            .map_err(|e| {
                crate::Error::Config(format!("cannot open {:?}: {}", config.error_log_path(), e))
            })?;
            builder = builder.background_sink(file, config.queue_capacity)?;
        }

        Ok(builder.build())
    }

    /// Degraded logger that prints every level to standard output
    pub fn degraded() -> Self {
        Self::builder(Environment::default())
            .degraded()
            .sink(ConsoleSink::passthrough())
            .build()
    }

    /// Start assembling a logger from explicit sinks
    pub fn builder(environment: Environment) -> LoggerBuilder {
        LoggerBuilder {
            state: FacadeState::Active,
            sinks: Vec::new(),
            errors: Arc::new(SinkErrors::new(environment)),
        }
    }

    pub fn state(&self) -> FacadeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == FacadeState::Active
    }

    /// Whether any sink would receive a record at `level`
    pub fn enabled(&self, level: Severity) -> bool {
        self.sinks.iter().any(|sink| sink.accepts(level))
    }

    /// Format and dispatch one record
    pub fn log(&self, level: Severity, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let message = match args.as_str() {
            Some(text) => text.to_owned(),
            None => args.to_string(),
        };
        self.emit(&LogRecord::new(level, message));
    }

    /// Log at a level given by name
    pub fn log_named(&self, level: &str, message: impl fmt::Display) -> Result<()> {
        let level: Severity = level.parse()?;
        self.log(level, format_args!("{}", message));
        Ok(())
    }

    /// Deliver a prepared record to every sink that accepts its level.
    ///
    /// Sink failures are reported as sink error events, never returned.
    pub fn emit(&self, record: &LogRecord) {
        for sink in self.sinks.iter().filter(|s| s.accepts(record.level)) {
            if let Err(e) = sink.write(record) {
                self.errors.report(sink.name(), record.level, e);
            }
        }
    }

    severity_methods! {
        /// System is unusable
        emerg => Emerg;
        alert => Alert;
        crit => Crit;
        error => Error;
        warning => Warning;
        notice => Notice;
        info => Info;
        debug => Debug;
        /// Below debug
        silly => Silly;
    }

    /// Wait for background sinks to write what they have queued
    pub fn flush(&self) {
        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                self.errors.report(sink.name(), Severity::Error, e);
            }
        }
    }

    /// Records discarded under backpressure, across all sinks
    pub fn dropped(&self) -> u64 {
        self.sinks.iter().map(|sink| sink.dropped()).sum()
    }

    /// Sink write failures so far
    pub fn sink_errors(&self) -> u64 {
        self.errors.count()
    }

    /// Register a callback for sink write failures
    pub fn on_sink_error<F>(&self, hook: F)
    where
        F: Fn(&SinkErrorEvent) + Send + Sync + 'static,
    {
        self.errors.set_hook(Arc::new(hook));
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }
}

fn console_options(config: &LogConfig) -> ConsoleOptions {
    ConsoleOptions {
        colorize: config.colorize,
        ..ConsoleOptions::default()
    }
}

/// Assembles a [`Logger`] from explicit sinks
pub struct LoggerBuilder {
    state: FacadeState,
    sinks: Vec<Box<dyn Sink>>,
    errors: Arc<SinkErrors>,
}

impl LoggerBuilder {
    /// Mark the logger as degraded
    pub fn degraded(mut self) -> Self {
        self.state = FacadeState::Degraded;
        self
    }

    /// Add a sink written inline by the caller's thread
    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Add a sink written by a dedicated background thread
    pub fn background_sink(
        mut self,
        sink: impl Sink + 'static,
        capacity: usize,
    ) -> io::Result<Self> {
        let background = BackgroundSink::spawn(sink, capacity, self.errors.clone())?;
        self.sinks.push(Box::new(background));
        Ok(self)
    }

    pub fn build(self) -> Logger {
        Logger {
            state: self.state,
            sinks: self.sinks,
            errors: self.errors,
        }
    }
}

/// Cheap, cloneable handle to a shared [`Logger`].
///
/// This is what request handlers and middleware hold. Tests build a fresh
/// handle per case instead of going through the process-wide one.
#[derive(Clone)]
pub struct LogHandle(Arc<Logger>);

impl LogHandle {
    pub fn new(logger: Logger) -> Self {
        Self(Arc::new(logger))
    }

    /// Build the logger and, when configured, install console redirection
    pub fn initialize(config: &LogConfig) -> Self {
        let handle = Self::new(Logger::initialize(config));
        if config.override_global_console {
            if let Err(e) = redirect::install_global(handle.clone()) {
                tracing::warn!("console redirection not installed: {}", e);
            }
        }
        handle
    }

    /// Whether both handles share one logger
    pub fn ptr_eq(&self, other: &LogHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Line-oriented writer for HTTP access-log middleware
    pub fn as_write_stream(&self) -> AccessLogStream {
        AccessLogStream::new(self.clone())
    }

    /// Console-shaped print adapter
    pub fn console_print(&self) -> ConsolePrint {
        ConsolePrint::new(self.clone())
    }
}

impl From<Logger> for LogHandle {
    fn from(logger: Logger) -> Self {
        Self::new(logger)
    }
}

impl Deref for LogHandle {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        &self.0
    }
}
