//! Format-argument logging macros.
//!
//! ```rust,ignore
//! weblog_info!(logger, "listening on {}", addr);
//! weblog!(logger, Severity::Notice, "{} workers", n);
//! ```

#[macro_export]
macro_rules! weblog {
    ($logger:expr, $lvl:expr, $($arg:tt)*) => {
        $logger.log($lvl, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! weblog_emerg   { ($logger:expr, $($arg:tt)*) => { $crate::weblog!($logger, $crate::Severity::Emerg, $($arg)*) } }
#[macro_export]
macro_rules! weblog_alert   { ($logger:expr, $($arg:tt)*) => { $crate::weblog!($logger, $crate::Severity::Alert, $($arg)*) } }
#[macro_export]
macro_rules! weblog_crit    { ($logger:expr, $($arg:tt)*) => { $crate::weblog!($logger, $crate::Severity::Crit, $($arg)*) } }
#[macro_export]
macro_rules! weblog_error   { ($logger:expr, $($arg:tt)*) => { $crate::weblog!($logger, $crate::Severity::Error, $($arg)*) } }
#[macro_export]
macro_rules! weblog_warning { ($logger:expr, $($arg:tt)*) => { $crate::weblog!($logger, $crate::Severity::Warning, $($arg)*) } }
#[macro_export]
macro_rules! weblog_notice  { ($logger:expr, $($arg:tt)*) => { $crate::weblog!($logger, $crate::Severity::Notice, $($arg)*) } }
#[macro_export]
macro_rules! weblog_info    { ($logger:expr, $($arg:tt)*) => { $crate::weblog!($logger, $crate::Severity::Info, $($arg)*) } }
#[macro_export]
macro_rules! weblog_debug   { ($logger:expr, $($arg:tt)*) => { $crate::weblog!($logger, $crate::Severity::Debug, $($arg)*) } }
#[macro_export]
macro_rules! weblog_silly   { ($logger:expr, $($arg:tt)*) => { $crate::weblog!($logger, $crate::Severity::Silly, $($arg)*) } }
