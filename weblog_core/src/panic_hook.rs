//! Route panics to the facade at `crit`.

use crate::sink::background::WORKER_THREAD_PREFIX;
use crate::LogHandle;
use std::panic;
use std::thread;

/// Log panic messages through `handle` before running the previously
/// installed hook.
///
/// Sinks are flushed afterwards, except on the logger's own worker threads,
/// where a flush would wait on the panicking thread itself. A panic raised
/// while a sink holds its own lock (a custom console writer that panics,
/// for example) cannot be logged through that sink.
pub fn install(handle: LogHandle) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        handle.crit(format_args!("panic: {}", info));
        if !on_worker_thread() {
            handle.flush();
        }
        previous(info);
    }));
}

fn on_worker_thread() -> bool {
    thread::current()
        .name()
        .map_or(false, |name| name.starts_with(WORKER_THREAD_PREFIX))
}
