// Driver event log. Messages are static strings so logging is safe from
// interrupt context.

use core::sync::atomic::{AtomicUsize, Ordering};

const MAX_LOG_ENTRIES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

static mut LOG_BUFFER: [Option<(Level, &'static str)>; MAX_LOG_ENTRIES] = [None; MAX_LOG_ENTRIES];
static LOG_COUNT: AtomicUsize = AtomicUsize::new(0);

pub fn log(level: Level, message: &'static str) {
    let idx = LOG_COUNT.fetch_add(1, Ordering::SeqCst);
    if idx < MAX_LOG_ENTRIES {
        unsafe {
            LOG_BUFFER[idx] = Some((level, message));
        }
    }
}

pub fn get_logs() -> &'static [Option<(Level, &'static str)>] {
    let count = LOG_COUNT.load(Ordering::SeqCst).min(MAX_LOG_ENTRIES);
    unsafe { &LOG_BUFFER[..count] }
}

pub fn log_count() -> usize {
    LOG_COUNT.load(Ordering::SeqCst).min(MAX_LOG_ENTRIES)
}

#[macro_export]
macro_rules! log_info {
    ($msg:expr) => {
        $crate::logger::log($crate::logger::Level::Info, $msg)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($msg:expr) => {
        $crate::logger::log($crate::logger::Level::Warn, $msg)
    };
}
