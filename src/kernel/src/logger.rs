//! Kernel `log` backend.
//!
//! Every record goes to the serial console with a boot-style status tag:
//!
//! ```text
//! [INFO] pci: 6 functions found, 6 recorded
//! [WARN] rtc: update in progress after 1000000 polls
//! ```

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::serial_println;

/// Most verbose level that reaches the console.
pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

struct SerialLogger;

static LOGGER: SerialLogger = SerialLogger;

/// Install the serial logger.
///
/// Idempotent: only the first call installs, later calls are ignored.
pub fn init() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LOG_LEVEL);
    }
}

fn tag(level: Level) -> &'static str {
    match level {
        Level::Error => "[FAIL]",
        Level::Warn => "[WARN]",
        Level::Info => "[INFO]",
        Level::Debug => "[DBUG]",
        Level::Trace => "[TRCE]",
    }
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            serial_println!("{} {}", tag(record.level()), record.args());
        }
    }

    fn flush(&self) {}
}
