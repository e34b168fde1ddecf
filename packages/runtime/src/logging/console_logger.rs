// Console Logger
//
// Logger that writes to the console.

use super::logger::{format_fields, LogField, LogLevel, Logger};

/// Console logger. Info goes to stdout, everything else to stderr.
pub struct ConsoleLogger {
    level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }
}

impl Logger for ConsoleLogger {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn log(&self, level: LogLevel, message: &str, fields: &[LogField<'_>]) {
        if !self.is_enabled(level) {
            return;
        }
        let line = if fields.is_empty() {
            format!("[{}] {}", level, message)
        } else {
            format!("[{}] {} ({})", level, message, format_fields(fields))
        };
        match level {
            LogLevel::Info => println!("{}", line),
            _ => eprintln!("{}", line),
        }
    }
}
