// Logger Interface
//
// Logger trait definition.

use std::fmt;

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured field attached to a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogField<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

impl<'a> LogField<'a> {
    pub fn new(name: &'a str, value: &'a str) -> Self {
        LogField { name, value }
    }
}

/// Formats fields as `name=value` pairs separated by spaces.
pub fn format_fields(fields: &[LogField<'_>]) -> String {
    fields
        .iter()
        .map(|field| format!("{}={}", field.name, field.value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Logger trait.
pub trait Logger: Send + Sync {
    fn level(&self) -> LogLevel;

    fn log(&self, level: LogLevel, message: &str, fields: &[LogField<'_>]);

    fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    fn debug(&self, msg: &str) {
        self.log(LogLevel::Debug, msg, &[]);
    }

    fn info(&self, msg: &str) {
        self.log(LogLevel::Info, msg, &[]);
    }

    fn warn(&self, msg: &str) {
        self.log(LogLevel::Warn, msg, &[]);
    }

    fn error(&self, msg: &str) {
        self.log(LogLevel::Error, msg, &[]);
    }
}

/// Null logger (logs nothing).
pub struct NullLogger;

impl NullLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for NullLogger {
    fn level(&self) -> LogLevel {
        LogLevel::Error
    }

    fn log(&self, _level: LogLevel, _message: &str, _fields: &[LogField<'_>]) {}
}
