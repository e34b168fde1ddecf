// Tracing Logger
//
// Forwards log events to the `tracing` facade.

use super::logger::{format_fields, LogField, LogLevel, Logger};

/// Logger emitting `tracing` events under the `quill` target. Filtering
/// beyond the minimum level is left to the installed subscriber.
pub struct TracingLogger {
    level: LogLevel,
}

impl TracingLogger {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl Logger for TracingLogger {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn log(&self, level: LogLevel, message: &str, fields: &[LogField<'_>]) {
        if !self.is_enabled(level) {
            return;
        }
        let fields = format_fields(fields);
        match level {
            LogLevel::Debug => tracing::debug!(target: "quill", fields = %fields, "{}", message),
            LogLevel::Info => tracing::info!(target: "quill", fields = %fields, "{}", message),
            LogLevel::Warn => tracing::warn!(target: "quill", fields = %fields, "{}", message),
            LogLevel::Error => tracing::error!(target: "quill", fields = %fields, "{}", message),
        }
    }
}
