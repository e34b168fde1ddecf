// Memory Logger
//
// Logger that keeps every record, for hosts that inspect diagnostics
// after the fact and for tests.

use super::logger::{LogField, LogLevel, Logger};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug)]
pub struct MemoryLogger {
    level: LogLevel,
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new(level: LogLevel) -> Self {
        MemoryLogger {
            level,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn records_at(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.level == level)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl Logger for MemoryLogger {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn log(&self, level: LogLevel, message: &str, fields: &[LogField<'_>]) {
        if !self.is_enabled(level) {
            return;
        }
        let record = LogRecord {
            level,
            message: message.to_string(),
            fields: fields
                .iter()
                .map(|f| (f.name.to_string(), f.value.to_string()))
                .collect(),
        };
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}
