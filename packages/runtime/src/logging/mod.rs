// Logging
//
// The injected logging collaborator and its implementations.

mod console_logger;
mod logger;
mod memory_logger;
mod tracing_logger;

pub use console_logger::ConsoleLogger;
pub use logger::{format_fields, LogField, LogLevel, Logger, NullLogger};
pub use memory_logger::{LogRecord, MemoryLogger};
pub use tracing_logger::TracingLogger;
