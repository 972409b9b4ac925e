//! Logging abstractions
//!
//! The activator and its collaborators log through an injected [`Logger`].
//! Store backends additionally write low-level traces to the debug
//! [`file_logger`], which is off unless `PROPGUARD_DEBUG` is set.

mod traits;
mod noop;
mod console;
mod memory;
mod tracing_logger;
pub mod file_logger;

pub use traits::{Logger, LoggerExt, LogLevel, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use memory::{MemoryLogger, LogRecord};
pub use tracing_logger::TracingLogger;
