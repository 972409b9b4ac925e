//! No-op logger implementation

use super::traits::Logger;

/// A logger that does nothing
///
/// The default when a host does not inject one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}

    fn is_debug_enabled(&self) -> bool {
        false
    }
}
