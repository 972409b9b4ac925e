//! Logger that forwards to `tracing`

use super::traits::Logger;

/// Forwards log lines to the `tracing` facade
///
/// Each line becomes an event with `target: "propguard"` and a `component`
/// field, so a host's subscriber can route or format them as structured
/// records.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: String,
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("activator")
    }
}

impl TracingLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "propguard", component = %self.component, "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "propguard", component = %self.component, "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "propguard", component = %self.component, "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "propguard", component = %self.component, "{}", message);
    }

    fn is_debug_enabled(&self) -> bool {
        tracing::enabled!(target: "propguard", tracing::Level::DEBUG)
    }
}
