//! Redacting decorator over a runtime view

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::management::RuntimeIntrospection;

/// What a substituted property reads as through the management surface
pub const REDACTION_MARKER: &str = "<sensitive>";

/// Runtime view that masks the values of sensitive properties
///
/// Property reads for keys in the sensitive set return
/// [`REDACTION_MARKER`]; every other call goes to the wrapped view
/// unchanged.
pub struct RedactingRuntime {
    inner: Arc<dyn RuntimeIntrospection>,
    sensitive: BTreeSet<String>,
}

impl RedactingRuntime {
    pub fn new(inner: Arc<dyn RuntimeIntrospection>, sensitive: BTreeSet<String>) -> Self {
        Self { inner, sensitive }
    }

    pub fn sensitive_keys(&self) -> &BTreeSet<String> {
        &self.sensitive
    }

    /// The undecorated view
    pub fn inner(&self) -> &Arc<dyn RuntimeIntrospection> {
        &self.inner
    }
}

impl RuntimeIntrospection for RedactingRuntime {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn pid(&self) -> u32 {
        self.inner.pid()
    }

    fn start_time(&self) -> SystemTime {
        self.inner.start_time()
    }

    fn uptime(&self) -> Duration {
        self.inner.uptime()
    }

    fn input_arguments(&self) -> Vec<String> {
        self.inner.input_arguments()
    }

    fn system_properties(&self) -> BTreeMap<String, String> {
        let mut properties = self.inner.system_properties();
        for (key, value) in properties.iter_mut() {
            if self.sensitive.contains(key) {
                *value = REDACTION_MARKER.to_string();
            }
        }
        properties
    }

    fn system_property(&self, key: &str) -> Option<String> {
        let value = self.inner.system_property(key)?;
        if self.sensitive.contains(key) {
            return Some(REDACTION_MARKER.to_string());
        }
        Some(value)
    }
}
