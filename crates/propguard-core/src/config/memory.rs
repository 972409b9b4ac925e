//! In-memory environment

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::Environment;

/// In-memory environment for tests and for hosts that assemble settings
/// themselves
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    vars: RwLock<HashMap<String, String>>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment from key/value pairs
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: RwLock::new(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.write().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.vars.write().remove(key)
    }

    pub fn clear(&self) {
        self.vars.write().clear();
    }

    pub fn len(&self) -> usize {
        self.vars.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Environment for MemoryEnvironment {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.vars.read().get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.vars.read().keys().cloned().collect()
    }
}
