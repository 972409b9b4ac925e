//! Layered environment with fallback behavior

use std::collections::BTreeSet;

use super::traits::{Environment, SharedEnvironment};

/// Several environments consulted in order
///
/// The first layer holding a key wins. The usual stack is the process
/// environment over the user-level file, so an exported variable overrides
/// the file.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use propguard_core::config::{Environment, LayeredEnvironment, MemoryEnvironment};
///
/// let overrides = Arc::new(MemoryEnvironment::with_vars([("SALT", "override")]));
/// let defaults = Arc::new(MemoryEnvironment::with_vars([("SALT", "default"), ("ITERATION_COUNT", "50")]));
///
/// let environment = LayeredEnvironment::new(vec![overrides, defaults]);
/// assert_eq!(environment.get("SALT").as_deref(), Some("override"));
/// assert_eq!(environment.get("ITERATION_COUNT").as_deref(), Some("50"));
/// ```
pub struct LayeredEnvironment {
    layers: Vec<SharedEnvironment>,
}

impl LayeredEnvironment {
    pub fn new(layers: Vec<SharedEnvironment>) -> Self {
        Self { layers }
    }

    /// Add a lower-priority layer
    pub fn push(&mut self, layer: SharedEnvironment) {
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[SharedEnvironment] {
        &self.layers
    }

    /// Name of the layer a key would be read from
    pub fn source_of(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .find(|layer| layer.contains(key))
            .map(|layer| layer.name())
    }
}

impl Environment for LayeredEnvironment {
    fn name(&self) -> &str {
        "layered"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }

    fn keys(&self) -> Vec<String> {
        let keys: BTreeSet<String> = self.layers.iter().flat_map(|layer| layer.keys()).collect();
        keys.into_iter().collect()
    }
}

impl std::fmt::Debug for LayeredEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.layers.iter().map(|l| l.name()).collect();
        f.debug_struct("LayeredEnvironment").field("layers", &names).finish()
    }
}
