//! The registered runtime view

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::runtime::{ProcessRuntime, RuntimeIntrospection};
use crate::properties::SystemProperties;

/// Slot holding the runtime view that introspection clients are served
///
/// Clients call [`ManagementSurface::runtime`] on every request instead of
/// caching the view, so a replaced view takes effect immediately.
pub struct ManagementSurface {
    view: RwLock<Arc<dyn RuntimeIntrospection>>,
}

impl ManagementSurface {
    pub fn new(view: Arc<dyn RuntimeIntrospection>) -> Self {
        Self {
            view: RwLock::new(view),
        }
    }

    /// A surface serving a [`ProcessRuntime`] over `properties`
    pub fn for_process(properties: Arc<SystemProperties>) -> Self {
        Self::new(Arc::new(ProcessRuntime::new(properties)))
    }

    /// The view currently served
    pub fn runtime(&self) -> Arc<dyn RuntimeIntrospection> {
        self.view.read().clone()
    }

    /// Serve `view` from now on, returning the view it replaces
    pub fn replace(&self, view: Arc<dyn RuntimeIntrospection>) -> Arc<dyn RuntimeIntrospection> {
        std::mem::replace(&mut *self.view.write(), view)
    }
}

impl fmt::Debug for ManagementSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagementSurface")
            .field("runtime", &self.runtime().name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_swaps_view() {
        let first = Arc::new(SystemProperties::with_entries([("k", "first")]));
        let second = Arc::new(SystemProperties::with_entries([("k", "second")]));
        let surface = ManagementSurface::for_process(first);

        assert_eq!(surface.runtime().system_property("k"), Some("first".to_string()));

        let previous = surface.replace(Arc::new(ProcessRuntime::new(second)));
        assert_eq!(surface.runtime().system_property("k"), Some("second".to_string()));
        assert_eq!(previous.system_property("k"), Some("first".to_string()));
    }
}
