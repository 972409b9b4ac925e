//! Handles to opened secret stores

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::logging::file_logger as log;
use crate::reference::StoreKind;
use crate::secrets::SecretStore;

/// An opened secret store together with the settings it was opened with
#[derive(Clone)]
pub struct StoreHandle {
    config: StoreConfig,
    store: Arc<dyn SecretStore>,
}

impl StoreHandle {
    pub fn new(config: StoreConfig, store: Arc<dyn SecretStore>) -> Self {
        Self { config, store }
    }

    pub fn kind(&self) -> StoreKind {
        self.config.kind()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn SecretStore> {
        &self.store
    }

    /// Close the backend and drop this handle's reference to it
    ///
    /// Clones of the handle still point at the closed store.
    pub fn unload(self) {
        log::debug(
            "StoreHandle",
            &format!(
                "unloading {} '{}' (backend '{}')",
                self.kind(),
                self.config.location(),
                self.config.backend()
            ),
        );
        self.store.close();
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("kind", &self.kind())
            .field("store", &self.store.name())
            .field("config", &self.config)
            .finish()
    }
}

/// The handles opened for one activation, at most one per store kind
#[derive(Debug, Clone, Default)]
pub struct StoreHandles {
    handles: BTreeMap<StoreKind, StoreHandle>,
}

impl StoreHandles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handle, returning the one it replaces
    pub fn insert(&mut self, handle: StoreHandle) -> Option<StoreHandle> {
        self.handles.insert(handle.kind(), handle)
    }

    pub fn get(&self, kind: StoreKind) -> Option<&StoreHandle> {
        self.handles.get(&kind)
    }

    pub fn kinds(&self) -> Vec<StoreKind> {
        self.handles.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Unload every handle
    pub fn unload_all(&mut self) {
        for (_, handle) in std::mem::take(&mut self.handles) {
            handle.unload();
        }
    }
}

impl FromIterator<StoreHandle> for StoreHandles {
    fn from_iter<I: IntoIterator<Item = StoreHandle>>(iter: I) -> Self {
        let mut handles = Self::new();
        for handle in iter {
            handles.insert(handle);
        }
        handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryEnvironment;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use secrecy::SecretString;

    use crate::secrets::{MemorySecretStore, SecretStoreResult};

    /// Counts how often it was closed
    #[derive(Default)]
    struct ClosingStore {
        closed: AtomicUsize,
    }

    impl SecretStore for ClosingStore {
        fn name(&self) -> &str {
            "closing"
        }

        fn retrieve(&self, key: &str) -> SecretStoreResult<SecretString> {
            Err(crate::secrets::SecretStoreError::NotFound(key.to_string()))
        }

        fn store(&self, _key: &str, _secret: SecretString) -> SecretStoreResult<()> {
            Ok(())
        }

        fn remove(&self, _key: &str) -> SecretStoreResult<()> {
            Ok(())
        }

        fn list(&self) -> SecretStoreResult<Vec<String>> {
            Ok(Vec::new())
        }

        fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn credential_store_handle() -> StoreHandle {
        let env = MemoryEnvironment::with_vars([
            ("CREDENTIAL_STORE_PROTECTION_TYPE", "clear"),
            ("CREDENTIAL_STORE_PROTECTION", "secret"),
            ("CREDENTIAL_STORE_ATTR_location", "/tmp/cs.store"),
        ]);
        let config = StoreConfig::from_environment(StoreKind::CredentialStore, &env).unwrap();
        StoreHandle::new(config, Arc::new(MemorySecretStore::new()))
    }

    #[test]
    fn test_handles_keyed_by_kind() {
        let mut handles = StoreHandles::new();
        assert!(handles.insert(credential_store_handle()).is_none());
        assert!(handles.insert(credential_store_handle()).is_some());

        assert_eq!(handles.len(), 1);
        assert_eq!(handles.kinds(), vec![StoreKind::CredentialStore]);
        assert!(handles.get(StoreKind::Vault).is_none());
        assert_eq!(
            handles.get(StoreKind::CredentialStore).unwrap().store().name(),
            "memory"
        );
    }

    #[test]
    fn test_unload_all_empties() {
        let mut handles: StoreHandles = vec![credential_store_handle()].into_iter().collect();
        handles.unload_all();
        assert!(handles.is_empty());
    }

    #[test]
    fn test_unload_closes_backend() {
        let store = Arc::new(ClosingStore::default());
        let handle = StoreHandle::new(credential_store_handle().config().clone(), store.clone());
        let mut handles: StoreHandles = vec![handle].into_iter().collect();

        handles.unload_all();
        assert_eq!(store.closed.load(Ordering::SeqCst), 1);

        // Nothing left to close the second time
        handles.unload_all();
        assert_eq!(store.closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_hides_protection() {
        let debug = format!("{:?}", credential_store_handle());
        assert!(debug.contains("CredentialStore"));
        assert!(!debug.contains("\"secret\""));
    }
}
