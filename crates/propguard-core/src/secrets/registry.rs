//! Store backend registry for opening stores by name

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::keychain_store::KeychainSecretStore;
use super::keystore::open_memory_keystore;
use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};
use crate::config::StoreConfig;

/// Opens a store from its configuration
pub type BackendFactory =
    Arc<dyn Fn(&StoreConfig) -> SecretStoreResult<Arc<dyn SecretStore>> + Send + Sync>;

/// Definition of a registered store backend
#[derive(Clone)]
pub struct BackendDefinition {
    pub name: String,
    pub description: String,
    pub factory: BackendFactory,
}

impl std::fmt::Debug for BackendDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

fn keychain_factory(config: &StoreConfig) -> SecretStoreResult<Arc<dyn SecretStore>> {
    let service = match config {
        StoreConfig::Vault(vault) => vault.keystore_alias.as_str(),
        StoreConfig::CredentialStore(cs) => cs.location(),
    };
    let store = KeychainSecretStore::with_service(service);
    store.probe()?;
    Ok(Arc::new(store))
}

fn memory_factory(config: &StoreConfig) -> SecretStoreResult<Arc<dyn SecretStore>> {
    open_memory_keystore(config.location(), config.protection())
}

/// Global registry of store backends
static REGISTRY: Lazy<RwLock<HashMap<String, BackendDefinition>>> = Lazy::new(|| {
    let mut map = HashMap::new();

    map.insert(
        "memory".to_string(),
        BackendDefinition {
            name: "memory".to_string(),
            description: "Password-protected in-memory keystores registered by the host".to_string(),
            factory: Arc::new(memory_factory),
        },
    );

    map.insert(
        "keychain".to_string(),
        BackendDefinition {
            name: "keychain".to_string(),
            description: "System keychain (macOS Keychain, Windows Credential Manager, Linux Secret Service)".to_string(),
            factory: Arc::new(keychain_factory),
        },
    );

    RwLock::new(map)
});

/// Register a store backend, replacing any backend of the same name
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use propguard_core::config::StoreConfig;
/// use propguard_core::secrets::{register_store_backend, MemorySecretStore, SecretStore};
///
/// register_store_backend(
///     "scratch",
///     "Empty store per open",
///     Arc::new(|_config: &StoreConfig| Ok(Arc::new(MemorySecretStore::new()) as Arc<dyn SecretStore>)),
/// );
/// ```
pub fn register_store_backend(name: &str, description: &str, factory: BackendFactory) {
    REGISTRY.write().insert(
        name.to_string(),
        BackendDefinition {
            name: name.to_string(),
            description: description.to_string(),
            factory,
        },
    );
}

/// Unregister a store backend (mainly for testing)
pub fn unregister_store_backend(name: &str) -> bool {
    REGISTRY.write().remove(name).is_some()
}

pub fn has_store_backend(name: &str) -> bool {
    REGISTRY.read().contains_key(name)
}

/// `(name, description)` of every backend, sorted by name
pub fn list_store_backends() -> Vec<(String, String)> {
    let mut backends: Vec<(String, String)> = REGISTRY
        .read()
        .values()
        .map(|def| (def.name.clone(), def.description.clone()))
        .collect();
    backends.sort();
    backends
}

/// Open the store `config` describes with the backend it names
pub fn open_store(config: &StoreConfig) -> SecretStoreResult<Arc<dyn SecretStore>> {
    // Clone the factory out so a backend may itself touch the registry
    let factory = REGISTRY
        .read()
        .get(config.backend())
        .map(|def| def.factory.clone())
        .ok_or_else(|| {
            SecretStoreError::Unavailable(format!("Unknown store backend '{}'", config.backend()))
        })?;
    factory(config)
}
