//! In-memory secret store

use std::collections::HashMap;

use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// In-memory secret store for tests and embedding
///
/// Fully read-write. Secrets are lost when the store is dropped.
#[derive(Debug)]
pub struct MemorySecretStore {
    name: String,
    secrets: RwLock<HashMap<String, SecretString>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::named("memory")
    }

    /// Create an empty store reporting `name`
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secrets: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store with initial clear-text values
    pub fn with_secrets<I, K, V>(initial: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut secrets = store.secrets.write();
            for (key, value) in initial {
                secrets.insert(key.into(), SecretString::from(value.into()));
            }
        }
        store
    }

    pub fn clear(&self) {
        self.secrets.write().clear();
    }

    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn retrieve(&self, key: &str) -> SecretStoreResult<SecretString> {
        self.secrets
            .read()
            .get(key)
            .map(|s| SecretString::from(s.expose_secret().to_owned()))
            .ok_or_else(|| SecretStoreError::NotFound(key.to_string()))
    }

    fn store(&self, key: &str, secret: SecretString) -> SecretStoreResult<()> {
        self.secrets.write().insert(key.to_string(), secret);
        Ok(())
    }

    fn remove(&self, key: &str) -> SecretStoreResult<()> {
        self.secrets.write().remove(key);
        Ok(())
    }

    fn list(&self) -> SecretStoreResult<Vec<String>> {
        let mut keys: Vec<String> = self.secrets.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn contains(&self, key: &str) -> bool {
        self.secrets.read().contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_name() {
        assert_eq!(MemorySecretStore::new().name(), "memory");
        assert_eq!(MemorySecretStore::named("vault").name(), "vault");
    }

    #[test]
    fn test_memory_store_crud() {
        let store = MemorySecretStore::new();

        assert!(store.is_empty());
        assert!(matches!(store.retrieve("key"), Err(SecretStoreError::NotFound(k)) if k == "key"));

        store.store("key", SecretString::from("value")).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.retrieve("key").unwrap().expose_secret(), "value");
        assert!(store.contains("key"));

        store.store("key", SecretString::from("new_value")).unwrap();
        assert_eq!(store.retrieve("key").unwrap().expose_secret(), "new_value");

        store.remove("key").unwrap();
        assert!(!store.contains("key"));
        assert!(store.is_empty());

        // Removing again is fine
        store.remove("key").unwrap();
    }

    #[test]
    fn test_memory_store_list_is_sorted() {
        let store = MemorySecretStore::with_secrets([
            ("block2::key", "b"),
            ("block1::key", "a"),
            ("alias", "c"),
        ]);

        assert_eq!(
            store.list().unwrap(),
            vec!["alias".to_string(), "block1::key".to_string(), "block2::key".to_string()]
        );

        store.clear();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_debug_hides_values() {
        let store = MemorySecretStore::with_secrets([("key", "this is a password")]);
        let debug = format!("{:?}", store);
        assert!(!debug.contains("this is a password"));
    }

    #[test]
    fn test_memory_store_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemorySecretStore::new());
        let mut handles = vec![];

        for i in 0..10 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                let key = format!("key_{}", i);
                let value = format!("value_{}", i);
                store.store(&key, SecretString::from(value.clone())).unwrap();
                assert_eq!(store.retrieve(&key).unwrap().expose_secret(), value);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 10);
    }
}
