//! System keychain secret store
//!
//! Uses the OS keychain as the backing store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use keyring::Entry;
use secrecy::{ExposeSecret, SecretString};

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};
use crate::logging::file_logger as log;

const AVAILABILITY_PROBE: &str = "__propguard_availability_check__";

/// Secret store backed by the system keychain
///
/// Every secret is a keychain entry under one service name. The vault
/// backend uses the keystore alias as service name and the credential store
/// backend uses the store's `location` attribute, so a vault entry for
/// `VAULT::db::password::1` lives at service `<alias>`, user `db::password`.
///
/// The keychain cannot enumerate entries, so [`SecretStore::list`] reports
/// [`SecretStoreError::Unsupported`].
///
/// # Example
///
/// ```no_run
/// use propguard_core::secrets::{KeychainSecretStore, SecretStore};
/// use secrecy::SecretString;
///
/// let store = KeychainSecretStore::with_service("vault");
/// store.store("db::password", SecretString::from("hunter2")).unwrap();
/// assert!(store.contains("db::password"));
/// ```
#[derive(Debug, Clone)]
pub struct KeychainSecretStore {
    service_name: String,
}

impl KeychainSecretStore {
    /// Create a keychain store with the default service name "propguard"
    pub fn new() -> Self {
        Self::with_service("propguard")
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service_name: service.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Check the keychain can be reached, as a store open would
    ///
    /// Fails on headless hosts without a keychain daemon.
    pub fn probe(&self) -> SecretStoreResult<()> {
        log::debug(
            "KeychainSecretStore",
            &format!("probe() service='{}'", self.service_name),
        );
        let entry = self.entry(AVAILABILITY_PROBE)?;
        match entry.get_password() {
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                log::warn("KeychainSecretStore", &format!("probe() failed: {:?}", e));
                Err(SecretStoreError::Unavailable(format!("keychain not reachable: {}", e)))
            }
        }
    }

    fn entry(&self, key: &str) -> SecretStoreResult<Entry> {
        Entry::new(&self.service_name, key).map_err(|e| {
            log::error("KeychainSecretStore", &format!("entry creation failed: {:?}", e));
            SecretStoreError::Unavailable(format!("Failed to create keychain entry: {}", e))
        })
    }
}

impl Default for KeychainSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeychainSecretStore {
    fn name(&self) -> &str {
        "keychain"
    }

    fn retrieve(&self, key: &str) -> SecretStoreResult<SecretString> {
        log::debug(
            "KeychainSecretStore",
            &format!("retrieve() key='{}', service='{}'", key, self.service_name),
        );
        match self.entry(key)?.get_password() {
            Ok(password) => Ok(SecretString::from(password)),
            Err(keyring::Error::NoEntry) => {
                log::debug("KeychainSecretStore", "retrieve() NoEntry");
                Err(SecretStoreError::NotFound(key.to_string()))
            }
            Err(e) => {
                log::warn("KeychainSecretStore", &format!("retrieve() error: {:?}", e));
                Err(SecretStoreError::Other(format!("Failed to read from keychain: {}", e)))
            }
        }
    }

    fn store(&self, key: &str, secret: SecretString) -> SecretStoreResult<()> {
        log::info(
            "KeychainSecretStore",
            &format!("store() key='{}', service='{}'", key, self.service_name),
        );

        self.entry(key)?
            .set_password(secret.expose_secret())
            .map_err(|e| {
                log::error("KeychainSecretStore", &format!("set_password failed: {:?}", e));
                SecretStoreError::Other(format!("Failed to store in keychain: {}", e))
            })?;

        // Read back through a fresh entry so a cached write is not mistaken for a persisted one
        let persisted = self.entry(key)?.get_password().map_err(|e| {
            log::error("KeychainSecretStore", &format!("verification read failed: {:?}", e));
            SecretStoreError::Other(format!("Keychain store verification failed: {}", e))
        })?;

        if persisted.as_str() != secret.expose_secret() {
            log::error("KeychainSecretStore", "verification failed: value mismatch");
            return Err(SecretStoreError::Other(
                "Keychain store verification failed: value mismatch".to_string(),
            ));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> SecretStoreResult<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SecretStoreError::Other(format!(
                "Failed to delete from keychain: {}",
                e
            ))),
        }
    }

    fn list(&self) -> SecretStoreResult<Vec<String>> {
        Err(SecretStoreError::Unsupported("list".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests marked #[ignore] need a running keychain service

    #[test]
    #[ignore]
    fn test_store_and_retrieve() {
        let store = KeychainSecretStore::with_service("propguard-test");
        let _ = store.remove("block1::key");

        store.store("block1::key", SecretString::from("test_value")).unwrap();
        assert_eq!(store.retrieve("block1::key").unwrap().expose_secret(), "test_value");

        store.remove("block1::key").unwrap();
        assert!(matches!(
            store.retrieve("block1::key"),
            Err(SecretStoreError::NotFound(_))
        ));
    }

    #[test]
    #[ignore]
    fn test_probe() {
        KeychainSecretStore::with_service("propguard-test").probe().unwrap();
    }

    #[test]
    fn test_name_and_service() {
        let store = KeychainSecretStore::new();
        assert_eq!(store.name(), "keychain");
        assert_eq!(store.service_name(), "propguard");
        assert_eq!(KeychainSecretStore::with_service("vault").service_name(), "vault");
    }

    #[test]
    fn test_list_is_unsupported() {
        let store = KeychainSecretStore::with_service("propguard-test");
        assert!(matches!(store.list(), Err(SecretStoreError::Unsupported(_))));
    }
}
