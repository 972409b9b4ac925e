//! Password-protected in-memory keystores
//!
//! Hosts and tests register a populated [`MemorySecretStore`] under a
//! location together with the password that unlocks it. The `memory`
//! backend then opens it the way a keystore file would be opened: an
//! unknown location or a wrong password fails the open.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};

use super::memory_store::MemorySecretStore;
use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

struct MemoryKeystore {
    password: SecretString,
    store: Arc<MemorySecretStore>,
}

static KEYSTORES: Lazy<RwLock<HashMap<String, MemoryKeystore>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register `store` at `location`, unlocked by `password`
///
/// Replaces any keystore already registered at that location.
pub fn register_memory_keystore(
    location: &str,
    password: impl Into<String>,
    store: Arc<MemorySecretStore>,
) {
    KEYSTORES.write().insert(
        location.to_string(),
        MemoryKeystore {
            password: SecretString::from(password.into()),
            store,
        },
    );
}

pub fn unregister_memory_keystore(location: &str) -> bool {
    KEYSTORES.write().remove(location).is_some()
}

pub fn has_memory_keystore(location: &str) -> bool {
    KEYSTORES.read().contains_key(location)
}

/// Open the keystore registered at `location`
pub fn open_memory_keystore(location: &str, password: &str) -> SecretStoreResult<Arc<dyn SecretStore>> {
    let keystores = KEYSTORES.read();
    let keystore = keystores.get(location).ok_or_else(|| {
        SecretStoreError::Unavailable(format!("Keystore '{}' does not exist", location))
    })?;

    if keystore.password.expose_secret() != password {
        return Err(SecretStoreError::Other(format!(
            "Keystore '{}' was tampered with, or password was incorrect",
            location
        )));
    }

    Ok(keystore.store.clone())
}
