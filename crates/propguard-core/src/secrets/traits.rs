//! Core traits and types for secret storage

use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur during secret store operations
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Store is read-only")]
    ReadOnly,

    #[error("Operation not supported by this store: {0}")]
    Unsupported(String),

    #[error("Store not available: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Other(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// An opened secret store
///
/// Vault stores key their entries `block::attribute`, credential stores by
/// alias. Values go in and come out as [`SecretString`] so they never show
/// up in `Debug` output.
///
/// # Example
///
/// ```
/// use propguard_core::secrets::{SecretStore, MemorySecretStore};
/// use secrecy::{ExposeSecret, SecretString};
///
/// let store = MemorySecretStore::new();
/// store.store("db-password", SecretString::from("hunter2")).unwrap();
/// let secret = store.retrieve("db-password").unwrap();
/// assert_eq!(secret.expose_secret(), "hunter2");
/// ```
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Look up a secret
    ///
    /// A missing key is `Err(SecretStoreError::NotFound)`; every other error
    /// means the store itself could not be read.
    fn retrieve(&self, key: &str) -> SecretStoreResult<SecretString>;

    /// Store or replace a secret
    fn store(&self, key: &str, secret: SecretString) -> SecretStoreResult<()>;

    /// Remove a secret; removing a missing key is not an error
    fn remove(&self, key: &str) -> SecretStoreResult<()>;

    /// Keys of every stored secret, sorted
    fn list(&self) -> SecretStoreResult<Vec<String>>;

    fn contains(&self, key: &str) -> bool {
        self.retrieve(key).is_ok()
    }

    /// Release whatever the backend holds open
    ///
    /// Called once when the handle that opened the store is unloaded. Reads
    /// after `close` may fail.
    fn close(&self) {}
}
