//! Secret store abstractions and implementations
//!
//! This module provides the secret-store collaborator interface with:
//! - `SecretStore` trait (`retrieve`, `store`, `remove`, `list`)
//! - Built-in implementations: `MemorySecretStore`, `KeychainSecretStore`
//! - Password-protected in-memory keystores for the `memory` backend
//! - A registry for opening stores by backend name

mod traits;
mod memory_store;
mod keychain_store;
mod keystore;
mod registry;

pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
pub use memory_store::MemorySecretStore;
pub use keychain_store::KeychainSecretStore;
pub use keystore::{
    register_memory_keystore, unregister_memory_keystore, has_memory_keystore,
    open_memory_keystore,
};
pub use registry::{
    register_store_backend, unregister_store_backend, has_store_backend,
    list_store_backends, open_store, BackendDefinition, BackendFactory,
};
