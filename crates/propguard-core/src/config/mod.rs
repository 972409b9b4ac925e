//! Store configuration sources
//!
//! Store initialization reads its settings from one [`Environment`], never
//! from scattered lookups:
//! - `ProcessEnvironment`: the process environment variables
//! - `MemoryEnvironment`: in-memory, for tests and embedding
//! - `FileEnvironment`: a YAML (or JSON) mapping file
//! - `LayeredEnvironment`: several sources, first match wins
//!
//! The typed store settings built from it live in [`store_config`].

mod traits;
mod process;
mod memory;
mod file;
mod layered;
pub mod store_config;

pub use traits::{Environment, SharedEnvironment, ConfigError, ConfigResult};
pub use process::ProcessEnvironment;
pub use memory::MemoryEnvironment;
pub use file::FileEnvironment;
pub use layered::LayeredEnvironment;
pub use store_config::{
    StoreConfig, VaultConfig, CredentialStoreConfig, ProtectionType,
    environment_contains_vault_configuration,
    environment_contains_credential_store_configuration,
};
