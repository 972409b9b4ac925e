//! PropGuard Core
//!
//! Startup substitution of secret references in a process's property
//! table. Property values such as `VAULT::db::password::1` or `CS:db-password`
//! are replaced with the secrets they point to, and the replaced values are
//! shown as `<sensitive>` to anything reading the process through its
//! management surface.
//!
//! ## Lifecycle
//!
//! ```rust,ignore
//! use propguard_core::{SecretsActivator, SystemProperties, TracingLogger};
//!
//! let properties = Arc::new(SystemProperties::from_process_env());
//! let activator = SecretsActivator::builder(properties)
//!     .logger(Arc::new(TracingLogger::new("activator")))
//!     .build();
//!
//! // Exits the process if a referenced store cannot be opened
//! activator.start()?;
//! // ...
//! activator.stop();
//! ```

pub mod logging;
pub mod config;
pub mod reference;
pub mod secrets;
pub mod properties;
pub mod resolver;
pub mod substitution;
pub mod management;
pub mod filter;
pub mod guard;
pub mod activator;

// Re-export commonly used types
pub use reference::{
    SecretReference, VaultReference, CredentialStoreAlias, StoreKind, ReferenceGrammar,
    is_reference, format_vault_reference, format_credential_store_reference,
};

pub use secrets::{
    SecretStore, SecretStoreError, SecretStoreResult,
    MemorySecretStore, KeychainSecretStore,
    register_store_backend, register_memory_keystore, open_store, list_store_backends,
};

pub use logging::{Logger, SharedLogger, NoOpLogger, ConsoleLogger, MemoryLogger, TracingLogger};

pub use config::{
    Environment, SharedEnvironment, ConfigError, ProcessEnvironment, MemoryEnvironment,
    FileEnvironment, LayeredEnvironment, StoreConfig, VaultConfig, CredentialStoreConfig,
    environment_contains_vault_configuration, environment_contains_credential_store_configuration,
};

pub use properties::SystemProperties;

pub use resolver::{
    StoreHandle, StoreHandles, ResolvedSecret, ResolutionError, ResolutionResult,
    list_references,
};

pub use substitution::SubstitutionRecord;

pub use management::{ManagementSurface, ProcessRuntime, RuntimeIntrospection};

pub use filter::{SensitiveValueFilter, RedactingRuntime, FilterError, REDACTION_MARKER};

pub use guard::{GuardState, HostControl, ProcessHost, RecordingHost, StartupGuard};

pub use activator::{SecretsActivator, SecretsActivatorBuilder, ActivationError, ActivationResult};
