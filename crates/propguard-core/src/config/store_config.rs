//! Typed store settings read from an [`Environment`]
//!
//! The key names below are the contract with the secret-store backends.
//! Every mandatory key must be present for a store to be opened; a missing
//! key is reported as [`ConfigError::MissingKey`] and, during activation,
//! aborts startup the same way a failed open does.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::reference::StoreKind;

use super::traits::{ConfigError, ConfigResult, Environment};

pub const KEYSTORE_URL: &str = "KEYSTORE_URL";
pub const KEYSTORE_PASSWORD: &str = "KEYSTORE_PASSWORD";
pub const KEYSTORE_ALIAS: &str = "KEYSTORE_ALIAS";
pub const SALT: &str = "SALT";
pub const ITERATION_COUNT: &str = "ITERATION_COUNT";
pub const ENC_FILE_DIR: &str = "ENC_FILE_DIR";
pub const VAULT_BACKEND: &str = "VAULT_BACKEND";

pub const CREDENTIAL_STORE_ALGORITHM: &str = "CREDENTIAL_STORE_ALGORITHM";
pub const CREDENTIAL_STORE_PROTECTION_TYPE: &str = "CREDENTIAL_STORE_PROTECTION_TYPE";
pub const CREDENTIAL_STORE_PROTECTION: &str = "CREDENTIAL_STORE_PROTECTION";
pub const CREDENTIAL_STORE_PROTECTION_ALGORITHM: &str = "CREDENTIAL_STORE_PROTECTION_ALGORITHM";
pub const CREDENTIAL_STORE_PROTECTION_PARAMS: &str = "CREDENTIAL_STORE_PROTECTION_PARAMS";
pub const CREDENTIAL_STORE_ATTR_PREFIX: &str = "CREDENTIAL_STORE_ATTR_";
pub const CREDENTIAL_STORE_BACKEND: &str = "CREDENTIAL_STORE_BACKEND";

/// Store attribute naming where a credential store lives
pub const LOCATION_ATTRIBUTE: &str = "location";

pub const DEFAULT_CREDENTIAL_STORE_ALGORITHM: &str = "KeyStoreCredentialStore";
pub const DEFAULT_BACKEND: &str = "keychain";

const VAULT_REQUIRED_KEYS: [&str; 6] = [
    KEYSTORE_URL,
    KEYSTORE_PASSWORD,
    KEYSTORE_ALIAS,
    SALT,
    ITERATION_COUNT,
    ENC_FILE_DIR,
];

/// Settings of a keystore-backed vault
#[derive(Clone, PartialEq, Eq)]
pub struct VaultConfig {
    pub keystore_url: String,
    /// Masked keystore password (`MASK-...`), opaque to this crate
    pub keystore_password: String,
    pub keystore_alias: String,
    pub salt: String,
    pub iteration_count: u32,
    pub enc_file_dir: String,
    pub backend: String,
}

impl VaultConfig {
    pub fn required_keys() -> &'static [&'static str] {
        &VAULT_REQUIRED_KEYS
    }

    pub fn from_environment(env: &dyn Environment) -> ConfigResult<Self> {
        let iteration_count = env.require(ITERATION_COUNT)?;
        let iteration_count = iteration_count
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ConfigError::invalid_value(ITERATION_COUNT, &iteration_count, "expected a positive integer")
            })?;

        Ok(Self {
            keystore_url: env.require(KEYSTORE_URL)?,
            keystore_password: env.require(KEYSTORE_PASSWORD)?,
            keystore_alias: env.require(KEYSTORE_ALIAS)?,
            salt: env.require(SALT)?,
            iteration_count,
            enc_file_dir: env.require(ENC_FILE_DIR)?,
            backend: env.get(VAULT_BACKEND).unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
        })
    }

    /// The variables a host has to export to reopen this vault
    pub fn to_exports(&self) -> Vec<(String, String)> {
        let mut exports = vec![
            (KEYSTORE_URL.to_string(), self.keystore_url.clone()),
            (SALT.to_string(), self.salt.clone()),
            (ITERATION_COUNT.to_string(), self.iteration_count.to_string()),
            (KEYSTORE_PASSWORD.to_string(), self.keystore_password.clone()),
            (KEYSTORE_ALIAS.to_string(), self.keystore_alias.clone()),
            (ENC_FILE_DIR.to_string(), self.enc_file_dir.clone()),
        ];
        if self.backend != DEFAULT_BACKEND {
            exports.push((VAULT_BACKEND.to_string(), self.backend.clone()));
        }
        exports
    }
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("keystore_url", &self.keystore_url)
            .field("keystore_password", &"<masked>")
            .field("keystore_alias", &self.keystore_alias)
            .field("iteration_count", &self.iteration_count)
            .field("enc_file_dir", &self.enc_file_dir)
            .field("backend", &self.backend)
            .finish()
    }
}

/// How the credential store's own password is supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtectionType {
    /// Password masked with a PBE algorithm and parameters
    #[default]
    Masked,
    /// Password given as-is
    Clear,
}

impl ProtectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtectionType::Masked => "masked",
            ProtectionType::Clear => "clear",
        }
    }

    /// Keys that must be present for this protection type
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            ProtectionType::Masked => &[
                CREDENTIAL_STORE_PROTECTION,
                CREDENTIAL_STORE_PROTECTION_ALGORITHM,
                CREDENTIAL_STORE_PROTECTION_PARAMS,
            ],
            ProtectionType::Clear => &[CREDENTIAL_STORE_PROTECTION],
        }
    }
}

impl FromStr for ProtectionType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "masked" | "masked_password" => Ok(ProtectionType::Masked),
            "clear" | "clear_password" => Ok(ProtectionType::Clear),
            _ => Err(ConfigError::invalid_value(
                CREDENTIAL_STORE_PROTECTION_TYPE,
                s,
                "expected 'masked' or 'clear'",
            )),
        }
    }
}

impl fmt::Display for ProtectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings of a pluggable credential store
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialStoreConfig {
    pub algorithm: String,
    pub protection_type: ProtectionType,
    /// Store password, masked or clear per `protection_type`
    pub protection: String,
    pub protection_algorithm: Option<String>,
    pub protection_params: Option<String>,
    /// `CREDENTIAL_STORE_ATTR_<name>` values keyed by `<name>`
    pub attributes: BTreeMap<String, String>,
    pub backend: String,
}

impl CredentialStoreConfig {
    pub fn from_environment(env: &dyn Environment) -> ConfigResult<Self> {
        let protection_type = match env.get(CREDENTIAL_STORE_PROTECTION_TYPE) {
            Some(value) => value.parse()?,
            None => ProtectionType::default(),
        };

        for key in protection_type.required_keys() {
            env.require(key)?;
        }

        let attributes: BTreeMap<String, String> = env
            .keys_with_prefix(CREDENTIAL_STORE_ATTR_PREFIX)
            .into_iter()
            .filter_map(|key| {
                let value = env.get(&key)?;
                let name = key.strip_prefix(CREDENTIAL_STORE_ATTR_PREFIX)?.to_string();
                (!name.is_empty()).then_some((name, value))
            })
            .collect();

        if !attributes.contains_key(LOCATION_ATTRIBUTE) {
            return Err(ConfigError::MissingKey(format!(
                "{CREDENTIAL_STORE_ATTR_PREFIX}{LOCATION_ATTRIBUTE}"
            )));
        }

        Ok(Self {
            algorithm: env
                .get(CREDENTIAL_STORE_ALGORITHM)
                .unwrap_or_else(|| DEFAULT_CREDENTIAL_STORE_ALGORITHM.to_string()),
            protection_type,
            protection: env.require(CREDENTIAL_STORE_PROTECTION)?,
            protection_algorithm: env.get(CREDENTIAL_STORE_PROTECTION_ALGORITHM),
            protection_params: env.get(CREDENTIAL_STORE_PROTECTION_PARAMS),
            attributes,
            backend: env.get(CREDENTIAL_STORE_BACKEND).unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
        })
    }

    pub fn location(&self) -> &str {
        self.attributes
            .get(LOCATION_ATTRIBUTE)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// The variables a host has to export to reopen this credential store
    pub fn to_exports(&self) -> Vec<(String, String)> {
        let mut exports = Vec::new();
        if self.protection_type != ProtectionType::default() {
            exports.push((
                CREDENTIAL_STORE_PROTECTION_TYPE.to_string(),
                self.protection_type.to_string(),
            ));
        }
        if self.algorithm != DEFAULT_CREDENTIAL_STORE_ALGORITHM {
            exports.push((CREDENTIAL_STORE_ALGORITHM.to_string(), self.algorithm.clone()));
        }
        if let Some(algorithm) = &self.protection_algorithm {
            exports.push((CREDENTIAL_STORE_PROTECTION_ALGORITHM.to_string(), algorithm.clone()));
        }
        if let Some(params) = &self.protection_params {
            exports.push((CREDENTIAL_STORE_PROTECTION_PARAMS.to_string(), params.clone()));
        }
        exports.push((CREDENTIAL_STORE_PROTECTION.to_string(), self.protection.clone()));
        for (name, value) in &self.attributes {
            exports.push((format!("{CREDENTIAL_STORE_ATTR_PREFIX}{name}"), value.clone()));
        }
        if self.backend != DEFAULT_BACKEND {
            exports.push((CREDENTIAL_STORE_BACKEND.to_string(), self.backend.clone()));
        }
        exports
    }
}

impl fmt::Debug for CredentialStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStoreConfig")
            .field("algorithm", &self.algorithm)
            .field("protection_type", &self.protection_type)
            .field("protection", &"<masked>")
            .field("protection_algorithm", &self.protection_algorithm)
            .field("attributes", &self.attributes)
            .field("backend", &self.backend)
            .finish()
    }
}

/// Settings for one store, whichever kind it is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Vault(VaultConfig),
    CredentialStore(CredentialStoreConfig),
}

impl StoreConfig {
    /// Read the settings for `kind` from `env`
    pub fn from_environment(kind: StoreKind, env: &dyn Environment) -> ConfigResult<Self> {
        match kind {
            StoreKind::Vault => VaultConfig::from_environment(env).map(StoreConfig::Vault),
            StoreKind::CredentialStore => {
                CredentialStoreConfig::from_environment(env).map(StoreConfig::CredentialStore)
            }
        }
    }

    pub fn kind(&self) -> StoreKind {
        match self {
            StoreConfig::Vault(_) => StoreKind::Vault,
            StoreConfig::CredentialStore(_) => StoreKind::CredentialStore,
        }
    }

    /// Name of the backend that opens this store
    pub fn backend(&self) -> &str {
        match self {
            StoreConfig::Vault(v) => &v.backend,
            StoreConfig::CredentialStore(cs) => &cs.backend,
        }
    }

    /// Where the store lives: keystore URL or the `location` attribute
    pub fn location(&self) -> &str {
        match self {
            StoreConfig::Vault(v) => &v.keystore_url,
            StoreConfig::CredentialStore(cs) => cs.location(),
        }
    }

    /// The (masked or clear) password that unlocks the store
    pub fn protection(&self) -> &str {
        match self {
            StoreConfig::Vault(v) => &v.keystore_password,
            StoreConfig::CredentialStore(cs) => &cs.protection,
        }
    }

    pub fn to_exports(&self) -> Vec<(String, String)> {
        match self {
            StoreConfig::Vault(v) => v.to_exports(),
            StoreConfig::CredentialStore(cs) => cs.to_exports(),
        }
    }

    /// `export KEY=value` lines, one per variable
    pub fn export_script(&self) -> String {
        self.to_exports()
            .into_iter()
            .map(|(k, v)| format!("export {k}={v}\n"))
            .collect()
    }
}

/// Whether every mandatory vault key is present
pub fn environment_contains_vault_configuration(env: &dyn Environment) -> bool {
    VAULT_REQUIRED_KEYS.iter().all(|key| env.contains(key))
}

/// Whether a credential store could be configured from `env`
pub fn environment_contains_credential_store_configuration(env: &dyn Environment) -> bool {
    CredentialStoreConfig::from_environment(env).is_ok()
}
