//! Reference detection over single values and whole tables

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::grammar::{
    format_credential_store_reference, format_vault_reference, VAULT_SEPARATOR, GRAMMARS,
};

/// Which kind of secret store a reference points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Keystore-backed vault, addressed by block and attribute
    Vault,
    /// Credential store, addressed by a flat alias
    CredentialStore,
}

impl StoreKind {
    /// Human-readable name, as used in operator diagnostics
    pub fn display_name(&self) -> &'static str {
        match self {
            StoreKind::Vault => "vault",
            StoreKind::CredentialStore => "credential store",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// `VAULT::<block>::<attribute>::<shared_key>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VaultReference {
    pub block: String,
    pub attribute: String,
    pub shared_key: String,
}

/// `CS:<alias>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialStoreAlias {
    pub alias: String,
}

/// A parsed pointer into a secret store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SecretReference {
    Vault(VaultReference),
    CredentialStore(CredentialStoreAlias),
}

impl SecretReference {
    pub fn kind(&self) -> StoreKind {
        match self {
            SecretReference::Vault(_) => StoreKind::Vault,
            SecretReference::CredentialStore(_) => StoreKind::CredentialStore,
        }
    }

    /// The key this reference is stored under in its store
    ///
    /// Vault entries are keyed `block::attribute`; credential store entries
    /// by their alias.
    pub fn store_key(&self) -> String {
        match self {
            SecretReference::Vault(v) => format!("{}{}{}", v.block, VAULT_SEPARATOR, v.attribute),
            SecretReference::CredentialStore(cs) => cs.alias.clone(),
        }
    }
}

impl fmt::Display for SecretReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretReference::Vault(v) => f.write_str(&format_vault_reference(&v.block, &v.attribute)),
            SecretReference::CredentialStore(cs) => {
                f.write_str(&format_credential_store_reference(&cs.alias))
            }
        }
    }
}

/// Parse a value against every grammar
///
/// Returns `None` for literals, including strings that only resemble a
/// reference.
pub fn parse(value: &str) -> Option<SecretReference> {
    GRAMMARS.iter().find_map(|grammar| grammar.parse(value))
}

/// Whether a value is a secret reference; absent values never are
pub fn is_reference(value: Option<&str>) -> bool {
    value.map_or(false, |v| parse(v).is_some())
}

/// Whether at least one of `values` is a reference
pub fn contains_references<'a, I>(values: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().any(|v| parse(v).is_some())
}

/// The store kinds referenced by `values`, so only those stores get opened
pub fn detected_kinds<'a, I>(values: I) -> BTreeSet<StoreKind>
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .filter_map(|v| parse(v).map(|r| r.kind()))
        .collect()
}
