//! The two reference grammars

use super::detector::{CredentialStoreAlias, SecretReference, StoreKind, VaultReference};

/// Leading token of a vault reference
pub const VAULT_PREFIX: &str = "VAULT";

/// Separator between vault reference segments
pub const VAULT_SEPARATOR: &str = "::";

/// Shared-key marker every vault reference ends with
pub const VAULT_SHARED_KEY: &str = "1";

/// Prefix of a credential store reference
pub const CREDENTIAL_STORE_PREFIX: &str = "CS:";

/// One way of spelling a reference to a stored secret
///
/// Each grammar belongs to exactly one [`StoreKind`]. Grammars must not
/// overlap: a value is claimed by at most one of them, which holds by
/// construction because their fixed prefixes differ in the first byte.
pub trait ReferenceGrammar: Send + Sync {
    /// The store this grammar addresses
    fn kind(&self) -> StoreKind;

    /// Parse `value` if, and only if, it matches this grammar exactly
    fn parse(&self, value: &str) -> Option<SecretReference>;

    /// Render a store key (as listed by the store) back to a reference
    fn reference_for_key(&self, key: &str) -> Option<String>;

    fn matches(&self, value: &str) -> bool {
        self.parse(value).is_some()
    }
}

/// `VAULT::<block>::<attribute>::1`
#[derive(Debug, Clone, Copy, Default)]
pub struct VaultGrammar;

impl ReferenceGrammar for VaultGrammar {
    fn kind(&self) -> StoreKind {
        StoreKind::Vault
    }

    fn parse(&self, value: &str) -> Option<SecretReference> {
        let rest = value
            .strip_prefix(VAULT_PREFIX)?
            .strip_prefix(VAULT_SEPARATOR)?;

        let mut parts = rest.split(VAULT_SEPARATOR);
        let block = parts.next()?;
        let attribute = parts.next()?;
        let shared_key = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        if !is_segment(block) || !is_segment(attribute) || shared_key != VAULT_SHARED_KEY {
            return None;
        }

        Some(SecretReference::Vault(VaultReference {
            block: block.to_string(),
            attribute: attribute.to_string(),
            shared_key: shared_key.to_string(),
        }))
    }

    fn reference_for_key(&self, key: &str) -> Option<String> {
        let (block, attribute) = key.split_once(VAULT_SEPARATOR)?;
        if !is_segment(block) || !is_segment(attribute) {
            return None;
        }
        Some(format_vault_reference(block, attribute))
    }
}

/// `CS:<alias>`
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialStoreGrammar;

impl ReferenceGrammar for CredentialStoreGrammar {
    fn kind(&self) -> StoreKind {
        StoreKind::CredentialStore
    }

    fn parse(&self, value: &str) -> Option<SecretReference> {
        let alias = value.strip_prefix(CREDENTIAL_STORE_PREFIX)?;
        if !is_segment(alias) {
            return None;
        }

        Some(SecretReference::CredentialStore(CredentialStoreAlias {
            alias: alias.to_string(),
        }))
    }

    fn reference_for_key(&self, key: &str) -> Option<String> {
        is_segment(key).then(|| format_credential_store_reference(key))
    }
}

/// All known grammars, in detection order
pub static GRAMMARS: [&dyn ReferenceGrammar; 2] = [&VaultGrammar, &CredentialStoreGrammar];

/// Build the vault reference for a block and attribute
///
/// # Example
///
/// ```
/// use propguard_core::reference::format_vault_reference;
///
/// assert_eq!(format_vault_reference("block1", "key"), "VAULT::block1::key::1");
/// ```
pub fn format_vault_reference(block: &str, attribute: &str) -> String {
    format!(
        "{VAULT_PREFIX}{VAULT_SEPARATOR}{block}{VAULT_SEPARATOR}{attribute}{VAULT_SEPARATOR}{VAULT_SHARED_KEY}"
    )
}

/// Build the credential store reference for an alias
pub fn format_credential_store_reference(alias: &str) -> String {
    format!("{CREDENTIAL_STORE_PREFIX}{alias}")
}

// Segments are non-empty and carry no ':' at all, so a single colon can
// never be mistaken for half a separator.
fn is_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains(':') && !segment.chars().any(char::is_whitespace)
}
