//! Secret reference syntax
//!
//! A property value is either a literal or a reference into a secret store.
//! Two grammars exist, one per store kind:
//!
//! - vault: `VAULT::<block>::<attribute>::1`
//! - credential store: `CS:<alias>`
//!
//! Parsing never fails loudly: anything that does not match a grammar
//! exactly is a literal and is left alone.

mod grammar;
mod detector;

pub use grammar::{
    ReferenceGrammar, VaultGrammar, CredentialStoreGrammar, GRAMMARS,
    VAULT_PREFIX, VAULT_SEPARATOR, VAULT_SHARED_KEY, CREDENTIAL_STORE_PREFIX,
    format_vault_reference, format_credential_store_reference,
};
pub use detector::{
    SecretReference, VaultReference, CredentialStoreAlias, StoreKind,
    parse, is_reference, contains_references, detected_kinds,
};
