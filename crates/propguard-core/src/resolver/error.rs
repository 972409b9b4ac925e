//! Resolution error types

use thiserror::Error;

use crate::reference::{self, StoreKind};

/// Errors raised while opening a store or resolving a reference through it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The store could not be configured or opened; fatal at startup
    #[error("Failed to initialize {kind}: {message}")]
    StoreInitialization { kind: StoreKind, message: String },

    /// The reference names an entry the store does not hold; recoverable
    #[error("No secret stored for {reference}")]
    SecretNotFound { reference: String },

    /// The store failed while reading an entry; fatal during substitution
    #[error("Failed to read {reference} from the secret store: {message}")]
    StoreAccess { reference: String, message: String },
}

impl ResolutionError {
    pub fn initialization(kind: StoreKind, message: impl Into<String>) -> Self {
        Self::StoreInitialization {
            kind,
            message: message.into(),
        }
    }

    /// Whether this error must abort startup
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ResolutionError::SecretNotFound { .. })
    }

    /// The store kind the failure belongs to, when it can be told
    pub fn store_kind(&self) -> Option<StoreKind> {
        match self {
            ResolutionError::StoreInitialization { kind, .. } => Some(*kind),
            ResolutionError::SecretNotFound { reference }
            | ResolutionError::StoreAccess { reference, .. } => {
                reference::parse(reference).map(|r| r.kind())
            }
        }
    }

    /// The underlying cause without the variant's framing
    pub fn detail(&self) -> &str {
        match self {
            ResolutionError::StoreInitialization { message, .. }
            | ResolutionError::StoreAccess { message, .. } => message,
            ResolutionError::SecretNotFound { reference } => reference,
        }
    }
}

pub type ResolutionResult<T> = Result<T, ResolutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality() {
        assert!(ResolutionError::initialization(StoreKind::Vault, "bad password").is_fatal());
        assert!(ResolutionError::StoreAccess {
            reference: "CS:key".to_string(),
            message: "io".to_string(),
        }
        .is_fatal());
        assert!(!ResolutionError::SecretNotFound {
            reference: "CS:key".to_string(),
        }
        .is_fatal());
    }

    #[test]
    fn test_store_kind() {
        let access = ResolutionError::StoreAccess {
            reference: "VAULT::block1::key::1".to_string(),
            message: "corrupt".to_string(),
        };
        assert_eq!(access.store_kind(), Some(StoreKind::Vault));
        assert_eq!(access.detail(), "corrupt");

        let init = ResolutionError::initialization(StoreKind::CredentialStore, "missing location");
        assert_eq!(init.store_kind(), Some(StoreKind::CredentialStore));
        assert_eq!(init.to_string(), "Failed to initialize credential store: missing location");
    }
}
