//! Opening stores and resolving references through them

use std::collections::BTreeSet;

use secrecy::SecretString;

use super::error::{ResolutionError, ResolutionResult};
use super::handle::{StoreHandle, StoreHandles};
use crate::config::{Environment, StoreConfig};
use crate::logging::file_logger as log;
use crate::reference::{SecretReference, StoreKind, GRAMMARS};
use crate::secrets::{open_store, SecretStoreError};

/// Clear text produced by resolving one reference
///
/// Only the substitution pass holds one, and only until the value is written
/// into the property table.
#[derive(Debug, Clone)]
pub struct ResolvedSecret {
    pub value: SecretString,
    /// Name of the store that held the secret
    pub source: String,
}

/// Open the store of `kind` configured in `env`
///
/// A missing mandatory key fails the same way an unopenable store does.
pub fn initialize(kind: StoreKind, env: &dyn Environment) -> ResolutionResult<StoreHandle> {
    log::debug(
        "ReferenceResolver",
        &format!("initializing {} from environment '{}'", kind, env.name()),
    );

    let config = StoreConfig::from_environment(kind, env)
        .map_err(|e| ResolutionError::initialization(kind, e.to_string()))?;

    let store = open_store(&config).map_err(|e| {
        log::warn(
            "ReferenceResolver",
            &format!("{} at '{}' failed to open: {}", kind, config.location(), e),
        );
        ResolutionError::initialization(kind, e.to_string())
    })?;

    log::info(
        "ReferenceResolver",
        &format!("{} '{}' opened with backend '{}'", kind, config.location(), config.backend()),
    );
    Ok(StoreHandle::new(config, store))
}

/// Open one store per kind, stopping at the first failure
///
/// Stores opened before the failure are unloaded again.
pub fn initialize_all(
    kinds: &BTreeSet<StoreKind>,
    env: &dyn Environment,
) -> ResolutionResult<StoreHandles> {
    let mut handles = StoreHandles::new();
    for kind in kinds {
        match initialize(*kind, env) {
            Ok(handle) => {
                handles.insert(handle);
            }
            Err(e) => {
                handles.unload_all();
                return Err(e);
            }
        }
    }
    Ok(handles)
}

/// Look up the secret `reference` points to
pub fn resolve(handle: &StoreHandle, reference: &SecretReference) -> ResolutionResult<ResolvedSecret> {
    if handle.kind() != reference.kind() {
        return Err(ResolutionError::StoreAccess {
            reference: reference.to_string(),
            message: format!("a {} cannot resolve {} references", handle.kind(), reference.kind()),
        });
    }

    let store = handle.store();
    match store.retrieve(&reference.store_key()) {
        Ok(value) => Ok(ResolvedSecret {
            value,
            source: store.name().to_string(),
        }),
        Err(SecretStoreError::NotFound(_)) => Err(ResolutionError::SecretNotFound {
            reference: reference.to_string(),
        }),
        Err(e) => Err(ResolutionError::StoreAccess {
            reference: reference.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Resolve `reference` with whichever handle matches its kind
pub fn resolve_with(handles: &StoreHandles, reference: &SecretReference) -> ResolutionResult<ResolvedSecret> {
    let handle = handles.get(reference.kind()).ok_or_else(|| ResolutionError::StoreAccess {
        reference: reference.to_string(),
        message: format!("no {} is initialized", reference.kind()),
    })?;
    resolve(handle, reference)
}

/// Every stored key paired with the reference string that resolves to it
///
/// Keys no reference can address, such as vault keys that are not
/// `block::attribute`, are skipped.
pub fn list_references(handle: &StoreHandle) -> ResolutionResult<Vec<(String, String)>> {
    let keys = handle.store().list().map_err(|e| ResolutionError::StoreAccess {
        reference: handle.kind().to_string(),
        message: e.to_string(),
    })?;

    let Some(grammar) = GRAMMARS.iter().find(|g| g.kind() == handle.kind()) else {
        return Ok(Vec::new());
    };

    Ok(keys
        .into_iter()
        .filter_map(|key| {
            let reference = grammar.reference_for_key(&key)?;
            Some((key, reference))
        })
        .collect())
}
