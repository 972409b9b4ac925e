//! The substitution pass over the property table

use std::collections::{BTreeSet, HashMap};

use secrecy::ExposeSecret;

use super::record::SubstitutionRecord;
use crate::logging::{LogLevel, Logger};
use crate::properties::SystemProperties;
use crate::reference::{self, StoreKind};
use crate::resolver::{resolve_with, ResolutionError, ResolutionResult, StoreHandles};

/// Store kinds referenced anywhere in `properties`
///
/// An empty set means there is nothing to resolve and no store needs to be
/// opened.
pub fn scan(properties: &SystemProperties) -> BTreeSet<StoreKind> {
    let values = properties.values();
    reference::detected_kinds(values.iter().map(String::as_str))
}

/// Keys whose values are secret references
pub fn reference_keys(properties: &SystemProperties) -> BTreeSet<String> {
    properties
        .snapshot()
        .into_iter()
        .filter(|(_, value)| reference::is_reference(Some(value.as_str())))
        .map(|(key, _)| key)
        .collect()
}

/// Replace every reference in `properties` with the secret it points to
///
/// Each entry is visited once under the table's write lock; log lines are
/// emitted after the lock is released. A reference whose secret is missing
/// keeps its reference string and is not recorded.
/// Any other resolution error puts back the entries already replaced in
/// this pass and is returned.
pub fn substitute(
    properties: &SystemProperties,
    handles: &StoreHandles,
    logger: &dyn Logger,
) -> ResolutionResult<SubstitutionRecord> {
    let mut lines = Vec::new();
    let result = properties.update(|entries| substitute_entries(entries, None, handles, &mut lines));
    emit(logger, lines);
    result
}

/// Like [`substitute`], but only entries under `keys` are touched
///
/// The record is then always a subset of `keys`, so redaction set up for
/// `keys` beforehand covers every value this pass writes.
pub fn substitute_keys(
    properties: &SystemProperties,
    keys: &BTreeSet<String>,
    handles: &StoreHandles,
    logger: &dyn Logger,
) -> ResolutionResult<SubstitutionRecord> {
    let mut lines = Vec::new();
    let result = properties.update(|entries| substitute_entries(entries, Some(keys), handles, &mut lines));
    emit(logger, lines);
    result
}

fn emit(logger: &dyn Logger, lines: Vec<(LogLevel, String)>) {
    for (level, line) in lines {
        logger.log(level, &line);
    }
}

fn substitute_entries(
    entries: &mut HashMap<String, String>,
    only: Option<&BTreeSet<String>>,
    handles: &StoreHandles,
    lines: &mut Vec<(LogLevel, String)>,
) -> ResolutionResult<SubstitutionRecord> {
    let mut record = SubstitutionRecord::new();
    let mut failure = None;

    for (key, value) in entries.iter_mut() {
        if only.is_some_and(|keys| !keys.contains(key)) {
            continue;
        }
        let Some(parsed) = reference::parse(value) else {
            continue;
        };

        match resolve_with(handles, &parsed) {
            Ok(secret) => {
                let original = std::mem::replace(value, secret.value.expose_secret().to_owned());
                lines.push((
                    LogLevel::Debug,
                    format!("Property '{}' resolved from {} '{}'", key, parsed.kind(), secret.source),
                ));
                record.insert(key.clone(), original);
            }
            Err(ResolutionError::SecretNotFound { reference }) => {
                lines.push((
                    LogLevel::Warn,
                    format!("Property '{}' left unresolved: no secret stored for {}", key, reference),
                ));
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    if let Some(e) = failure {
        for (key, original) in record.iter() {
            entries.insert(key.to_string(), original.to_string());
        }
        return Err(e);
    }
    Ok(record)
}
