//! End-to-end activation scenarios through the public API

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use propguard_core::config::MemoryEnvironment;
use propguard_core::logging::{LogLevel, MemoryLogger};
use propguard_core::secrets::unregister_memory_keystore;
use propguard_core::{
    is_reference, list_references, register_memory_keystore, register_store_backend,
    ActivationError, GuardState, MemorySecretStore, RecordingHost, SecretStore, SecretStoreError,
    SecretStoreResult, SecretsActivator, StoreConfig, StoreKind, SystemProperties,
    REDACTION_MARKER,
};
use secrecy::SecretString;

#[derive(Clone, Default)]
struct OperatorCapture(Arc<Mutex<Vec<u8>>>);

impl Write for OperatorCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl OperatorCapture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

struct Harness {
    properties: Arc<SystemProperties>,
    activator: SecretsActivator,
    host: Arc<RecordingHost>,
    logger: Arc<MemoryLogger>,
    operator: OperatorCapture,
}

fn harness(entries: &[(&str, &str)], environment: MemoryEnvironment) -> Harness {
    let properties = Arc::new(SystemProperties::with_entries(entries.iter().copied()));
    let host = Arc::new(RecordingHost::new());
    let logger = Arc::new(MemoryLogger::new());
    let operator = OperatorCapture::default();

    let activator = SecretsActivator::builder(properties.clone())
        .environment(Arc::new(environment))
        .host(host.clone())
        .logger(logger.clone())
        .operator_stream(Box::new(operator.clone()))
        .build();

    Harness {
        properties,
        activator,
        host,
        logger,
        operator,
    }
}

fn vault_environment(location: &str, password: &str) -> MemoryEnvironment {
    MemoryEnvironment::with_vars([
        ("KEYSTORE_URL", location),
        ("KEYSTORE_PASSWORD", password),
        ("KEYSTORE_ALIAS", "vault"),
        ("SALT", "Mxyzptlk"),
        ("ITERATION_COUNT", "50"),
        ("ENC_FILE_DIR", "/opt/vault/"),
        ("VAULT_BACKEND", "memory"),
    ])
}

fn credential_store_environment(location: &str, password: &str) -> MemoryEnvironment {
    MemoryEnvironment::with_vars([
        ("CREDENTIAL_STORE_PROTECTION_ALGORITHM", "masked-MD5-DES"),
        ("CREDENTIAL_STORE_PROTECTION_PARAMS", "MDkEKXNvbWVhcmJpdHJhcnljcmF6eXN0cmluZw=="),
        ("CREDENTIAL_STORE_PROTECTION", password),
        ("CREDENTIAL_STORE_ATTR_location", location),
        ("CREDENTIAL_STORE_BACKEND", "memory"),
    ])
}

#[test]
fn test_credential_store_reference_substituted_and_redacted() {
    let location = "/it/credential.store";
    register_memory_keystore(
        location,
        "9KjG1k/tizdOpyh3r2E6Hg==",
        Arc::new(MemorySecretStore::with_secrets([("key", "this is a password")])),
    );
    let h = harness(
        &[("prop", "CS:key"), ("plain", "value")],
        credential_store_environment(location, "9KjG1k/tizdOpyh3r2E6Hg=="),
    );

    h.activator.start().unwrap();

    assert_eq!(h.properties.get("prop"), Some("this is a password".to_string()));

    let runtime = h.activator.surface().runtime();
    let view = runtime.system_properties();
    assert_eq!(view["prop"], REDACTION_MARKER);
    assert_eq!(view["plain"], "value");
    assert_eq!(runtime.system_property("prop"), Some(REDACTION_MARKER.to_string()));
    assert_eq!(runtime.system_property("plain"), Some("value".to_string()));

    assert!(!h.logger.contains("this is a password"));
    assert!(!h.host.was_terminated());

    h.activator.stop();
    unregister_memory_keystore(location);
}

#[test]
fn test_vault_reference_substituted_and_redacted() {
    let location = "/it/vault.keystore";
    register_memory_keystore(
        location,
        "MASK-EdCIIJbZZAl",
        Arc::new(MemorySecretStore::with_secrets([("block1::key", "this is a password")])),
    );
    let h = harness(
        &[("prop", "VAULT::block1::key::1")],
        vault_environment(location, "MASK-EdCIIJbZZAl"),
    );

    h.activator.start().unwrap();

    assert_eq!(h.properties.get("prop"), Some("this is a password".to_string()));
    assert_eq!(
        h.activator.surface().runtime().system_properties()["prop"],
        REDACTION_MARKER
    );

    let handle = h.activator.store_handle(StoreKind::Vault).unwrap();
    assert_eq!(
        list_references(&handle).unwrap(),
        vec![("block1::key".to_string(), "VAULT::block1::key::1".to_string())]
    );

    h.activator.stop();
    unregister_memory_keystore(location);
}

#[test]
fn test_bad_keystore_password_aborts_startup() {
    let location = "/it/bad-password.keystore";
    register_memory_keystore(location, "MASK-right", Arc::new(MemorySecretStore::new()));
    let h = harness(
        &[("prop", "VAULT::block1::key::1")],
        vault_environment(location, "MASK-wrong"),
    );

    let err = h.activator.start().unwrap_err();

    let terminations = h.host.terminations();
    assert_eq!(terminations.len(), 1);
    assert!(terminations[0].starts_with("Unable to initialize vault, destroying container: "));
    assert!(h.operator.text().starts_with("\r\nUnable to initialize vault, destroying container"));
    assert!(matches!(err, ActivationError::StartupAborted { ref message } if *message == terminations[0]));
    assert_eq!(h.logger.messages_at(LogLevel::Error), terminations);

    assert_eq!(h.activator.state(), GuardState::Failed);
    assert_eq!(h.properties.get("prop"), Some("VAULT::block1::key::1".to_string()));
    assert!(!h.activator.is_filter_installed());

    unregister_memory_keystore(location);
}

#[test]
fn test_missing_credential_store_configuration_aborts_startup() {
    let h = harness(&[("prop", "CS:key")], MemoryEnvironment::new());

    assert!(h.activator.start().is_err());
    assert!(h
        .operator
        .text()
        .contains("Unable to initialize credential store, destroying container"));
    assert!(h.host.was_terminated());
}

#[test]
fn test_no_references_leaves_table_verbatim() {
    // Vault settings that point nowhere prove no store is opened
    let h = harness(
        &[("plain", "value"), ("almost", "VAULT::block1::key"), ("cs", "CS:")],
        vault_environment("/it/never-opened.keystore", "x"),
    );
    let before = h.properties.snapshot();

    h.activator.start().unwrap();

    assert_eq!(h.activator.state(), GuardState::Ready);
    assert!(!h.activator.is_filter_installed());
    assert!(h.activator.store_handle(StoreKind::Vault).is_none());
    assert_eq!(h.activator.surface().runtime().system_properties(), before);
    assert_eq!(h.properties.snapshot(), before);
    assert!(!h.host.was_terminated());
    assert!(h.operator.text().is_empty());
}

#[test]
fn test_missing_alias_left_as_reference() {
    let location = "/it/missing-alias.store";
    register_memory_keystore(
        location,
        "pw",
        Arc::new(MemorySecretStore::with_secrets([("key", "this is a password")])),
    );
    let h = harness(
        &[("found", "CS:key"), ("missing", "CS:nothere")],
        credential_store_environment(location, "pw"),
    );

    h.activator.start().unwrap();

    assert_eq!(h.properties.get("missing"), Some("CS:nothere".to_string()));
    assert!(!h.activator.substituted_keys().contains("missing"));
    assert_eq!(
        h.activator.surface().runtime().system_property("missing"),
        Some("CS:nothere".to_string())
    );
    assert!(!h.host.was_terminated());
    assert_eq!(h.logger.messages_at(LogLevel::Warn).len(), 1);

    h.activator.stop();
    unregister_memory_keystore(location);
}

#[test]
fn test_only_missing_aliases_installs_no_filter() {
    let location = "/it/all-missing.store";
    register_memory_keystore(location, "pw", Arc::new(MemorySecretStore::new()));
    let h = harness(&[("missing", "CS:nothere")], credential_store_environment(location, "pw"));

    h.activator.start().unwrap();

    assert!(h.activator.substituted_keys().is_empty());
    assert!(!h.activator.is_filter_installed());

    h.activator.stop();
    unregister_memory_keystore(location);
}

#[test]
fn test_both_kinds_in_one_table() {
    let vault_location = "/it/both.keystore";
    let cs_location = "/it/both.store";
    register_memory_keystore(
        vault_location,
        "vault-pw",
        Arc::new(MemorySecretStore::with_secrets([("db::password", "vault secret")])),
    );
    register_memory_keystore(
        cs_location,
        "cs-pw",
        Arc::new(MemorySecretStore::with_secrets([("api", "cs secret")])),
    );

    let environment = vault_environment(vault_location, "vault-pw");
    for (key, value) in [
        ("CREDENTIAL_STORE_PROTECTION_TYPE", "clear"),
        ("CREDENTIAL_STORE_PROTECTION", "cs-pw"),
        ("CREDENTIAL_STORE_ATTR_location", cs_location),
        ("CREDENTIAL_STORE_BACKEND", "memory"),
    ] {
        environment.set(key, value);
    }

    let h = harness(
        &[("db", "VAULT::db::password::1"), ("api", "CS:api")],
        environment,
    );
    h.activator.start().unwrap();

    assert_eq!(h.properties.get("db"), Some("vault secret".to_string()));
    assert_eq!(h.properties.get("api"), Some("cs secret".to_string()));
    assert_eq!(h.activator.substituted_keys().len(), 2);

    h.activator.stop();
    unregister_memory_keystore(vault_location);
    unregister_memory_keystore(cs_location);
}

#[test]
fn test_stop_restores_references_and_view() {
    let location = "/it/stop.store";
    register_memory_keystore(
        location,
        "pw",
        Arc::new(MemorySecretStore::with_secrets([("key", "this is a password")])),
    );
    let h = harness(&[("prop", "CS:key")], credential_store_environment(location, "pw"));
    let original_view = h.activator.surface().runtime();

    h.activator.start().unwrap();
    h.activator.stop();

    assert_eq!(h.properties.get("prop"), Some("CS:key".to_string()));
    assert!(is_reference(h.properties.get("prop").as_deref()));
    assert!(Arc::ptr_eq(&h.activator.surface().runtime(), &original_view));
    assert_eq!(h.activator.state(), GuardState::NotStarted);

    // Restart resolves the reverted reference again
    h.activator.start().unwrap();
    assert_eq!(h.properties.get("prop"), Some("this is a password".to_string()));
    h.activator.stop();

    unregister_memory_keystore(location);
}

/// Opens fine but fails every read
struct UnreadableStore;

impl SecretStore for UnreadableStore {
    fn name(&self) -> &str {
        "unreadable"
    }

    fn retrieve(&self, _key: &str) -> SecretStoreResult<SecretString> {
        Err(SecretStoreError::Other("store file is corrupt".to_string()))
    }

    fn store(&self, _key: &str, _secret: SecretString) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }

    fn remove(&self, _key: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }

    fn list(&self) -> SecretStoreResult<Vec<String>> {
        Ok(Vec::new())
    }
}

#[test]
fn test_store_read_failure_aborts_startup() {
    register_store_backend(
        "it-unreadable",
        "Fails every read",
        Arc::new(|_config: &StoreConfig| Ok(Arc::new(UnreadableStore) as Arc<dyn SecretStore>)),
    );
    let environment = MemoryEnvironment::with_vars([
        ("CREDENTIAL_STORE_PROTECTION_TYPE", "clear"),
        ("CREDENTIAL_STORE_PROTECTION", "pw"),
        ("CREDENTIAL_STORE_ATTR_location", "/it/unreadable.store"),
        ("CREDENTIAL_STORE_BACKEND", "it-unreadable"),
    ]);
    let h = harness(&[("a", "CS:first"), ("b", "CS:second"), ("plain", "value")], environment);
    let before = h.properties.snapshot();

    let err = h.activator.start().unwrap_err();

    let terminations = h.host.terminations();
    assert_eq!(terminations.len(), 1);
    assert!(terminations[0].starts_with("Unable to initialize credential store, destroying container: "));
    assert!(terminations[0].contains("store file is corrupt"));
    assert!(matches!(err, ActivationError::StartupAborted { ref message } if *message == terminations[0]));
    assert!(h.operator.text().starts_with("\r\nUnable to initialize credential store"));

    assert_eq!(h.activator.state(), GuardState::Failed);
    assert_eq!(h.properties.snapshot(), before);
    assert!(!h.activator.is_filter_installed());
    assert!(h.activator.substituted_keys().is_empty());
}
