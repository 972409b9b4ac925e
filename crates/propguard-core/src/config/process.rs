//! Process environment variables

use std::env;

use super::traits::Environment;

/// Environment backed by the process environment variables
///
/// Read-only; names and values that are not valid unicode are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl ProcessEnvironment {
    pub fn new() -> Self {
        Self
    }
}

impl Environment for ProcessEnvironment {
    fn name(&self) -> &str {
        "process"
    }

    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn keys(&self) -> Vec<String> {
        env::vars_os()
            .filter_map(|(k, _)| k.into_string().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_environment_reads_vars() {
        env::set_var("PROPGUARD_TEST_PROCESS_ENV", "value");
        let environment = ProcessEnvironment::new();

        assert_eq!(environment.get("PROPGUARD_TEST_PROCESS_ENV"), Some("value".to_string()));
        assert!(environment
            .keys_with_prefix("PROPGUARD_TEST_PROCESS")
            .contains(&"PROPGUARD_TEST_PROCESS_ENV".to_string()));

        env::remove_var("PROPGUARD_TEST_PROCESS_ENV");
    }

    #[test]
    fn test_process_environment_empty_is_absent() {
        env::set_var("PROPGUARD_TEST_EMPTY_ENV", "");
        let environment = ProcessEnvironment::new();

        assert!(!environment.contains("PROPGUARD_TEST_EMPTY_ENV"));
        assert!(environment.require("PROPGUARD_TEST_EMPTY_ENV").is_err());

        env::remove_var("PROPGUARD_TEST_EMPTY_ENV");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_variables_do_not_panic() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        env::set_var("PROPGUARD_TEST_NON_UNICODE", OsStr::from_bytes(b"\xff\xfe"));
        env::set_var("PROPGUARD_TEST_UNICODE", "ok");
        env::set_var(OsStr::from_bytes(b"PROPGUARD_TEST_\xff"), "name");
        let environment = ProcessEnvironment::new();

        let keys = environment.keys_with_prefix("PROPGUARD_TEST_");
        assert!(keys.contains(&"PROPGUARD_TEST_UNICODE".to_string()));
        assert!(keys.contains(&"PROPGUARD_TEST_NON_UNICODE".to_string()));
        assert!(keys.iter().all(|k| k.is_ascii()));
        assert_eq!(environment.get("PROPGUARD_TEST_NON_UNICODE"), None);

        env::remove_var("PROPGUARD_TEST_NON_UNICODE");
        env::remove_var("PROPGUARD_TEST_UNICODE");
        env::remove_var(OsStr::from_bytes(b"PROPGUARD_TEST_\xff"));
    }
}
