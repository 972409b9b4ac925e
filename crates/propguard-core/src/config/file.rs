//! File-based environment (YAML or JSON mapping)
//!
//! Supports a user-level file (`<config dir>/propguard/environment.yaml`)
//! and arbitrary paths. Operators keep store settings here instead of
//! exporting them into every shell.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::traits::{ConfigError, ConfigResult, Environment};

/// Environment read from a flat mapping file
///
/// ```yaml
/// KEYSTORE_URL: /opt/vault/vault.keystore
/// KEYSTORE_PASSWORD: MASK-EdCIIJbZZAl
/// ITERATION_COUNT: 50
/// ```
///
/// Scalar values (strings, numbers, booleans) are read as strings; nested
/// values are rejected. A missing file is an empty environment. Files
/// ending in `.json` are parsed as JSON, everything else as YAML.
pub struct FileEnvironment {
    path: PathBuf,
    cache: RwLock<Option<BTreeMap<String, String>>>,
}

impl FileEnvironment {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    /// The user-level environment file
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("propguard").join("environment.yaml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the file, surfacing parse errors
    ///
    /// The [`Environment`] methods swallow errors (an unreadable file looks
    /// empty), so hosts call this first when they want a hard failure.
    pub fn load(&self) -> ConfigResult<BTreeMap<String, String>> {
        let vars = self.read()?;
        *self.cache.write() = Some(vars.clone());
        Ok(vars)
    }

    /// Re-read the file on next access
    pub fn reload(&self) -> ConfigResult<BTreeMap<String, String>> {
        *self.cache.write() = None;
        self.load()
    }

    fn read(&self) -> ConfigResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let raw: BTreeMap<String, serde_yaml::Value> = if self.is_json() {
            let json: BTreeMap<String, serde_json::Value> = serde_json::from_str(&content)
                .map_err(|e| ConfigError::Parse(format!("{}: {}", self.path.display(), e)))?;
            json.into_iter()
                .map(|(k, v)| serde_yaml::to_value(v).map(|v| (k, v)))
                .collect::<Result<_, _>>()
                .map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| ConfigError::Parse(format!("{}: {}", self.path.display(), e)))?
        };

        raw.into_iter()
            .map(|(key, value)| scalar_to_string(&key, value).map(|v| (key, v)))
            .collect()
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
    }

    fn vars(&self) -> BTreeMap<String, String> {
        if let Some(vars) = self.cache.read().as_ref() {
            return vars.clone();
        }
        self.load().unwrap_or_default()
    }
}

fn scalar_to_string(key: &str, value: serde_yaml::Value) -> ConfigResult<String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(ConfigError::invalid_value(key, "<nested>", "only scalar values are supported")),
    }
}

impl Environment for FileEnvironment {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.vars().remove(key).filter(|v| !v.is_empty())
    }

    fn keys(&self) -> Vec<String> {
        self.vars().into_keys().collect()
    }
}

impl std::fmt::Debug for FileEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileEnvironment")
            .field("path", &self.path)
            .field("exists", &self.exists())
            .finish()
    }
}
