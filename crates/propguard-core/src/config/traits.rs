//! Environment trait

use std::sync::Arc;

/// A flat source of string settings
///
/// Keys are case-sensitive. An empty value counts as absent, so
/// `KEYSTORE_PASSWORD=` in a shell does not satisfy a mandatory key.
pub trait Environment: Send + Sync {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Look up a single key
    fn get(&self, key: &str) -> Option<String>;

    /// All keys this source currently holds
    fn keys(&self) -> Vec<String>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sorted keys starting with `prefix`
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Look up a mandatory key
    fn require(&self, key: &str) -> ConfigResult<String> {
        self.get(key).ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }
}

/// Type alias for a shared environment
pub type SharedEnvironment = Arc<dyn Environment>;

/// Errors that can occur while reading store configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse environment file: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Other(String),
}

impl ConfigError {
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
