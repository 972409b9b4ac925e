//! The process-wide configuration table

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

/// Mutable key/value table of system properties
///
/// The host owns the table and hands it to the activator, which rewrites
/// the values of reference-shaped entries in place. Reads take a shared
/// lock; [`SystemProperties::update`] holds the exclusive lock for a whole
/// batch of writes so no reader sees a half-applied batch.
#[derive(Debug, Default)]
pub struct SystemProperties {
    entries: RwLock<HashMap<String, String>>,
}

impl SystemProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from key/value pairs
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Seed a table from the process environment
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn from_process_env() -> Self {
        Self::with_entries(std::env::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        }))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    /// Set a property, returning the previous value
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.write().insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.write().remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Sorted copy of every entry
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Copy of every value, in no particular order
    pub fn values(&self) -> Vec<String> {
        self.entries.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` with exclusive access to the entries
    pub fn update<R>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> R) -> R {
        f(&mut self.entries.write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_remove() {
        let props = SystemProperties::new();
        assert!(props.is_empty());

        assert_eq!(props.set("db.password", "CS:db"), None);
        assert_eq!(props.set("db.password", "clear"), Some("CS:db".to_string()));
        assert_eq!(props.get("db.password"), Some("clear".to_string()));
        assert!(props.contains_key("db.password"));

        assert_eq!(props.remove("db.password"), Some("clear".to_string()));
        assert_eq!(props.get("db.password"), None);
    }

    #[test]
    fn test_snapshot_is_sorted_copy() {
        let props = SystemProperties::with_entries([("b", "2"), ("a", "1")]);
        let snapshot = props.snapshot();
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["a", "b"]);

        props.set("a", "changed");
        assert_eq!(snapshot["a"], "1");
    }

    #[test]
    fn test_update_batches_writes() {
        let props = SystemProperties::with_entries([("a", "1"), ("b", "2")]);
        let changed = props.update(|entries| {
            let mut changed = 0;
            for value in entries.values_mut() {
                value.push('!');
                changed += 1;
            }
            changed
        });

        assert_eq!(changed, 2);
        assert_eq!(props.get("a"), Some("1!".to_string()));
        assert_eq!(props.get("b"), Some("2!".to_string()));
    }

    #[test]
    fn test_from_process_env() {
        std::env::set_var("PROPGUARD_TEST_PROPERTY_SEED", "seeded");
        let props = SystemProperties::from_process_env();
        assert_eq!(props.get("PROPGUARD_TEST_PROPERTY_SEED"), Some("seeded".to_string()));
        std::env::remove_var("PROPGUARD_TEST_PROPERTY_SEED");
    }
}
