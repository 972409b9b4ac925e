//! Record of substituted properties

use std::collections::{BTreeMap, BTreeSet};

use crate::properties::SystemProperties;

/// Keys whose value was replaced, each with the reference it held before
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionRecord {
    originals: BTreeMap<String, String>,
}

impl SubstitutionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, original: impl Into<String>) {
        self.originals.insert(key.into(), original.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.originals.contains_key(key)
    }

    /// The reference string `key` held before substitution
    pub fn original(&self, key: &str) -> Option<&str> {
        self.originals.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> BTreeSet<String> {
        self.originals.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.originals.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Put every original reference back into `properties` and clear the record
    ///
    /// Returns how many entries were restored.
    pub fn revert(&mut self, properties: &SystemProperties) -> usize {
        let originals = std::mem::take(&mut self.originals);
        let count = originals.len();
        properties.update(|entries| entries.extend(originals));
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_tracks_originals() {
        let mut record = SubstitutionRecord::new();
        assert!(record.is_empty());

        record.insert("db.password", "CS:db");
        assert!(record.contains("db.password"));
        assert_eq!(record.original("db.password"), Some("CS:db"));
        assert_eq!(record.keys(), BTreeSet::from(["db.password".to_string()]));
    }

    #[test]
    fn test_revert_restores_and_clears() {
        let props = SystemProperties::with_entries([
            ("db.password", "this is a password"),
            ("plain", "value"),
        ]);
        let mut record = SubstitutionRecord::new();
        record.insert("db.password", "CS:db");

        assert_eq!(record.revert(&props), 1);
        assert_eq!(props.get("db.password"), Some("CS:db".to_string()));
        assert_eq!(props.get("plain"), Some("value".to_string()));
        assert!(record.is_empty());

        // A second revert has nothing left to do
        assert_eq!(record.revert(&props), 0);
    }

    #[test]
    fn test_revert_recreates_removed_key() {
        let props = SystemProperties::new();
        let mut record = SubstitutionRecord::new();
        record.insert("removed", "VAULT::block1::key::1");

        record.revert(&props);
        assert_eq!(props.get("removed"), Some("VAULT::block1::key::1".to_string()));
    }
}
