//! Accumulated namespace configurations.
//!
//! The [`EnvironmentStore`] maps each namespace to the key/value set last
//! retrieved for it. Entries are replaced wholesale on every successful fetch
//! and live for as long as the owning client. Merging always reads the whole
//! store, never just the namespaces touched by the latest cycle.

use std::collections::BTreeMap;

/// Key/value set of one namespace. Keys are unique; iteration is sorted.
pub type Configuration = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentStore {
    namespaces: BTreeMap<String, Configuration>,
}

impl EnvironmentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the configuration of `namespace`, returning the previous one.
    pub fn replace(&mut self, namespace: &str, configuration: Configuration) -> Option<Configuration> {
        self.namespaces.insert(namespace.to_string(), configuration)
    }

    #[must_use]
    pub fn get(&self, namespace: &str) -> Option<&Configuration> {
        self.namespaces.get(namespace)
    }

    #[must_use]
    pub fn contains(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    /// Number of namespaces held
    #[must_use]
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Total keys across namespaces, duplicates counted once per namespace.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Configuration)> {
        self.namespaces.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, Configuration)> for EnvironmentStore {
    fn from_iter<T: IntoIterator<Item = (S, Configuration)>>(iter: T) -> Self {
        Self {
            namespaces: iter.into_iter().map(|(ns, cfg)| (ns.into(), cfg)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(pairs: &[(&str, &str)]) -> Configuration {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = EnvironmentStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.key_count(), 0);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut store = EnvironmentStore::new();
        store.replace("app", cfg(&[("a", "1"), ("b", "2")]));

        let previous = store.replace("app", cfg(&[("c", "3")]));

        assert_eq!(previous, Some(cfg(&[("a", "1"), ("b", "2")])));
        assert_eq!(store.get("app"), Some(&cfg(&[("c", "3")])));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_key_count_spans_namespaces() {
        let store: EnvironmentStore = vec![
            ("a", cfg(&[("x", "1"), ("y", "2")])),
            ("b", cfg(&[("x", "3")])),
        ]
        .into_iter()
        .collect();

        assert_eq!(store.key_count(), 3);
        assert!(store.contains("b"));
        assert!(!store.contains("c"));
    }
}
