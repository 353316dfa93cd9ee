// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Key deduplication across namespaces.
//!
//! Collapses the per-namespace store into a [`MergedSnapshot`] where every key
//! appears under exactly one namespace: the highest-priority one that defines
//! it. Priority is the subscription order, later entries winning.
//!
//! # Algorithm
//!
//! ```text
//! for namespace in priority order:
//!     for (key, value) in store[namespace]:
//!         if owner[key] is an earlier namespace n0:
//!             remove key from result[n0]
//!         owner[key] = namespace
//!         result[namespace][key] = value
//! ```
//!
//! Namespaces whose keys were all displaced keep an empty section. Namespaces
//! missing from the store (never fetched) get no section.
//!
//! # Example
//!
//! ```
//! use apollo_sync::{merge, EnvironmentStore, Configuration};
//!
//! let cfg = |k: &str, v: &str| Configuration::from([(k.to_string(), v.to_string())]);
//! let store: EnvironmentStore = vec![("a", cfg("x", "1")), ("b", cfg("x", "2"))]
//!     .into_iter()
//!     .collect();
//!
//! let snapshot = merge(&store, &["a".to_string(), "b".to_string()]);
//! assert_eq!(snapshot.owner_of("x"), Some("b"));
//! assert!(snapshot.section("a").unwrap().is_empty());
//! ```

use std::collections::{HashMap, HashSet};

use crate::environment::{Configuration, EnvironmentStore};

/// One namespace's share of the merged output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub namespace: String,
    pub entries: Configuration,
}

impl Section {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Namespace-ordered sections with pairwise disjoint keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedSnapshot {
    sections: Vec<Section>,
}

impl MergedSnapshot {
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Entries kept for `namespace`, `None` if it has no section.
    #[must_use]
    pub fn section(&self, namespace: &str) -> Option<&Configuration> {
        self.sections
            .iter()
            .find(|s| s.namespace == namespace)
            .map(|s| &s.entries)
    }

    /// Namespace that owns `key` after dedup.
    #[must_use]
    pub fn owner_of(&self, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.entries.contains_key(key))
            .map(|s| s.namespace.as_str())
    }

    /// Total keys across sections; each key counted once.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.sections.iter().map(Section::len).sum()
    }

    /// Number of sections
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Merge `store` by `priority` order. Pure: the same inputs always produce the
/// same snapshot.
#[must_use]
pub fn merge(store: &EnvironmentStore, priority: &[String]) -> MergedSnapshot {
    let mut owner: HashMap<&str, usize> = HashMap::new();
    let mut sections: Vec<Section> = Vec::with_capacity(priority.len());
    let mut seen: HashSet<&str> = HashSet::with_capacity(priority.len());
    let mut displaced = 0usize;

    for namespace in priority {
        if !seen.insert(namespace.as_str()) {
            continue;
        }
        let Some(configuration) = store.get(namespace) else {
            continue;
        };

        let index = sections.len();
        sections.push(Section {
            namespace: namespace.clone(),
            entries: Configuration::new(),
        });

        for (key, value) in configuration {
            if let Some(previous) = owner.insert(key.as_str(), index) {
                if previous != index {
                    sections[previous].entries.remove(key);
                    displaced += 1;
                }
            }
            sections[index].entries.insert(key.clone(), value.clone());
        }
    }

    crate::metrics::record_displaced_keys(displaced);
    MergedSnapshot { sections }
}
