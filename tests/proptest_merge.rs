//! Property-based tests for namespace merging and snapshot rendering.
//!
//! Uses proptest to generate random stores and priority orders and checks the
//! dedup and determinism guarantees hold for all of them.
//!
//! Run with: `cargo test --test proptest_merge`

use std::collections::HashSet;

use proptest::prelude::*;

use apollo_sync::{merge, render, Configuration, EnvironmentStore};

const NAMESPACES: [&str; 5] = ["common", "infra", "team", "app", "local"];

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Small key alphabet so collisions between namespaces are common
fn configuration_strategy() -> impl Strategy<Value = Configuration> {
    prop::collection::btree_map("[a-f](\\.[a-c])?", "[a-z0-9]{0,6}", 0..8)
}

/// Store holding a random subset of the namespaces
fn store_entries_strategy() -> impl Strategy<Value = Vec<(String, Configuration)>> {
    prop::collection::vec(
        (prop::sample::select(NAMESPACES.to_vec()), configuration_strategy()),
        0..8,
    )
    .prop_map(|entries| {
        // Last write per namespace wins, like repeated fetches
        let mut seen = HashSet::new();
        let mut deduped: Vec<(String, Configuration)> = entries
            .into_iter()
            .rev()
            .filter(|(ns, _)| seen.insert(*ns))
            .map(|(ns, cfg)| (ns.to_string(), cfg))
            .collect();
        deduped.reverse();
        deduped
    })
}

fn priority_strategy() -> impl Strategy<Value = Vec<String>> {
    Just(NAMESPACES.iter().map(|s| s.to_string()).collect::<Vec<_>>()).prop_shuffle()
}

fn build_store(entries: &[(String, Configuration)]) -> EnvironmentStore {
    entries.iter().cloned().collect()
}

// =============================================================================
// Dedup Invariant Tests
// =============================================================================

proptest! {
    /// Every key appears once, under the last namespace in priority order
    /// that defines it, with that namespace's value
    #[test]
    fn prop_key_owned_by_highest_priority_namespace(
        entries in store_entries_strategy(),
        priority in priority_strategy(),
    ) {
        let store = build_store(&entries);
        let snapshot = merge(&store, &priority);

        let mut seen = HashSet::new();
        for section in snapshot.sections() {
            for key in section.entries.keys() {
                prop_assert!(seen.insert(key.clone()), "key {} appears twice", key);
            }
        }

        for (_, configuration) in store.iter() {
            for key in configuration.keys() {
                let expected = priority
                    .iter()
                    .rev()
                    .find(|ns| store.get(ns).is_some_and(|c| c.contains_key(key)))
                    .unwrap();
                prop_assert_eq!(snapshot.owner_of(key), Some(expected.as_str()));
                prop_assert_eq!(
                    snapshot.section(expected).and_then(|c| c.get(key)),
                    store.get(expected).and_then(|c| c.get(key))
                );
            }
        }
    }

    /// One section per stored namespace, in priority order
    #[test]
    fn prop_sections_follow_priority(
        entries in store_entries_strategy(),
        priority in priority_strategy(),
    ) {
        let store = build_store(&entries);
        let snapshot = merge(&store, &priority);

        let names: Vec<&str> = snapshot.sections().iter().map(|s| s.namespace.as_str()).collect();
        let expected: Vec<&str> = priority
            .iter()
            .filter(|ns| store.contains(ns))
            .map(String::as_str)
            .collect();
        prop_assert_eq!(names, expected);
    }

    /// Merged key count equals the number of distinct keys in the store
    #[test]
    fn prop_key_count_is_distinct_keys(
        entries in store_entries_strategy(),
        priority in priority_strategy(),
    ) {
        let store = build_store(&entries);
        let snapshot = merge(&store, &priority);

        let distinct: HashSet<&String> = store.iter().flat_map(|(_, c)| c.keys()).collect();
        prop_assert_eq!(snapshot.key_count(), distinct.len());
    }
}

// =============================================================================
// Determinism Tests
// =============================================================================

proptest! {
    /// Same store and priority always render the same bytes, whatever the
    /// order the store was filled in
    #[test]
    fn prop_render_is_deterministic(
        entries in store_entries_strategy(),
        priority in priority_strategy(),
    ) {
        let store = build_store(&entries);
        let mut reversed_entries = entries.clone();
        reversed_entries.reverse();
        let reversed = build_store(&reversed_entries);

        let first = render(&merge(&store, &priority));
        let second = render(&merge(&store, &priority));
        let third = render(&merge(&reversed, &priority));

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &third);
    }

    /// Rendered output has one header per section, one line per key and a
    /// blank separator between sections
    #[test]
    fn prop_render_line_count(
        entries in store_entries_strategy(),
        priority in priority_strategy(),
    ) {
        let store = build_store(&entries);
        let snapshot = merge(&store, &priority);
        let rendered = render(&snapshot);

        let lines: Vec<&str> = rendered.lines().collect();
        let headers = lines.iter().filter(|l| l.starts_with("##### ")).count();
        let pairs = lines.iter().filter(|l| l.contains('=') && !l.starts_with("##### ")).count();
        let blanks = lines.iter().filter(|l| l.is_empty()).count();

        prop_assert_eq!(headers, snapshot.len());
        prop_assert_eq!(pairs, snapshot.key_count());
        prop_assert_eq!(blanks, snapshot.len().saturating_sub(1));
    }

    /// Keys inside each section are rendered in sorted order
    #[test]
    fn prop_section_keys_sorted(
        entries in store_entries_strategy(),
        priority in priority_strategy(),
    ) {
        let rendered = render(&merge(&build_store(&entries), &priority));

        for block in rendered.split("\n\n") {
            let keys: Vec<&str> = block
                .lines()
                .skip(1)
                .filter_map(|l| l.split_once('=').map(|(k, _)| k))
                .collect();
            let mut sorted = keys.clone();
            sorted.sort_unstable();
            prop_assert_eq!(keys, sorted);
        }
    }
}
