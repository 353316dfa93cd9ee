//! Per-namespace version state.
//!
//! Tracks two independent tokens per namespace:
//! - the notification id, used to ask "what changed since I last looked"
//! - the release key, sent as a cache validator when fetching a namespace

use std::collections::BTreeMap;

use crate::notification::{ChangeNotification, NotificationId, INITIAL_NOTIFICATION_ID};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionTracker {
    notification_ids: BTreeMap<String, NotificationId>,
    release_keys: BTreeMap<String, String>,
}

impl VersionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last-known notification id, or [`INITIAL_NOTIFICATION_ID`] if never fetched.
    #[must_use]
    pub fn notification_id(&self, namespace: &str) -> NotificationId {
        self.notification_ids
            .get(namespace)
            .copied()
            .unwrap_or(INITIAL_NOTIFICATION_ID)
    }

    /// Last-known release key, or `""` if none was ever returned.
    #[must_use]
    pub fn release_key(&self, namespace: &str) -> &str {
        self.release_keys.get(namespace).map_or("", String::as_str)
    }

    pub fn set_notification_id(&mut self, namespace: &str, id: NotificationId) {
        self.notification_ids.insert(namespace.to_string(), id);
    }

    pub fn set_release_key(&mut self, namespace: &str, release_key: impl Into<String>) {
        self.release_keys.insert(namespace.to_string(), release_key.into());
    }

    /// One request entry per namespace, in the given order.
    #[must_use]
    pub fn notifications_for(&self, namespaces: &[String]) -> Vec<ChangeNotification> {
        namespaces
            .iter()
            .map(|ns| ChangeNotification::new(ns.clone(), self.notification_id(ns)))
            .collect()
    }

    #[must_use]
    pub fn notification_ids(&self) -> &BTreeMap<String, NotificationId> {
        &self.notification_ids
    }

    #[must_use]
    pub fn release_keys(&self) -> &BTreeMap<String, String> {
        &self.release_keys
    }
}
