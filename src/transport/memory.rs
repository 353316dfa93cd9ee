//! In-process stand-in for the config service.
//!
//! Behaves like the real service closely enough to drive full cycles in tests
//! and demos: publishing a namespace bumps its notification id and release
//! key, change queries report namespaces whose id moved past the client's, and
//! a fetch carrying the current release key answers `NotModified`.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::environment::Configuration;
use crate::notification::{ChangeNotification, NotificationId};
use super::traits::{ConfigPayload, ConfigQuery, ConfigTransport, NotificationQuery, Reply, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedNamespace {
    pub notification_id: NotificationId,
    pub release_key: String,
    pub configurations: Configuration,
}

/// A query as received by [`MemoryTransport`], for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceivedQuery {
    Notifications(NotificationQuery),
    Configs(ConfigQuery),
}

pub struct MemoryTransport {
    namespaces: DashMap<String, PublishedNamespace>,
    last_id: AtomicI64,
    received: Mutex<Vec<ReceivedQuery>>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            namespaces: DashMap::new(),
            last_id: AtomicI64::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Publish a new release of `namespace`, returning its notification id.
    pub fn publish<K, V>(&self, namespace: &str, configurations: impl IntoIterator<Item = (K, V)>) -> NotificationId
    where
        K: Into<String>,
        V: Into<String>,
    {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let configurations = configurations
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.namespaces.insert(namespace.to_string(), PublishedNamespace {
            notification_id: id,
            release_key: format!("release-{}", id),
            configurations,
        });
        id
    }

    #[must_use]
    pub fn published(&self, namespace: &str) -> Option<PublishedNamespace> {
        self.namespaces.get(namespace).map(|r| r.value().clone())
    }

    /// All queries received so far, oldest first.
    #[must_use]
    pub fn received(&self) -> Vec<ReceivedQuery> {
        self.received.lock().clone()
    }

    /// Namespaces fetched so far, oldest first.
    #[must_use]
    pub fn fetched_namespaces(&self) -> Vec<String> {
        self.received
            .lock()
            .iter()
            .filter_map(|q| match q {
                ReceivedQuery::Configs(c) => Some(c.namespace.clone()),
                ReceivedQuery::Notifications(_) => None,
            })
            .collect()
    }

    pub fn clear_received(&self) {
        self.received.lock().clear();
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigTransport for MemoryTransport {
    async fn notifications(
        &self,
        query: &NotificationQuery,
    ) -> Result<Reply<Vec<ChangeNotification>>, TransportError> {
        self.received.lock().push(ReceivedQuery::Notifications(query.clone()));

        let changed: Vec<ChangeNotification> = query
            .notifications
            .iter()
            .filter_map(|n| {
                let published = self.namespaces.get(&n.namespace_name)?;
                (published.notification_id > n.notification_id)
                    .then(|| ChangeNotification::new(n.namespace_name.clone(), published.notification_id))
            })
            .collect();

        if changed.is_empty() {
            Ok(Reply::NotModified)
        } else {
            Ok(Reply::Body(changed))
        }
    }

    async fn configs(&self, query: &ConfigQuery) -> Result<Reply<ConfigPayload>, TransportError> {
        self.received.lock().push(ReceivedQuery::Configs(query.clone()));

        let Some(published) = self.namespaces.get(&query.namespace) else {
            return Err(TransportError::Status {
                status: 404,
                url: format!("memory://configs/{}/{}/{}", query.app_id, query.cluster, query.namespace),
            });
        };

        if !query.release_key.is_empty() && query.release_key == published.release_key {
            return Ok(Reply::NotModified);
        }
        Ok(Reply::Body(ConfigPayload {
            release_key: Some(published.release_key.clone()),
            configurations: published.configurations.clone(),
        }))
    }
}
