//! Change detection: which subscribed namespaces moved since the last poll.

use tracing::debug;

use crate::notification::ChangeNotification;
use crate::tracker::VersionTracker;
use crate::transport::traits::{ConfigTransport, NotificationQuery, Reply, TransportError};

/// Result of a successful change query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSet {
    /// At least one namespace changed
    Changed(Vec<ChangeNotification>),
    /// Nothing changed (304, or an empty list)
    NoChange,
}

impl ChangeSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoChange)
    }

    /// The changed notifications, empty for `NoChange`.
    #[must_use]
    pub fn into_notifications(self) -> Vec<ChangeNotification> {
        match self {
            Self::Changed(changes) => changes,
            Self::NoChange => Vec::new(),
        }
    }
}

pub struct ChangeDetector<'a> {
    transport: &'a dyn ConfigTransport,
    app_id: &'a str,
    cluster: &'a str,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(transport: &'a dyn ConfigTransport, app_id: &'a str, cluster: &'a str) -> Self {
        Self { transport, app_id, cluster }
    }

    /// One entry per subscribed namespace, never-fetched ones at the sentinel id.
    #[must_use]
    pub fn build_query(&self, namespaces: &[String], versions: &VersionTracker) -> NotificationQuery {
        NotificationQuery {
            app_id: self.app_id.to_string(),
            cluster: self.cluster.to_string(),
            notifications: versions.notifications_for(namespaces),
        }
    }

    /// Ask the service what changed. Transport failures are returned as-is;
    /// retrying is up to the caller.
    pub async fn detect(
        &self,
        namespaces: &[String],
        versions: &VersionTracker,
    ) -> Result<ChangeSet, TransportError> {
        let query = self.build_query(namespaces, versions);
        let _timer = crate::metrics::LatencyTimer::new("notifications");

        match self.transport.notifications(&query).await? {
            Reply::Body(changes) if !changes.is_empty() => {
                debug!(changed = changes.len(), "Namespaces changed");
                Ok(ChangeSet::Changed(changes))
            }
            Reply::Body(_) | Reply::NotModified => {
                debug!("No namespace changed");
                Ok(ChangeSet::NoChange)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::MemoryTransport;

    fn namespaces() -> Vec<String> {
        vec!["common".to_string(), "app".to_string()]
    }

    #[test]
    fn test_query_uses_sentinel_for_unfetched() {
        let transport = MemoryTransport::new();
        let detector = ChangeDetector::new(&transport, "svc", "default");
        let mut versions = VersionTracker::new();
        versions.set_notification_id("app", 9);

        let query = detector.build_query(&namespaces(), &versions);

        assert_eq!(query.app_id, "svc");
        assert_eq!(query.cluster, "default");
        assert_eq!(query.notifications, vec![
            ChangeNotification::new("common", -3),
            ChangeNotification::new("app", 9),
        ]);
    }

    #[tokio::test]
    async fn test_detects_changed_namespaces() {
        let transport = MemoryTransport::new();
        let id = transport.publish("app", [("k", "v")]);
        let detector = ChangeDetector::new(&transport, "svc", "default");

        let changes = detector.detect(&namespaces(), &VersionTracker::new()).await.unwrap();

        assert_eq!(changes, ChangeSet::Changed(vec![ChangeNotification::new("app", id)]));
    }

    #[tokio::test]
    async fn test_no_change_when_current() {
        let transport = MemoryTransport::new();
        let id = transport.publish("app", [("k", "v")]);
        let detector = ChangeDetector::new(&transport, "svc", "default");
        let mut versions = VersionTracker::new();
        versions.set_notification_id("app", id);

        let changes = detector.detect(&namespaces(), &versions).await.unwrap();

        assert!(changes.is_empty());
        assert!(changes.into_notifications().is_empty());
    }
}
