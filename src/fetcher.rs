//! Per-namespace configuration fetch.
//!
//! A fetch only mutates client state after the service confirmed a result:
//! - `Body`: the namespace configuration is replaced wholesale and the
//!   release key updated when the response carries one
//! - `NotModified`: stored configuration is left alone
//! - transport error: nothing is touched, so the namespace is re-requested on
//!   the next poll

use tracing::{debug, warn};

use crate::environment::EnvironmentStore;
use crate::notification::ChangeNotification;
use crate::tracker::VersionTracker;
use crate::transport::traits::{ConfigQuery, ConfigTransport, Reply, TransportError};

/// Whether the last-known release key is sent as a cache hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Send the release key; the service may answer "not modified"
    Cached,
    /// Send an empty release key to force a full response
    Bypass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Stored configuration was replaced
    Updated { keys: usize },
    /// Service had nothing newer; stored configuration kept
    Unchanged,
}

pub struct ConfigurationFetcher<'a> {
    transport: &'a dyn ConfigTransport,
    app_id: &'a str,
    cluster: &'a str,
    client_ip: &'a str,
}

impl<'a> ConfigurationFetcher<'a> {
    pub fn new(
        transport: &'a dyn ConfigTransport,
        app_id: &'a str,
        cluster: &'a str,
        client_ip: &'a str,
    ) -> Self {
        Self { transport, app_id, cluster, client_ip }
    }

    #[must_use]
    pub fn build_query(&self, namespace: &str, release_key: &str) -> ConfigQuery {
        ConfigQuery {
            app_id: self.app_id.to_string(),
            cluster: self.cluster.to_string(),
            namespace: namespace.to_string(),
            ip: self.client_ip.to_string(),
            release_key: release_key.to_string(),
        }
    }

    /// Fetch `namespace` and apply the result to `versions` and `store`.
    ///
    /// Does not touch notification ids; see [`fetch_changed`](Self::fetch_changed).
    pub async fn fetch(
        &self,
        namespace: &str,
        mode: FetchMode,
        versions: &mut VersionTracker,
        store: &mut EnvironmentStore,
    ) -> Result<FetchOutcome, TransportError> {
        let release_key = match mode {
            FetchMode::Cached => versions.release_key(namespace),
            FetchMode::Bypass => "",
        };
        let query = self.build_query(namespace, release_key);

        let reply = {
            let _timer = crate::metrics::LatencyTimer::new("configs");
            self.transport.configs(&query).await
        };

        match reply {
            Ok(Reply::Body(payload)) => {
                if let Some(release_key) = payload.release_key {
                    versions.set_release_key(namespace, release_key);
                }
                let keys = payload.configurations.len();
                store.replace(namespace, payload.configurations);
                debug!(namespace = %namespace, keys, "Namespace configuration updated");
                crate::metrics::record_fetch(namespace, "updated");
                crate::metrics::set_namespace_keys(namespace, keys);
                Ok(FetchOutcome::Updated { keys })
            }
            Ok(Reply::NotModified) => {
                debug!(namespace = %namespace, "Namespace not modified");
                crate::metrics::record_fetch(namespace, "unchanged");
                Ok(FetchOutcome::Unchanged)
            }
            Err(e) => {
                warn!(namespace = %namespace, error = %e, "Namespace fetch failed");
                crate::metrics::record_fetch(namespace, "failed");
                crate::metrics::record_error("configs", "transport");
                Err(e)
            }
        }
    }

    /// Fetch a namespace reported by change detection, advancing its
    /// notification id once the fetch is confirmed.
    ///
    /// A "not modified" answer only advances the id when the namespace already
    /// has stored configuration; otherwise it stays at its old id and will be
    /// reported again.
    pub async fn fetch_changed(
        &self,
        notification: &ChangeNotification,
        versions: &mut VersionTracker,
        store: &mut EnvironmentStore,
    ) -> Result<FetchOutcome, TransportError> {
        let namespace = notification.namespace_name.as_str();
        let outcome = self.fetch(namespace, FetchMode::Cached, versions, store).await?;

        let confirmed = match outcome {
            FetchOutcome::Updated { .. } => true,
            FetchOutcome::Unchanged => store.contains(namespace),
        };
        if confirmed {
            versions.set_notification_id(namespace, notification.notification_id);
        }
        Ok(outcome)
    }
}
