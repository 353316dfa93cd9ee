// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Apollo client coordinator.
//!
//! The [`ApolloClient`] owns the per-namespace version state and the
//! accumulated configurations, and ties the components together:
//!
//! ```text
//! ChangeDetector → order_notifications → ConfigurationFetcher → merge → SnapshotWriter
//! ```
//!
//! # Concurrency
//!
//! All mutable state sits behind one async mutex held for the whole cycle, so
//! at most one cycle is in flight per client and accessors always see a
//! consistent copy. No lock is needed by callers.
//!
//! # Example
//!
//! ```rust,no_run
//! use apollo_sync::{ApolloClient, ApolloClientConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), apollo_sync::ClientError> {
//! let config = ApolloClientConfig::new(
//!     "http://apollo.local:8080",
//!     "billing",
//!     vec!["common".into(), "application".into()],
//! );
//! let client = ApolloClient::new(config)?;
//!
//! // First full sync, then incremental cycles
//! client.pull_all("/etc/billing/app.env").await;
//! if client.run_cycle("/etc/billing/app.env").await {
//!     println!("config changed");
//! }
//! # Ok(())
//! # }
//! ```

mod types;
mod cycle;

pub use types::{ClientError, CycleKind, CycleReport};

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::config::ApolloClientConfig;
use crate::detector::ChangeDetector;
use crate::environment::EnvironmentStore;
use crate::fetcher::ConfigurationFetcher;
use crate::merge::{merge, MergedSnapshot};
use crate::notification::NotificationId;
use crate::tracker::VersionTracker;
use crate::transport::http::HttpTransport;
use crate::transport::traits::ConfigTransport;

/// State mutated by cycles; only touched with the client's lock held.
#[derive(Debug, Default)]
struct ClientState {
    versions: VersionTracker,
    environments: EnvironmentStore,
}

pub struct ApolloClient {
    config: ApolloClientConfig,
    transport: Arc<dyn ConfigTransport>,
    state: Mutex<ClientState>,
}

impl ApolloClient {
    /// Create a client talking HTTP to `config.server`.
    pub fn new(config: ApolloClientConfig) -> Result<Self, ClientError> {
        config.validate().map_err(ClientError::InvalidConfig)?;
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over any transport.
    pub fn with_transport(
        config: ApolloClientConfig,
        transport: Arc<dyn ConfigTransport>,
    ) -> Result<Self, ClientError> {
        config.validate().map_err(ClientError::InvalidConfig)?;
        info!(
            app_id = %config.app_id,
            cluster = %config.cluster,
            namespaces = config.namespaces.len(),
            "Apollo client created"
        );
        Ok(Self {
            config,
            transport,
            state: Mutex::new(ClientState::default()),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ApolloClientConfig {
        &self.config
    }

    /// Subscribed namespaces in priority order (lowest first).
    #[must_use]
    pub fn namespaces(&self) -> &[String] {
        &self.config.namespaces
    }

    /// Copy of the accumulated per-namespace configurations.
    pub async fn environments(&self) -> EnvironmentStore {
        self.state.lock().await.environments.clone()
    }

    /// Last release key per namespace.
    pub async fn release_keys(&self) -> BTreeMap<String, String> {
        self.state.lock().await.versions.release_keys().clone()
    }

    /// Last confirmed notification id per namespace.
    pub async fn notification_ids(&self) -> BTreeMap<String, NotificationId> {
        self.state.lock().await.versions.notification_ids().clone()
    }

    /// Merge the current store without writing anything.
    pub async fn snapshot(&self) -> MergedSnapshot {
        let state = self.state.lock().await;
        merge(&state.environments, &self.config.namespaces)
    }

    fn detector(&self) -> ChangeDetector<'_> {
        ChangeDetector::new(self.transport.as_ref(), &self.config.app_id, &self.config.cluster)
    }

    fn fetcher(&self) -> ConfigurationFetcher<'_> {
        ConfigurationFetcher::new(
            self.transport.as_ref(),
            &self.config.app_id,
            &self.config.cluster,
            &self.config.client_ip,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::MemoryTransport;

    fn config(namespaces: &[&str]) -> ApolloClientConfig {
        ApolloClientConfig::new(
            "http://apollo.test",
            "svc",
            namespaces.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = ApolloClient::new(config(&[]));
        assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_rejects_bad_server_url() {
        let result = ApolloClient::new(ApolloClientConfig::new("::nope::", "svc", vec!["a".into()]));
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }

    #[tokio::test]
    async fn test_fresh_client_has_no_state() {
        let client = ApolloClient::with_transport(config(&["a", "b"]), Arc::new(MemoryTransport::new())).unwrap();

        assert_eq!(client.namespaces(), &["a".to_string(), "b".to_string()]);
        assert!(client.environments().await.is_empty());
        assert!(client.release_keys().await.is_empty());
        assert!(client.notification_ids().await.is_empty());
        assert!(client.snapshot().await.is_empty());
    }
}
