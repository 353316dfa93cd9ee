// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for the Apollo client.
//!
//! # Example
//!
//! ```
//! use apollo_sync::ApolloClientConfig;
//!
//! // Minimal config (cluster and client ip use defaults)
//! let config = ApolloClientConfig::new(
//!     "http://apollo.local:8080",
//!     "billing",
//!     vec!["common".into(), "application".into()],
//! );
//! assert_eq!(config.cluster, "default");
//! assert_eq!(config.client_ip, "");
//!
//! // Gray-release targeting on a named cluster
//! let config = config.with_cluster("shanghai").with_client_ip("10.0.0.7");
//! assert!(config.validate().is_ok());
//! ```

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

/// Cluster used when none is configured.
pub const DEFAULT_CLUSTER: &str = "default";

/// Configuration for an [`ApolloClient`](crate::ApolloClient).
///
/// `server`, `app_id` and `namespaces` are required. The order of
/// `namespaces` is the merge priority: later entries win on key collision.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApolloClientConfig {
    /// Config service base URL (e.g., "http://apollo.local:8080")
    pub server: String,

    /// Application id registered at the config service
    #[serde(alias = "appId")]
    pub app_id: String,

    /// Subscribed namespaces, lowest priority first
    pub namespaces: Vec<String>,

    /// Cluster name (default: "default")
    #[serde(default = "default_cluster")]
    pub cluster: String,

    /// Address reported for gray-release targeting (default: empty)
    #[serde(default, alias = "clientIp")]
    pub client_ip: String,

    /// HTTP connect timeout
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// HTTP request timeout. Must outlast the service's long-poll hold (~60s).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Pause between cycles when driven by [`Poller`](crate::Poller)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_cluster() -> String { DEFAULT_CLUSTER.to_string() }
fn default_connect_timeout_ms() -> u64 { 5_000 }
fn default_request_timeout_ms() -> u64 { 90_000 }
fn default_poll_interval_ms() -> u64 { 1_000 }

impl ApolloClientConfig {
    /// Create a config with the required fields; everything else defaults.
    pub fn new(server: impl Into<String>, app_id: impl Into<String>, namespaces: Vec<String>) -> Self {
        Self {
            server: server.into(),
            app_id: app_id.into(),
            namespaces,
            cluster: default_cluster(),
            client_ip: String::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }

    /// Set the cluster name.
    #[must_use]
    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = cluster.into();
        self
    }

    /// Set the client ip sent for gray-release targeting.
    #[must_use]
    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = ip.into();
        self
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Check the config for values the client cannot work with.
    ///
    /// Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.trim().is_empty() {
            return Err("server must not be empty".to_string());
        }
        if self.app_id.trim().is_empty() {
            return Err("app_id must not be empty".to_string());
        }
        if self.cluster.trim().is_empty() {
            return Err("cluster must not be empty".to_string());
        }
        if self.namespaces.is_empty() {
            return Err("at least one namespace is required".to_string());
        }

        // Duplicates would make the priority order ambiguous
        let mut seen = HashSet::with_capacity(self.namespaces.len());
        for namespace in &self.namespaces {
            if namespace.trim().is_empty() {
                return Err("namespace names must not be empty".to_string());
            }
            if !seen.insert(namespace.as_str()) {
                return Err(format!("namespace '{}' is subscribed more than once", namespace));
            }
        }
        Ok(())
    }
}
