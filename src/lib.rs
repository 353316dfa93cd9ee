//! # Apollo Sync
//!
//! A polling client for Apollo-style, namespace-based configuration services.
//! It asks the service which namespaces changed, fetches them, deduplicates
//! keys across namespaces and writes a flat `key=value` snapshot file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Change Detection                       │
//! │  • One query for all subscribed namespaces                 │
//! │  • Never-fetched namespaces sent at notification id -3      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                   (ordered by subscription priority)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Namespace Fetch                         │
//! │  • Release key sent as cache hint                          │
//! │  • Wholesale replace in the environment store              │
//! │  • Failed namespaces keep stale data and ids               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                   (whole store, every cycle)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Merge + Snapshot                         │
//! │  • Each key kept under its highest-priority namespace      │
//! │  • Sorted, byte-reproducible output                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apollo_sync::{ApolloClient, ApolloClientConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ApolloClientConfig::new(
//!         "http://apollo.local:8080",
//!         "billing",
//!         vec!["common".into(), "application".into()],
//!     );
//!     let client = ApolloClient::new(config).expect("valid config");
//!
//!     // Unconditional first sync
//!     client.pull_all("./config/app.env").await;
//!
//!     // Then one incremental cycle per call; the caller picks the cadence
//!     if client.run_cycle("./config/app.env").await {
//!         println!("snapshot updated");
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`]: the [`ApolloClient`] coordinating one cycle at a time
//! - [`transport`]: the [`ConfigTransport`] seam, HTTP and in-memory backends
//! - [`merge`]: key deduplication across namespaces
//! - [`snapshot`]: rendering and writing the snapshot file
//! - [`poller`]: optional polling loop with backoff and shutdown
//! - [`resilience`]: retry helpers

pub mod config;
pub mod notification;
pub mod tracker;
pub mod environment;
pub mod transport;
pub mod detector;
pub mod orderer;
pub mod fetcher;
pub mod merge;
pub mod snapshot;
pub mod client;
pub mod poller;
pub mod resilience;
pub mod metrics;

pub use config::ApolloClientConfig;
pub use notification::{ChangeNotification, NotificationId, INITIAL_NOTIFICATION_ID};
pub use tracker::VersionTracker;
pub use environment::{Configuration, EnvironmentStore};
pub use transport::traits::{ConfigPayload, ConfigQuery, ConfigTransport, NotificationQuery, Reply, TransportError};
pub use transport::http::HttpTransport;
pub use transport::memory::MemoryTransport;
pub use detector::{ChangeDetector, ChangeSet};
pub use orderer::order_notifications;
pub use fetcher::{ConfigurationFetcher, FetchMode, FetchOutcome};
pub use merge::{merge, MergedSnapshot, Section};
pub use snapshot::{render, SnapshotError, SnapshotWriter};
pub use client::{ApolloClient, ClientError, CycleKind, CycleReport};
pub use poller::{Poller, PollerStats};
pub use resilience::retry::RetryConfig;
pub use metrics::LatencyTimer;
