// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Background polling loop.
//!
//! The client runs one cycle per call; [`Poller`] supplies cadence, backoff
//! and shutdown on top:
//!
//! 1. Full sync, retried with [`RetryConfig::startup()`] until every
//!    namespace fetched (gives up after the retries and carries on)
//! 2. Incremental cycles every `poll_interval`, backing off with
//!    [`RetryConfig::daemon()`] delays while cycles fail
//! 3. Stops when the shutdown watch flips to `true` or its sender is dropped
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use apollo_sync::{ApolloClient, ApolloClientConfig, Poller};
//! use tokio::sync::watch;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), apollo_sync::ClientError> {
//! let config = ApolloClientConfig::new("http://apollo.local:8080", "billing", vec!["application".into()]);
//! let client = Arc::new(ApolloClient::new(config)?);
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let poller = Poller::new(client, "/etc/billing/app.env");
//! let handle = tokio::spawn(async move { poller.run(shutdown_rx).await });
//!
//! // ... later
//! let _ = shutdown_tx.send(true);
//! let stats = handle.await.unwrap();
//! println!("{} snapshots written", stats.written);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::{ApolloClient, ClientError, CycleReport};
use crate::resilience::retry::{retry, RetryConfig};

/// Counters returned when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerStats {
    /// Cycles run, including the initial full sync
    pub cycles: u64,
    /// Cycles that wrote a snapshot
    pub written: u64,
    /// Cycles that returned an error
    pub failures: u64,
}

pub struct Poller {
    client: Arc<ApolloClient>,
    path: PathBuf,
    interval: Duration,
    startup: RetryConfig,
    backoff: RetryConfig,
}

impl Poller {
    /// Poll into `path` at the client's configured interval.
    pub fn new(client: Arc<ApolloClient>, path: impl Into<PathBuf>) -> Self {
        let interval = client.config().poll_interval();
        Self {
            client,
            path: path.into(),
            interval,
            startup: RetryConfig::startup(),
            backoff: RetryConfig::daemon(),
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Retry policy for the initial full sync.
    #[must_use]
    pub fn with_startup_retry(mut self, startup: RetryConfig) -> Self {
        self.startup = startup;
        self
    }

    /// Backoff between failing incremental cycles.
    #[must_use]
    pub fn with_backoff(mut self, backoff: RetryConfig) -> Self {
        self.backoff = backoff;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full sync, retried until every namespace came back.
    pub async fn initial_sync(&self) -> Result<CycleReport, ClientError> {
        let client = &self.client;
        let path = &self.path;
        retry("initial full sync", &self.startup, || async move {
            let report = client.full_sync(path).await?;
            if report.is_complete() {
                Ok(report)
            } else {
                Err(ClientError::FetchFailed(report.failed))
            }
        })
        .await
    }

    /// Run until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> PollerStats {
        let mut stats = PollerStats::default();
        if *shutdown.borrow() {
            return stats;
        }

        info!(path = %self.path.display(), interval = ?self.interval, "Poller starting");
        stats.cycles += 1;
        match self.initial_sync().await {
            Ok(report) => {
                if report.written {
                    stats.written += 1;
                }
            }
            Err(e) => {
                stats.failures += 1;
                warn!(error = %e, "Initial full sync incomplete, continuing with incremental polls");
            }
        }

        let mut delay = self.interval;
        let mut failure_delay = self.backoff.initial_delay;

        loop {
            if unless_shutdown(tokio::time::sleep(delay), &mut shutdown).await.is_none() {
                break;
            }
            let Some(result) = unless_shutdown(self.client.poll_changes(&self.path), &mut shutdown).await else {
                break;
            };

            stats.cycles += 1;
            match result {
                Ok(report) => {
                    if report.written {
                        stats.written += 1;
                    }
                    debug!(written = report.written, updated = report.updated.len(), "Poll cycle done");
                    delay = self.interval;
                    failure_delay = self.backoff.initial_delay;
                }
                Err(e) => {
                    stats.failures += 1;
                    warn!(error = %e, retry_in = ?failure_delay, "Poll cycle failed");
                    delay = failure_delay;
                    failure_delay = self.backoff.next_delay(failure_delay);
                }
            }
        }

        info!(
            cycles = stats.cycles,
            written = stats.written,
            failures = stats.failures,
            "Poller stopped"
        );
        stats
    }
}

/// Drive `future` to completion unless shutdown is signalled first. Wakeups
/// that leave the flag at `false` do not interrupt it.
async fn unless_shutdown<F: Future>(future: F, shutdown: &mut watch::Receiver<bool>) -> Option<F::Output> {
    tokio::pin!(future);
    loop {
        tokio::select! {
            output = &mut future => return Some(output),
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return None;
                }
            }
        }
    }
}
