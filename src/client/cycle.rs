//! Poll-and-reconcile cycles.
//!
//! Two entry points, each with a `bool` and a detailed form:
//! - [`run_cycle`](ApolloClient::run_cycle) / [`poll_changes`](ApolloClient::poll_changes):
//!   fetch only what change detection reports
//! - [`pull_all`](ApolloClient::pull_all) / [`full_sync`](ApolloClient::full_sync):
//!   fetch every subscribed namespace, ignoring cache hints
//!
//! Both merge the full accumulated store and overwrite the snapshot file.
//! A namespace that fails to fetch is skipped; the cycle goes on without it.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::detector::ChangeSet;
use crate::fetcher::{FetchMode, FetchOutcome};
use crate::merge::merge;
use crate::orderer::order_notifications;
use crate::snapshot::SnapshotWriter;

use super::{ApolloClient, ClientError, ClientState, CycleKind, CycleReport};

impl ApolloClient {
    /// Run one incremental cycle. Returns `true` only if a snapshot was written.
    ///
    /// `false` covers "nothing changed", "nothing ever fetched", and failures
    /// of change detection or of the write; details are logged.
    pub async fn run_cycle(&self, path: impl AsRef<Path>) -> bool {
        match self.poll_changes(path).await {
            Ok(report) => report.written,
            Err(_) => false,
        }
    }

    /// Fetch every subscribed namespace and write. Returns `true` if written.
    pub async fn pull_all(&self, path: impl AsRef<Path>) -> bool {
        match self.full_sync(path).await {
            Ok(report) => report.written,
            Err(_) => false,
        }
    }

    /// Incremental cycle with a detailed report.
    ///
    /// Returns `Ok` with `written == false` when the service reports no change
    /// or nothing has ever been fetched. A reported change that names no
    /// subscribed namespace still rewrites the snapshot from the store.
    /// Errors only for change detection or write failures.
    #[tracing::instrument(skip_all, fields(kind = "incremental"))]
    pub async fn poll_changes(&self, path: impl AsRef<Path>) -> Result<CycleReport, ClientError> {
        let start = Instant::now();
        let kind = CycleKind::Incremental;
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let changes = match self.detector().detect(&self.config.namespaces, &state.versions).await {
            Ok(ChangeSet::Changed(changes)) => changes,
            Ok(ChangeSet::NoChange) => {
                debug!("No namespace changed");
                crate::metrics::record_changed_namespaces(0);
                crate::metrics::record_cycle(kind.as_str(), "no_change");
                return Ok(CycleReport::new(kind));
            }
            Err(e) => {
                warn!(error = %e, "Change detection failed");
                crate::metrics::record_error("notifications", "transport");
                crate::metrics::record_cycle(kind.as_str(), "failed");
                return Err(e.into());
            }
        };

        let ordered = order_notifications(&self.config.namespaces, changes);
        crate::metrics::record_changed_namespaces(ordered.len());
        if ordered.is_empty() {
            debug!("Reported changes name no subscribed namespace");
        }

        let mut report = CycleReport::new(kind);
        report.scheduled = ordered.len();

        let fetcher = self.fetcher();
        for notification in &ordered {
            let outcome = fetcher
                .fetch_changed(notification, &mut state.versions, &mut state.environments)
                .await;
            tally(&mut report, &notification.namespace_name, outcome.ok());
        }

        self.reconcile(state, path.as_ref(), report, start).await
    }

    /// Full cycle with a detailed report.
    ///
    /// Notification ids are not advanced; the next incremental cycle may
    /// therefore re-fetch namespaces that this pull already brought up to date.
    #[tracing::instrument(skip_all, fields(kind = "full"))]
    pub async fn full_sync(&self, path: impl AsRef<Path>) -> Result<CycleReport, ClientError> {
        let start = Instant::now();
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let mut report = CycleReport::new(CycleKind::Full);
        report.scheduled = self.config.namespaces.len();

        let fetcher = self.fetcher();
        for namespace in &self.config.namespaces {
            let outcome = fetcher
                .fetch(namespace, FetchMode::Bypass, &mut state.versions, &mut state.environments)
                .await;
            tally(&mut report, namespace, outcome.ok());
        }

        self.reconcile(state, path.as_ref(), report, start).await
    }

    /// Merge the whole store and write it, unless nothing was ever fetched.
    async fn reconcile(
        &self,
        state: &ClientState,
        path: &Path,
        mut report: CycleReport,
        start: Instant,
    ) -> Result<CycleReport, ClientError> {
        let kind = report.kind.as_str();

        if state.environments.is_empty() {
            debug!("Nothing fetched yet, skipping snapshot");
            crate::metrics::record_cycle(kind, "empty");
            return Ok(report);
        }

        let snapshot = merge(&state.environments, &self.config.namespaces);
        report.merged_keys = snapshot.key_count();
        crate::metrics::set_merged_keys(report.merged_keys);

        if let Err(e) = SnapshotWriter::new(path).write(&snapshot).await {
            crate::metrics::record_cycle(kind, "failed");
            return Err(e.into());
        }
        report.written = true;

        crate::metrics::record_cycle(kind, "written");
        crate::metrics::record_cycle_duration(kind, start.elapsed());
        info!(
            path = %path.display(),
            updated = report.updated.len(),
            unchanged = report.unchanged.len(),
            failed = report.failed.len(),
            keys = report.merged_keys,
            "Snapshot reconciled"
        );
        Ok(report)
    }
}

fn tally(report: &mut CycleReport, namespace: &str, outcome: Option<FetchOutcome>) {
    let bucket = match outcome {
        Some(FetchOutcome::Updated { .. }) => &mut report.updated,
        Some(FetchOutcome::Unchanged) => &mut report.unchanged,
        None => &mut report.failed,
    };
    bucket.push(namespace.to_string());
}
