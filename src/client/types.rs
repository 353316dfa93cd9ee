//! Public types for the client coordinator.

use thiserror::Error;

use crate::snapshot::SnapshotError;
use crate::transport::traits::TransportError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    /// Raised by callers that need every namespace; cycles themselves
    /// only list failures in [`CycleReport::failed`]
    #[error("Fetch failed for namespace(s): {}", .0.join(", "))]
    FetchFailed(Vec<String>),
}

/// Which entry point ran a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    /// Changed namespaces only, driven by change detection
    Incremental,
    /// Every subscribed namespace, cache hints ignored
    Full,
}

impl CycleKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incremental => "incremental",
            Self::Full => "full",
        }
    }
}

impl std::fmt::Display for CycleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a completed cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub kind: CycleKind,
    /// Namespaces scheduled for fetch (after ordering/filtering)
    pub scheduled: usize,
    /// Namespaces whose configuration was replaced
    pub updated: Vec<String>,
    /// Namespaces the service reported as not modified
    pub unchanged: Vec<String>,
    /// Namespaces whose fetch failed; they keep stale data and ids
    pub failed: Vec<String>,
    /// Keys in the merged snapshot (0 if nothing was merged)
    pub merged_keys: usize,
    /// Whether a snapshot file was written
    pub written: bool,
}

impl CycleReport {
    #[must_use]
    pub fn new(kind: CycleKind) -> Self {
        Self {
            kind,
            scheduled: 0,
            updated: Vec::new(),
            unchanged: Vec::new(),
            failed: Vec::new(),
            merged_keys: 0,
            written: false,
        }
    }

    /// True if no namespace fetch failed
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_kind_display() {
        assert_eq!(format!("{}", CycleKind::Incremental), "incremental");
        assert_eq!(format!("{}", CycleKind::Full), "full");
    }

    #[test]
    fn test_report_is_complete() {
        let mut report = CycleReport::new(CycleKind::Incremental);
        assert!(report.is_complete());
        assert!(!report.written);

        report.failed.push("app".into());
        assert!(!report.is_complete());
    }

    #[test]
    fn test_error_display_is_transparent() {
        let err: ClientError = TransportError::InvalidUrl("x".into()).into();
        assert_eq!(err.to_string(), "Invalid URL 'x'");
    }

    #[test]
    fn test_fetch_failed_lists_namespaces() {
        let err = ClientError::FetchFailed(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Fetch failed for namespace(s): a, b");
    }
}
