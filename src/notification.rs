//! Change notifications exchanged with the config service.
//!
//! A [`ChangeNotification`] pairs a namespace with its notification id
//! (the per-namespace change generation). The same shape is used both ways:
//! the client sends its last-known id for every subscribed namespace, and the
//! service answers with the ids of the namespaces that moved.

use serde::{Deserialize, Serialize};

/// Change generation for a namespace at the config service.
pub type NotificationId = i64;

/// Id sent for a namespace that was never fetched.
///
/// Older than any id the service hands out, so the first poll always
/// reports every namespace as changed.
pub const INITIAL_NOTIFICATION_ID: NotificationId = -3;

/// One namespace and its notification id.
///
/// # Example
///
/// ```
/// use apollo_sync::ChangeNotification;
///
/// let n = ChangeNotification::new("application", 42);
/// let json = serde_json::to_string(&n).unwrap();
/// assert_eq!(json, r#"{"namespaceName":"application","notificationId":42}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotification {
    pub namespace_name: String,
    #[serde(default = "initial_id")]
    pub notification_id: NotificationId,
}

fn initial_id() -> NotificationId { INITIAL_NOTIFICATION_ID }

impl ChangeNotification {
    pub fn new(namespace: impl Into<String>, notification_id: NotificationId) -> Self {
        Self {
            namespace_name: namespace.into(),
            notification_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_service_array() {
        // The service also sends a `messages` object; unknown fields are ignored
        let body = r#"[
            {"namespaceName": "app", "notificationId": 5,
             "messages": {"details": {"svc+default+app": 5}}},
            {"namespaceName": "common", "notificationId": 11}
        ]"#;
        let decoded: Vec<ChangeNotification> = serde_json::from_str(body).unwrap();
        assert_eq!(decoded, vec![
            ChangeNotification::new("app", 5),
            ChangeNotification::new("common", 11),
        ]);
    }

    #[test]
    fn test_missing_id_decodes_as_initial() {
        let decoded: ChangeNotification = serde_json::from_str(r#"{"namespaceName": "x"}"#).unwrap();
        assert_eq!(decoded.notification_id, INITIAL_NOTIFICATION_ID);
    }
}
