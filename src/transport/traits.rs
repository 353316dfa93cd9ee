use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::environment::Configuration;
use crate::notification::ChangeNotification;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request to {url} did not complete: {message}")]
    Request { url: String, message: String },
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Malformed response body from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),
}

/// Outcome of a request that completed with an expected status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    /// 200 with a usable body
    Body(T),
    /// 304, or a 200 whose body carries nothing newer than the client has
    NotModified,
}

/// Query for the namespaces that changed since the given notification ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationQuery {
    pub app_id: String,
    pub cluster: String,
    /// One entry per subscribed namespace, in subscription order
    pub notifications: Vec<ChangeNotification>,
}

/// Query for the current configuration of one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigQuery {
    pub app_id: String,
    pub cluster: String,
    pub namespace: String,
    /// Gray-release address, empty when unset
    pub ip: String,
    /// Cache hint, empty to force a full response
    pub release_key: String,
}

/// Decoded body of a namespace fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPayload {
    #[serde(default)]
    pub release_key: Option<String>,
    /// Missing on the wire is treated as an empty map
    #[serde(default)]
    pub configurations: Configuration,
}

#[async_trait]
pub trait ConfigTransport: Send + Sync {
    /// Ask which namespaces changed. An empty `Body` means nothing changed.
    async fn notifications(
        &self,
        query: &NotificationQuery,
    ) -> Result<Reply<Vec<ChangeNotification>>, TransportError>;

    /// Fetch one namespace, honouring the release-key cache hint.
    async fn configs(&self, query: &ConfigQuery) -> Result<Reply<ConfigPayload>, TransportError>;
}
