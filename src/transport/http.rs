// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! HTTP transport for the Apollo config service.
//!
//! Endpoints:
//! - `GET {server}/notifications/v2?appId=&cluster=&notifications=<json>`
//! - `GET {server}/configs/{appId}/{cluster}/{namespace}?ip=&releaseKey=`
//!
//! Status handling is the same for both: `200` decodes the body, `304` is
//! [`Reply::NotModified`], anything else is [`TransportError::Status`].

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::config::ApolloClientConfig;
use crate::notification::ChangeNotification;
use super::traits::{ConfigPayload, ConfigQuery, ConfigTransport, NotificationQuery, Reply, TransportError};

const JSON: &str = "application/json";

pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    /// Build a transport for `config.server` with the configured timeouts.
    pub fn new(config: &ApolloClientConfig) -> Result<Self, TransportError> {
        let base_url = config.server.trim().trim_end_matches('/').to_string();
        // Reject unusable base URLs up front rather than on the first poll
        parse_base(&base_url)?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TransportError::Request {
                url: base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { base_url, client })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn notifications_url(&self) -> Result<Url, TransportError> {
        endpoint(&self.base_url, &["notifications", "v2"])
    }

    pub fn configs_url(&self, app_id: &str, cluster: &str, namespace: &str) -> Result<Url, TransportError> {
        endpoint(&self.base_url, &["configs", app_id, cluster, namespace])
    }

    async fn get(&self, url: Url, query: &[(&str, &str)]) -> Result<(u16, Vec<u8>), TransportError> {
        let target = url.to_string();
        let response = self
            .client
            .get(url)
            .query(query)
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: target.clone(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| TransportError::Request {
            url: target.clone(),
            message: e.to_string(),
        })?;
        debug!(url = %target, status, bytes = body.len(), "Config service responded");
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl ConfigTransport for HttpTransport {
    async fn notifications(
        &self,
        query: &NotificationQuery,
    ) -> Result<Reply<Vec<ChangeNotification>>, TransportError> {
        let url = self.notifications_url()?;
        let target = url.to_string();
        let notifications = serde_json::to_string(&query.notifications).map_err(|e| TransportError::Decode {
            url: target.clone(),
            message: e.to_string(),
        })?;

        let (status, body) = self
            .get(url, &[
                ("appId", query.app_id.as_str()),
                ("cluster", query.cluster.as_str()),
                ("notifications", notifications.as_str()),
            ])
            .await?;
        decode_notifications(&target, status, &body)
    }

    async fn configs(&self, query: &ConfigQuery) -> Result<Reply<ConfigPayload>, TransportError> {
        let url = self.configs_url(&query.app_id, &query.cluster, &query.namespace)?;
        let target = url.to_string();

        let (status, body) = self
            .get(url, &[
                ("ip", query.ip.as_str()),
                ("releaseKey", query.release_key.as_str()),
            ])
            .await?;
        decode_configs(&target, status, &body)
    }
}

fn parse_base(base_url: &str) -> Result<Url, TransportError> {
    let url = Url::parse(base_url).map_err(|_| TransportError::InvalidUrl(base_url.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(TransportError::InvalidUrl(base_url.to_string()));
    }
    Ok(url)
}

/// Append percent-encoded path segments to the base URL.
fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, TransportError> {
    let mut url = parse_base(base_url)?;
    url.path_segments_mut()
        .map_err(|()| TransportError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Parse a 200 body; `None` for an empty body or JSON `null`.
fn parse_body(url: &str, body: &[u8]) -> Result<Option<Value>, TransportError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: Value = serde_json::from_slice(body).map_err(|e| TransportError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    Ok(if value.is_null() { None } else { Some(value) })
}

pub(crate) fn decode_notifications(
    url: &str,
    status: u16,
    body: &[u8],
) -> Result<Reply<Vec<ChangeNotification>>, TransportError> {
    match status {
        200 => match parse_body(url, body)? {
            None => Ok(Reply::Body(Vec::new())),
            Some(value) => serde_json::from_value(value)
                .map(Reply::Body)
                .map_err(|e| TransportError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                }),
        },
        304 => Ok(Reply::NotModified),
        status => Err(TransportError::Status { status, url: url.to_string() }),
    }
}

pub(crate) fn decode_configs(url: &str, status: u16, body: &[u8]) -> Result<Reply<ConfigPayload>, TransportError> {
    match status {
        200 => match parse_body(url, body)? {
            None => Ok(Reply::NotModified),
            Some(Value::Object(map)) if map.is_empty() => Ok(Reply::NotModified),
            Some(value) => serde_json::from_value(value)
                .map(Reply::Body)
                .map_err(|e| TransportError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                }),
        },
        304 => Ok(Reply::NotModified),
        status => Err(TransportError::Status { status, url: url.to_string() }),
    }
}
