//! HTTP transport for the crudcrud REST API

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Content type sent with every request that carries a body
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut cut = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Failure to get any response out of the remote API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be built (bad URL, bad body)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The request was sent but no response came back
    #[error("network failure: {0}")]
    Network(String),
}

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Reason phrase for the status, empty when the code is non-standard
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }
}

/// Capability to issue one request against the remote collection.
///
/// `path` is relative to the collection endpoint: `""` addresses the
/// collection itself, `"/<id>"` a single record. Implementations never
/// retry; every call is exactly one exchange.
pub trait RemoteClient: Send + Sync {
    fn request<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        body: Option<&'a Value>,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>>;
}

impl<T: RemoteClient + ?Sized> RemoteClient for Arc<T> {
    fn request<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        body: Option<&'a Value>,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        (**self).request(method, path, body)
    }
}

impl<T: RemoteClient + ?Sized> RemoteClient for &T {
    fn request<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        body: Option<&'a Value>,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        (**self).request(method, path, body)
    }
}

/// reqwest-backed client for one crudcrud collection
#[derive(Clone)]
pub struct CrudHttpClient {
    client: Client,
    endpoint: Url,
}

impl CrudHttpClient {
    /// Create a new HTTP client for the given collection endpoint
    pub fn new(endpoint: Url, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, endpoint })
    }

    /// Absolute URL for a collection-relative path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.as_str().trim_end_matches('/'), path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<RawResponse, TransportError> {
        let url = self.url_for(path);
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header(ACCEPT, "application/json");

        if let Some(body) = body {
            let encoded = serde_json::to_vec(body)
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
            request = request.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(encoded);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                TransportError::InvalidRequest(e.to_string())
            } else {
                TransportError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            tracing::debug!("API error: {} - {}", status, sanitize_for_log(&body));
        }

        Ok(RawResponse { status, body })
    }
}

impl RemoteClient for CrudHttpClient {
    fn request<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        body: Option<&'a Value>,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        Box::pin(self.send(method, path, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> CrudHttpClient {
        CrudHttpClient::new(Url::parse(endpoint).unwrap(), "unicorn-maker/test").unwrap()
    }

    #[test]
    fn test_url_for_joins_without_double_slash() {
        let c = client("https://crudcrud.com/api/abc/unicorns/");
        assert_eq!(c.url_for(""), "https://crudcrud.com/api/abc/unicorns");
        assert_eq!(c.url_for("/42"), "https://crudcrud.com/api/abc/unicorns/42");
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("500 bytes total"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc"), "abc");
    }

    #[test]
    fn test_reason_for_non_standard_status_is_empty() {
        let resp = RawResponse::new(StatusCode::from_u16(599).unwrap(), "");
        assert_eq!(resp.reason(), "");
        let resp = RawResponse::new(StatusCode::NOT_FOUND, "");
        assert_eq!(resp.reason(), "Not Found");
    }
}
