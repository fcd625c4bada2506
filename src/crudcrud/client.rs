//! crudcrud client
//!
//! Typed unicorn CRUD calls on top of a [`RemoteClient`]. Each method is
//! exactly one HTTP exchange.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::http::{sanitize_for_log, RawResponse, RemoteClient, TransportError};
use crate::resource::model::Unicorn;

/// Build the collection endpoint for a crudcrud API id
pub fn endpoint_for_api_id(api_id: &str) -> String {
    format!(
        "https://crudcrud.com/api/{}/unicorns",
        urlencoding::encode(api_id)
    )
}

/// Collection-relative path of a single record
pub fn item_path(uid: &str) -> String {
    format!("/{}", urlencoding::encode(uid))
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Resource {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Failed to parse response JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Response is missing the record identifier")]
    MissingIdentifier,
    #[error("crudcrud.com error {status} {reason}")]
    Status { status: u16, reason: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Unicorn collection client
#[derive(Clone)]
pub struct UnicornClient<C> {
    http: C,
}

impl<C: RemoteClient> UnicornClient<C> {
    pub fn new(http: C) -> Self {
        Self { http }
    }

    /// Fetch one unicorn
    pub async fn get(&self, uid: &str) -> ClientResult<Unicorn> {
        let response = self.http.request(Method::GET, &item_path(uid), None).await?;
        let body = check_response(response, uid)?;
        decode(&body)
    }

    /// Create a unicorn; returns the record echoed by the server
    pub async fn create(&self, unicorn: &Unicorn) -> ClientResult<Unicorn> {
        let body = serde_json::to_value(unicorn).map_err(ClientError::Encode)?;
        let response = self.http.request(Method::POST, "", Some(&body)).await?;
        let body = check_response(response, "")?;
        let created: Unicorn = decode(&body)?;
        if created.id.is_empty() {
            return Err(ClientError::MissingIdentifier);
        }
        Ok(created)
    }

    /// Replace a unicorn. crudcrud answers with an empty body.
    pub async fn update(&self, uid: &str, unicorn: &Unicorn) -> ClientResult<()> {
        let mut unicorn = unicorn.clone();
        unicorn.id.clear();
        let body = serde_json::to_value(&unicorn).map_err(ClientError::Encode)?;
        let response = self
            .http
            .request(Method::PUT, &item_path(uid), Some(&body))
            .await?;
        check_response(response, uid)?;
        Ok(())
    }

    pub async fn delete(&self, uid: &str) -> ClientResult<()> {
        let response = self
            .http
            .request(Method::DELETE, &item_path(uid), None)
            .await?;
        check_response(response, uid)?;
        Ok(())
    }

    /// List the whole collection. An empty body or `null` is an empty list.
    pub async fn list(&self) -> ClientResult<Vec<Unicorn>> {
        let response = self.http.request(Method::GET, "", None).await?;
        let body = check_response(response, "")?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let items: Option<Vec<Unicorn>> = decode(&body)?;
        Ok(items.unwrap_or_default())
    }
}

/// Translate the status line; 404 (and 400 for malformed ids) never reach
/// the body parser.
fn check_response(response: RawResponse, uid: &str) -> ClientResult<String> {
    match response.status {
        StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => {
            Err(ClientError::NotFound(uid.to_string()))
        }
        status if status.is_success() => {
            tracing::trace!("HTTP response {}", sanitize_for_log(&response.body));
            Ok(response.body)
        }
        status => {
            tracing::error!(
                "API error: {} - {}",
                status,
                sanitize_for_log(&response.body)
            );
            Err(ClientError::Status {
                status: status.as_u16(),
                reason: response.reason().to_string(),
            })
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> ClientResult<T> {
    serde_json::from_str(body).map_err(ClientError::Decode)
}
