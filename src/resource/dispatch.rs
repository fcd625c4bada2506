//! Request Dispatch
//!
//! Maps a host handler request onto the matching [`UnicornHandler`] method.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::Instrument;

use super::handlers::UnicornHandler;
use super::model::ResourceModel;
use super::progress::{CallbackContext, OperationOutcome, ProgressEvent};
use crate::crudcrud::http::RemoteClient;

/// Lifecycle action requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
}

/// One handler invocation as sent by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRequest {
    pub action: Action,
    #[serde(default)]
    pub desired_resource_state: ResourceModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_resource_state: Option<ResourceModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_context: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_request_token: Option<String>,
}

impl HandlerRequest {
    pub fn new(action: Action, desired: ResourceModel) -> Self {
        Self {
            action,
            desired_resource_state: desired,
            previous_resource_state: None,
            callback_context: None,
            client_request_token: None,
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse handler request JSON")
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse handler request YAML")
    }

    /// Parse by file extension; anything other than .yaml/.yml is JSON
    pub fn parse(content: &str, path: Option<&Path>) -> Result<Self> {
        let is_yaml = path
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        if is_yaml {
            Self::from_yaml(content)
        } else {
            Self::from_json(content)
        }
    }

    /// Load a request from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?;
        Self::parse(&content, Some(path))
    }

    pub fn continuation(&self) -> Option<CallbackContext> {
        CallbackContext::from_map(self.callback_context.as_ref())
    }

    /// Carry an in-progress outcome into the next invocation
    pub fn resume_from(&mut self, outcome: &OperationOutcome) {
        if let OperationOutcome::InProgress { context, model, .. } = outcome {
            self.callback_context = Some(context.to_map());
            self.desired_resource_state = model.clone();
        }
    }
}

/// Invoke the handler for `request.action`
pub async fn dispatch<C: RemoteClient>(
    handler: &UnicornHandler<C>,
    request: &HandlerRequest,
) -> OperationOutcome {
    let span = tracing::info_span!(
        "handler",
        action = ?request.action,
        token = request.client_request_token.as_deref().unwrap_or("-")
    );

    async {
        let context = request.continuation();
        let previous = request.previous_resource_state.as_ref();
        let desired = &request.desired_resource_state;
        tracing::debug!("{:?} request, continuation={:?}", request.action, context);

        let outcome = match request.action {
            Action::Create => handler.create(context, previous, desired).await,
            Action::Read => handler.read(context, previous, desired).await,
            Action::Update => handler.update(context, previous, desired).await,
            Action::Delete => handler.delete(context, previous, desired).await,
            Action::List => handler.list(context, previous, desired).await,
        };

        tracing::info!(
            "{:?} -> {:?} {}",
            request.action,
            outcome.status(),
            outcome.message()
        );
        outcome
    }
    .instrument(span)
    .await
}

/// Dispatch and render the host progress event
pub async fn invoke<C: RemoteClient>(
    handler: &UnicornHandler<C>,
    request: &HandlerRequest,
) -> ProgressEvent {
    ProgressEvent::from(&dispatch(handler, request).await)
}
