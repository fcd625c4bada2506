//! Handler outcomes and the host progress event

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use super::model::ResourceModel;
use crate::crudcrud::client::ClientError;
use crate::crudcrud::http::TransportError;

/// Delay the host should wait before reinvoking a stabilizing create
pub const CALLBACK_DELAY: Duration = Duration::from_secs(60);

pub const CREATE_IN_PROGRESS_MESSAGE: &str = "Create in progress";

/// Failure classes reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    /// Create target already exists; an input error, reported with its own code
    AlreadyExists,
    NotFound,
    NetworkFailure,
    DecodeFailure,
    /// Unexpected non-2xx status from crudcrud
    ServiceFailure,
}

impl ErrorKind {
    /// CloudFormation handler error code
    pub fn handler_error_code(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "InvalidRequest",
            ErrorKind::AlreadyExists => "AlreadyExists",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::NetworkFailure => "NetworkFailure",
            ErrorKind::DecodeFailure | ErrorKind::ServiceFailure => "InternalFailure",
        }
    }

    pub fn is_invalid_input(self) -> bool {
        matches!(self, ErrorKind::InvalidInput | ErrorKind::AlreadyExists)
    }
}

impl From<&ClientError> for ErrorKind {
    fn from(error: &ClientError) -> Self {
        match error {
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::Transport(TransportError::InvalidRequest(_)) => ErrorKind::InvalidInput,
            ClientError::Transport(TransportError::Network(_)) => ErrorKind::NetworkFailure,
            ClientError::Encode(_) => ErrorKind::InvalidInput,
            ClientError::Decode(_) | ClientError::MissingIdentifier => ErrorKind::DecodeFailure,
            ClientError::Status { .. } => ErrorKind::ServiceFailure,
        }
    }
}

/// Continuation state handed back to the host and replayed on reinvocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackContext {
    /// A create request succeeded; waiting for the record to be observable
    Stabilizing,
}

impl CallbackContext {
    const STATUS_KEY: &'static str = "status";

    /// Interpret a host callback map. Absent, empty, or unrecognised maps
    /// mean this is a first invocation.
    pub fn from_map(map: Option<&Map<String, Value>>) -> Option<Self> {
        map.filter(|m| m.contains_key(Self::STATUS_KEY))
            .map(|_| CallbackContext::Stabilizing)
    }

    pub fn to_map(self) -> Map<String, Value> {
        let mut map = Map::new();
        match self {
            CallbackContext::Stabilizing => {
                map.insert(
                    Self::STATUS_KEY.to_string(),
                    Value::String("stabilizing".to_string()),
                );
            }
        }
        map
    }
}

/// The single result of one handler invocation
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    Success {
        model: Option<ResourceModel>,
        message: String,
    },
    InProgress {
        context: CallbackContext,
        delay: Duration,
        model: ResourceModel,
        message: String,
    },
    Failed {
        kind: ErrorKind,
        message: String,
    },
    SuccessList {
        models: Vec<ResourceModel>,
        message: String,
    },
}

impl OperationOutcome {
    pub fn success(model: Option<ResourceModel>, message: impl Into<String>) -> Self {
        OperationOutcome::Success {
            model,
            message: message.into(),
        }
    }

    /// Create accepted, poll again after [`CALLBACK_DELAY`]
    pub fn stabilizing(model: ResourceModel) -> Self {
        OperationOutcome::InProgress {
            context: CallbackContext::Stabilizing,
            delay: CALLBACK_DELAY,
            model,
            message: CREATE_IN_PROGRESS_MESSAGE.to_string(),
        }
    }

    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        OperationOutcome::Failed {
            kind,
            message: message.into(),
        }
    }

    pub fn status(&self) -> OperationStatus {
        match self {
            OperationOutcome::Success { .. } | OperationOutcome::SuccessList { .. } => {
                OperationStatus::Success
            }
            OperationOutcome::InProgress { .. } => OperationStatus::InProgress,
            OperationOutcome::Failed { .. } => OperationStatus::Failed,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            OperationOutcome::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            OperationOutcome::Success { message, .. }
            | OperationOutcome::InProgress { message, .. }
            | OperationOutcome::Failed { message, .. }
            | OperationOutcome::SuccessList { message, .. } => message,
        }
    }
}

impl From<ClientError> for OperationOutcome {
    fn from(error: ClientError) -> Self {
        OperationOutcome::failed(ErrorKind::from(&error), error.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    InProgress,
    Success,
    Failed,
}

/// Progress event as returned to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub status: OperationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_context: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_delay_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_model: Option<ResourceModel>,
    /// Always an array for list results, even when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_models: Option<Vec<ResourceModel>>,
}

impl From<&OperationOutcome> for ProgressEvent {
    fn from(outcome: &OperationOutcome) -> Self {
        let mut event = ProgressEvent {
            status: outcome.status(),
            error_code: None,
            message: outcome.message().to_string(),
            callback_context: None,
            callback_delay_seconds: None,
            resource_model: None,
            resource_models: None,
        };

        match outcome {
            OperationOutcome::Success { model, .. } => {
                event.resource_model = model.clone();
            }
            OperationOutcome::InProgress {
                context,
                delay,
                model,
                ..
            } => {
                event.callback_context = Some(context.to_map());
                event.callback_delay_seconds = Some(delay.as_secs());
                event.resource_model = Some(model.clone());
            }
            OperationOutcome::Failed { kind, .. } => {
                event.error_code = Some(kind.handler_error_code());
            }
            OperationOutcome::SuccessList { models, .. } => {
                event.resource_models = Some(models.clone());
            }
        }

        event
    }
}
