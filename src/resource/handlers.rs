//! Lifecycle handlers
//!
//! Each handler is one independent invocation: at most a probe and one
//! mutating request, no sleeping, no in-process retries. Create is the only
//! multi-invocation operation; it answers `InProgress` with a
//! [`CallbackContext::Stabilizing`] marker and is reinvoked by the host
//! until a read probe observes the record.

use thiserror::Error;

use super::model::ResourceModel;
use super::progress::{CallbackContext, ErrorKind, OperationOutcome};
use super::registry::get_schema;
use crate::crudcrud::client::{ClientError, UnicornClient};
use crate::crudcrud::http::RemoteClient;

/// Result of one stabilization probe
#[derive(Debug, Clone, PartialEq)]
pub enum Stability {
    Stable(ResourceModel),
    /// Not observable yet; the reason is only logged
    Pending(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<ValidationError> for OperationOutcome {
    fn from(error: ValidationError) -> Self {
        OperationOutcome::failed(error.kind, error.message)
    }
}

/// Handlers for `Brianterry::Unicorn::Maker`
pub struct UnicornHandler<C> {
    client: UnicornClient<C>,
}

impl<C: RemoteClient> UnicornHandler<C> {
    pub fn new(remote: C) -> Self {
        Self {
            client: UnicornClient::new(remote),
        }
    }

    pub async fn create(
        &self,
        context: Option<CallbackContext>,
        _previous: Option<&ResourceModel>,
        desired: &ResourceModel,
    ) -> OperationOutcome {
        if let Some(CallbackContext::Stabilizing) = context {
            // Any probe failure counts as "not yet stable"; the host's
            // invocation budget bounds the loop.
            return match self.is_stable(desired.identifier()).await {
                Stability::Stable(model) => {
                    tracing::info!("Unicorn {:?} is stable", model.uid);
                    OperationOutcome::success(Some(model), "Create complete")
                }
                Stability::Pending(reason) => {
                    tracing::info!("Unicorn not stable yet: {}", reason);
                    OperationOutcome::stabilizing(desired.clone())
                }
            };
        }

        if let Err(error) = self.validate(desired).await {
            tracing::info!("Create rejected: {}", error);
            return error.into();
        }

        match self.client.create(&desired.to_wire()).await {
            Ok(created) => {
                let model = ResourceModel::from(created);
                tracing::info!("Created unicorn {:?}, waiting for it to stabilize", model.uid);
                OperationOutcome::stabilizing(model)
            }
            Err(e) => {
                tracing::warn!("Create failed: {}", e);
                e.into()
            }
        }
    }

    pub async fn read(
        &self,
        _context: Option<CallbackContext>,
        _previous: Option<&ResourceModel>,
        desired: &ResourceModel,
    ) -> OperationOutcome {
        let Some(uid) = desired.identifier() else {
            return OperationOutcome::failed(ErrorKind::NotFound, "Resource not found");
        };

        match self.fetch(uid).await {
            Ok(model) => OperationOutcome::success(Some(model), "Read complete"),
            Err(e) => e.into(),
        }
    }

    pub async fn update(
        &self,
        _context: Option<CallbackContext>,
        _previous: Option<&ResourceModel>,
        desired: &ResourceModel,
    ) -> OperationOutcome {
        let Some(uid) = desired.identifier() else {
            return OperationOutcome::failed(ErrorKind::NotFound, "Resource not found");
        };
        // Only 404/400 means absent; other lookup failures keep their kind.
        if let Err(e) = self.fetch(uid).await {
            tracing::info!("Update lookup for {} failed: {}", uid, e);
            return e.into();
        }

        match self.client.update(uid, &desired.to_wire()).await {
            Ok(()) => OperationOutcome::success(Some(desired.clone()), "Update complete"),
            Err(e) => e.into(),
        }
    }

    /// Deletes unconditionally; an absent record is reported as `NotFound`.
    pub async fn delete(
        &self,
        _context: Option<CallbackContext>,
        _previous: Option<&ResourceModel>,
        desired: &ResourceModel,
    ) -> OperationOutcome {
        let Some(uid) = desired.identifier() else {
            return OperationOutcome::failed(ErrorKind::NotFound, "Resource not found");
        };

        match self.client.delete(uid).await {
            Ok(()) => OperationOutcome::success(None, "Delete complete"),
            Err(e) => e.into(),
        }
    }

    pub async fn list(
        &self,
        _context: Option<CallbackContext>,
        _previous: Option<&ResourceModel>,
        _desired: &ResourceModel,
    ) -> OperationOutcome {
        match self.client.list().await {
            Ok(unicorns) => OperationOutcome::SuccessList {
                models: unicorns.into_iter().map(ResourceModel::from).collect(),
                message: "List complete".to_string(),
            },
            Err(e) => e.into(),
        }
    }

    /// Create preconditions, first failure wins: the record must not already
    /// exist, then every required property must be present.
    pub async fn validate(&self, desired: &ResourceModel) -> Result<(), ValidationError> {
        if let Stability::Stable(existing) = self.is_stable(desired.identifier()).await {
            return Err(ValidationError {
                kind: ErrorKind::AlreadyExists,
                message: format!(
                    "Resource {} already exists",
                    existing.uid.as_deref().unwrap_or_default()
                ),
            });
        }

        let schema = get_schema();
        for property in schema.required_properties() {
            if desired.property(property).is_none() {
                return Err(ValidationError {
                    kind: ErrorKind::InvalidInput,
                    message: format!("{} required", property),
                });
            }
        }

        Ok(())
    }

    /// GET one record; the requested uid stands in when the body omits `_id`
    async fn fetch(&self, uid: &str) -> Result<ResourceModel, ClientError> {
        let mut model = ResourceModel::from(self.client.get(uid).await?);
        if model.uid.is_none() {
            model.uid = Some(uid.to_string());
        }
        Ok(model)
    }

    /// One read probe. Missing identifiers never touch the network.
    pub async fn is_stable(&self, uid: Option<&str>) -> Stability {
        let Some(uid) = uid else {
            return Stability::Pending("no identifier".to_string());
        };

        match self.fetch(uid).await {
            Ok(model) => Stability::Stable(model),
            Err(ClientError::NotFound(_)) => Stability::Pending(format!("{} not found", uid)),
            Err(e) => {
                tracing::warn!("Probe for {} failed: {}", uid, e);
                Stability::Pending(e.to_string())
            }
        }
    }
}
