//! Local host driver
//!
//! Stands in for the external scheduler: invokes a handler, and while it
//! answers `InProgress` waits for the hinted delay and reinvokes it with the
//! returned continuation state. The loop is bounded by an invocation budget.

use std::time::Duration;

use anyhow::Result;

use crate::crudcrud::http::RemoteClient;
use crate::resource::{dispatch, HandlerRequest, OperationOutcome, ProgressEvent, UnicornHandler};

/// Default invocation budget for a single drive
pub const DEFAULT_MAX_INVOCATIONS: u32 = 30;

#[derive(Debug, Clone)]
pub struct DriveOptions {
    pub max_invocations: u32,
    /// Replaces the handler's delay hint (tests, impatient humans)
    pub delay_override: Option<Duration>,
}

impl Default for DriveOptions {
    fn default() -> Self {
        Self {
            max_invocations: DEFAULT_MAX_INVOCATIONS,
            delay_override: None,
        }
    }
}

/// Drive `request` to a terminal outcome.
///
/// Every event, including intermediate `InProgress` ones, is passed to
/// `on_event`. Exhausting the budget while still in progress is an error.
pub async fn drive<C, F>(
    handler: &UnicornHandler<C>,
    mut request: HandlerRequest,
    options: &DriveOptions,
    mut on_event: F,
) -> Result<OperationOutcome>
where
    C: RemoteClient,
    F: FnMut(u32, &ProgressEvent),
{
    if request.client_request_token.is_none() {
        request.client_request_token = Some(uuid::Uuid::new_v4().to_string());
    }

    let max_invocations = options.max_invocations.max(1);
    let mut invocation = 0;

    loop {
        invocation += 1;
        let outcome = dispatch(handler, &request).await;
        on_event(invocation, &ProgressEvent::from(&outcome));

        let delay = match &outcome {
            OperationOutcome::InProgress { delay, .. } => *delay,
            _ => return Ok(outcome),
        };

        if invocation >= max_invocations {
            anyhow::bail!(
                "{:?} still in progress after {} invocations",
                request.action,
                invocation
            );
        }

        let wait = options.delay_override.unwrap_or(delay);
        tracing::info!(
            "Invocation {} in progress, reinvoking in {:?}",
            invocation,
            wait
        );
        request.resume_from(&outcome);
        tokio::time::sleep(wait).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crudcrud::mock::MockRemote;
    use crate::resource::{Action, OperationStatus, ResourceModel};
    use reqwest::Method;
    use serde_json::json;

    fn fast(max_invocations: u32) -> DriveOptions {
        DriveOptions {
            max_invocations,
            delay_override: Some(Duration::ZERO),
        }
    }

    #[tokio::test]
    async fn test_drive_create_until_stable() {
        let mock = MockRemote::new();
        mock.respond(Method::POST, "", 201, json!({"_id": "u1", "name": "a", "color": "b"}));
        // not visible for the first two probes
        mock.respond_raw(Method::GET, "/u1", 404, "")
            .respond_raw(Method::GET, "/u1", 404, "")
            .respond(Method::GET, "/u1", 200, json!({"_id": "u1", "name": "a", "color": "b"}));
        let handler = UnicornHandler::new(&mock);

        let mut statuses = Vec::new();
        let request = HandlerRequest::new(Action::Create, ResourceModel::new("a", "b"));
        let outcome = drive(&handler, request, &fast(10), |_, event| {
            statuses.push(event.status)
        })
        .await
        .unwrap();

        assert_eq!(
            outcome,
            OperationOutcome::success(
                Some(ResourceModel::new("a", "b").with_uid("u1")),
                "Create complete"
            )
        );
        assert_eq!(
            statuses,
            vec![
                OperationStatus::InProgress,
                OperationStatus::InProgress,
                OperationStatus::InProgress,
                OperationStatus::Success
            ]
        );
        assert_eq!(mock.calls_with(&Method::POST), 1);
    }

    #[tokio::test]
    async fn test_drive_gives_up_after_budget() {
        let mock = MockRemote::new();
        mock.respond(Method::POST, "", 201, json!({"_id": "u1"}));
        let handler = UnicornHandler::new(&mock);

        let mut count = 0;
        let request = HandlerRequest::new(Action::Create, ResourceModel::new("a", "b"));
        let result = drive(&handler, request, &fast(3), |n, _| count = n).await;

        assert!(result.is_err());
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_drive_returns_terminal_failure_immediately() {
        let mock = MockRemote::new();
        let handler = UnicornHandler::new(&mock);

        let request = HandlerRequest::new(Action::Create, ResourceModel::default());
        let outcome = drive(&handler, request, &fast(5), |_, _| {}).await.unwrap();

        assert_eq!(outcome.status(), OperationStatus::Failed);
        assert!(mock.calls().is_empty());
    }
}
