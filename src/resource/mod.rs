//! Resource provider layer
//!
//! # Architecture
//!
//! - [`model`] - the resource model and the crudcrud wire payload
//! - [`progress`] - handler outcomes, continuation state, host progress events
//! - [`registry`] - the embedded resource type schema
//! - [`handlers`] - create/read/update/delete/list, validation, stabilization probe
//! - [`dispatch`] - routes host handler requests to the handlers
//!
//! # Example
//!
//! ```ignore
//! use unicorn_maker::resource::{dispatch, Action, HandlerRequest, UnicornHandler};
//!
//! async fn read(handler: &UnicornHandler<CrudHttpClient>) {
//!     let request = HandlerRequest::new(Action::Read, ResourceModel::default().with_uid("5f1"));
//!     let outcome = dispatch(handler, &request).await;
//! }
//! ```

pub mod dispatch;
pub mod handlers;
pub mod model;
pub mod progress;
mod registry;

pub use dispatch::{dispatch, invoke, Action, HandlerRequest};
pub use handlers::{Stability, UnicornHandler, ValidationError};
pub use model::{ResourceModel, Unicorn};
pub use progress::{
    CallbackContext, ErrorKind, OperationOutcome, OperationStatus, ProgressEvent, CALLBACK_DELAY,
};
pub use registry::*;
