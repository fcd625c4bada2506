//! crudcrud API interaction module
//!
//! # Module Structure
//!
//! - [`http`] - the [`RemoteClient`](http::RemoteClient) seam and its reqwest implementation
//! - [`client`] - typed unicorn CRUD calls and status translation
//!
//! # Example
//!
//! ```ignore
//! use unicorn_maker::crudcrud::{client::UnicornClient, http::CrudHttpClient};
//!
//! async fn example(endpoint: url::Url) -> anyhow::Result<()> {
//!     let client = UnicornClient::new(CrudHttpClient::new(endpoint, "unicorn-maker")?);
//!     let unicorns = client.list().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
#[cfg(test)]
pub(crate) mod mock;
