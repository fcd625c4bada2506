//! Resource provider for `Brianterry::Unicorn::Maker`.
//!
//! Lifecycle handlers (create, read, update, delete, list) backed by a
//! crudcrud REST collection. Create returns `InProgress` and is reinvoked by
//! the host until the new record is observable.

pub mod config;
pub mod crudcrud;
pub mod host;
pub mod resource;

/// Version injected at compile time via UNICORN_MAKER_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("UNICORN_MAKER_VERSION") {
    Some(v) => v,
    None => "dev",
};
