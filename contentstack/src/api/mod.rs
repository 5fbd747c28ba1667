//! Contentstack Management API client

pub mod client;
pub mod common;
pub mod environments;
pub mod error;
pub mod global_fields;
pub mod locales;

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
pub(crate) mod test_helpers;

pub use client::{Client, ClientConfig};
pub use error::ApiError;
