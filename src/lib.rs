//! # Siigo Connector
//!
//! Typed async client for the Siigo accounting API. Exchanges client
//! credentials for a bearer token, caches it until it expires, attaches it
//! with the partner id to every call, retries transient connection failures
//! and refreshes the token once when a call comes back 401.
//!
//! Modules:
//! - `config`: client configuration, retry and logging settings
//! - `cache`: bearer token cache with single-flight refresh
//! - `transport`: authenticated request pipeline and HTTP executor seam
//! - `resources`: customers and webhooks
//! - `errors`: error taxonomy

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod resilience;
pub mod resources;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::client::Client;
pub use crate::config::{Config, RetryConfig};
pub use crate::errors::SiigoError;
pub use crate::transport::{ApiResponse, RequestOptions};
pub use http::Method;
