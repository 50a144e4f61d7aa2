//! HTTP client factory with consistent timeout configuration.
//!
//! Every outbound client (billing provider, image provider, image downloads,
//! object storage) is built here so timeouts stay uniform.

use reqwest::Client;
use std::time::Duration;

/// Connect timeout (TCP handshake + TLS).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total request/response time for provider API calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Image generation routinely takes longer than a plain API call.
pub const IMAGE_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Build an HTTP client with default timeouts.
///
/// Panics if the client cannot be built (e.g., TLS misconfiguration). Only
/// called from singleton constructors at startup.
pub fn build_client() -> Client {
    build_client_with_timeout(DEFAULT_REQUEST_TIMEOUT)
}

/// Build an HTTP client with an explicit request timeout.
pub fn build_client_with_timeout(timeout: Duration) -> Client {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()
        .expect("Failed to build HTTP client")
}
