use std::time::Duration;

use wiremock::MockServer;

use crate::{Client, ClientBuilder, RateLimitConfig};

/// A client talking to `server` with the default rate settings
pub(crate) fn mock_client(server: &MockServer) -> Client {
    mock_client_with(server, RateLimitConfig::default())
}

/// A client talking to `server` with the given rate settings
pub(crate) fn mock_client_with(server: &MockServer, rate_limit: RateLimitConfig) -> Client {
    ClientBuilder::builder()
        .base_url(server.uri())
        .rate_limit(rate_limit)
        .timeout(Some(Duration::from_secs(5)))
        .build()
        .client()
        .expect("Expected a client for the mock server")
}
