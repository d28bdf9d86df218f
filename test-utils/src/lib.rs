//! `test-utils` is used for testing `convertkit-lib`, both in its unit tests
//! and in its integration tests.
//! This crate does not depend on `convertkit-lib`, else we would get a
//! dependency cycle. Macros are used instead, so that the importer is
//! responsible for providing the dependencies.

/// Create a mock API server with a single route, which responds with the
/// given `wiremock::ResponseTemplate` to requests with a matching method and
/// path
#[macro_export]
macro_rules! mock_server {
    ($method:expr, $path:expr, $response:expr $(,)?) => {{
        let mock_server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method($method))
            .and(wiremock::matchers::path($path))
            .respond_with($response)
            .mount(&mock_server)
            .await;
        mock_server
    }};
}

/// Build a client for a mock server. Takes an optional rate limit
/// configuration.
///
/// `ClientBuilder` and `RateLimitConfig` have to be in scope.
#[macro_export]
macro_rules! mock_client {
    ($server:expr $(,)?) => {
        $crate::mock_client!($server, RateLimitConfig::default())
    };
    ($server:expr, $rate_limit:expr $(,)?) => {
        ClientBuilder::builder()
            .base_url($server.uri())
            .rate_limit($rate_limit)
            .timeout(Some(std::time::Duration::from_secs(5)))
            .build()
            .client()
            .expect("Expected a client for the mock server")
    };
}

/// Mount a route answering `429 Too Many Requests` for the first `$times`
/// matching requests. Mount it before the regular route so that it takes
/// precedence while it lasts.
#[macro_export]
macro_rules! throttle_first {
    ($server:expr, $method:expr, $path:expr, $times:expr $(,)?) => {
        wiremock::Mock::given(wiremock::matchers::method($method))
            .and(wiremock::matchers::path($path))
            .respond_with(wiremock::ResponseTemplate::new(429))
            .up_to_n_times($times)
            .with_priority(1)
            .mount(&$server)
            .await
    };
}
