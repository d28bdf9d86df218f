use std::time::Duration;

use convertkit_lib::{
    ApiError, ClientBuilder, ErrorKind, INVALID_REQUEST, NO_RESPONSE, RateLimitConfig,
    SubscriberFilter,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_utils::{mock_client, mock_server};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_not_found() {
    let server = mock_server!("GET", "/subscribers/99", ResponseTemplate::new(404));
    let client = mock_client!(server);

    let err = client.subscribers().get(99).await.unwrap_err();
    assert_eq!(err, ErrorKind::Api(ApiError::not_found()));
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        json!({ "error": "Not Found", "message": "Not Found", "status": 404 })
    );
}

#[tokio::test]
async fn test_validation_from_server() {
    let server = mock_server!(
        "POST",
        "/tags",
        ResponseTemplate::new(422).set_body_json(json!({
            "error": "Unprocessable Entity",
            "message": "Name has already been taken"
        }))
    );
    let client = mock_client!(server);

    let err = client.tags().create("vip").await.unwrap_err();
    assert_eq!(
        err.api_error(),
        Some(&ApiError::validation("Name has already been taken"))
    );
    assert_eq!(client.stats().client_errors, 1);
}

#[tokio::test]
async fn test_server_error_without_body_uses_reason() {
    let server = mock_server!("GET", "/forms", ResponseTemplate::new(503));
    let client = mock_client!(server);

    let err = client.forms().all().await.unwrap_err();
    assert_eq!(
        err.api_error(),
        Some(&ApiError::network(
            "Service Unavailable",
            "Service Unavailable",
            Some(503)
        ))
    );
}

#[tokio::test]
async fn test_unreachable_server_is_no_response() {
    let client = ClientBuilder::builder()
        .base_url("http://127.0.0.1:1/v3/")
        .build()
        .client()
        .unwrap();

    let err = client.account().current().await.unwrap_err();
    let api_error = err.api_error().unwrap();
    assert_eq!(api_error.name(), NO_RESPONSE);
    assert_eq!(api_error.status(), None);
    assert_eq!(client.stats().transport_failures, 1);
}

#[tokio::test]
async fn test_unsendable_url_is_invalid_request() {
    let client = ClientBuilder::builder()
        .base_url("mailto:nobody")
        .build()
        .client()
        .unwrap();

    let err = client.account().current().await.unwrap_err();
    let api_error = err.api_error().unwrap();
    assert_eq!(api_error.name(), INVALID_REQUEST);
    assert_eq!(api_error.status(), None);
    assert!(matches!(api_error, ApiError::Network { .. }));
}

#[tokio::test]
async fn test_timeout_is_no_response() {
    let server = mock_server!(
        "GET",
        "/account",
        ResponseTemplate::new(200).set_delay(Duration::from_secs(2))
    );
    let client = ClientBuilder::builder()
        .base_url(server.uri())
        .timeout(Some(Duration::from_millis(100)))
        .build()
        .client()
        .unwrap();

    let err = client.account().current().await.unwrap_err();
    assert_eq!(err.api_error().unwrap().name(), NO_RESPONSE);
}

#[tokio::test]
async fn test_local_precondition_is_validation() {
    let server = MockServer::start().await;
    let client = mock_client!(server);

    let mut subscriber = convertkit_lib::Subscriber::default();
    let err = subscriber.unsubscribe(&client).await.unwrap_err();

    let api_error = err.api_error().unwrap();
    assert!(matches!(api_error, ApiError::Validation { .. }));
    assert!(api_error.properties().is_some());
    // Nothing was sent
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_credentials_are_sent_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subscribers"))
        .and(query_param("api_secret", "secret"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_subscribers": 1,
            "page": 1,
            "total_pages": 1,
            "subscribers": [{ "id": 1, "email_address": "jane@example.com" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClientBuilder::builder()
        .base_url(server.uri())
        .api_key(Some("key".into()))
        .api_secret(Some("secret".into()))
        .rate_limit(RateLimitConfig::default())
        .build()
        .client()
        .unwrap();

    let subscribers = client
        .subscribers()
        .all(&SubscriberFilter::default())
        .await
        .unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(
        subscribers[0].email_address.as_deref(),
        Some("jane@example.com")
    );

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default();
    assert!(!query.contains("api_key"));
}
