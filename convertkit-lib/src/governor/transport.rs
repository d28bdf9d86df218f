use http::StatusCode;
use log::trace;
use reqwest::Response;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::types::{ApiError, Outcome, RequestDescription};

/// Result of a single HTTP exchange
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    /// The exchange produced a final outcome
    Settled(Outcome),
    /// The server answered 429 and the call has to be tried again later
    Throttled,
}

/// Error body as returned by the API for failed calls
#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    error: Option<String>,
    message: Option<String>,
}

/// Performs HTTP exchanges against the API base URL.
///
/// Holds no governor state. Every call to [`Transport::attempt`] sends
/// exactly one request.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
}

impl Transport {
    /// Create a transport for the given base URL
    #[must_use]
    pub const fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The base URL all paths are resolved against
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Send the described request once and classify the answer.
    pub async fn attempt(&self, description: &RequestDescription) -> Attempt {
        let url = match description.url(&self.base_url) {
            Ok(url) => url,
            Err(e) => return Attempt::Settled(Err(ApiError::invalid_request(e.to_string()))),
        };

        let mut builder = self.http.request(description.method.clone(), url);
        if let Some(body) = &description.body {
            builder = builder.json(body);
        }
        let request = match builder.build() {
            Ok(request) => request,
            Err(e) => return Attempt::Settled(Err(ApiError::invalid_request(e.to_string()))),
        };

        trace!("Sending {description}");
        match self.http.execute(request).await {
            Ok(response) => classify(response).await,
            Err(e) if e.is_builder() => {
                Attempt::Settled(Err(ApiError::invalid_request(e.to_string())))
            }
            Err(e) => Attempt::Settled(Err(ApiError::no_response(e.to_string()))),
        }
    }
}

/// Map a response to its outcome
async fn classify(response: Response) -> Attempt {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Attempt::Throttled;
    }

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return Attempt::Settled(Err(ApiError::no_response(e.to_string()))),
    };

    if status.as_u16() < 400 {
        return Attempt::Settled(Ok(parse_body(&text)));
    }

    Attempt::Settled(Err(classify_error(status, &text)))
}

/// Parse a success body. Empty bodies become `null` and anything that is not
/// JSON is passed through as a string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn classify_error(status: StatusCode, text: &str) -> ApiError {
    if status == StatusCode::NOT_FOUND {
        return ApiError::not_found();
    }

    let payload: ErrorPayload = serde_json::from_str(text).unwrap_or_default();
    let reason = status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_string(), str::to_string);

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        let message = payload.message.unwrap_or_else(|| {
            if text.trim().is_empty() {
                reason
            } else {
                text.to_string()
            }
        });
        return ApiError::validation(message);
    }

    ApiError::network(
        payload.error.unwrap_or_else(|| reason.clone()),
        payload.message.unwrap_or(reason),
        Some(status.as_u16()),
    )
}
