//! Entry point for talking to the API.
//!
//! This module defines two structs, [`Client`] and [`ClientBuilder`].
//! `Client` performs API calls through its [`Governor`] and hands out the
//! resource wrappers. `ClientBuilder` exposes a finer level of granularity
//! for building a `Client`.
#![allow(clippy::module_name_repetitions)]
use http::header::{self, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use typed_builder::TypedBuilder;
use url::Url;

use crate::governor::{Governor, GovernorStats, RateLimitConfig, Transport};
use crate::resources::{Account, Broadcasts, CustomFields, Forms, Subscribers, Tags};
use crate::{ErrorKind, RequestDescription, Result};

/// Default API endpoint, `https://api.convertkit.com/v3/`.
pub const DEFAULT_BASE_URL: &str = "https://api.convertkit.com/v3/";
/// Default user agent, `convertkit-lib/<PKG_VERSION>`.
pub const DEFAULT_USER_AGENT: &str = concat!("convertkit-lib/", env!("CARGO_PKG_VERSION"));

/// Builder for [`Client`].
///
/// ```no_run
/// use convertkit_lib::{ClientBuilder, Result};
///
/// # fn main() -> Result<()> {
/// let client = ClientBuilder::builder()
///     .api_secret(Some("my-secret".into()))
///     .build()
///     .client()?;
/// # Ok(())
/// # }
/// ```
#[derive(TypedBuilder, Debug, Clone)]
#[builder(field_defaults(default, setter(into)))]
#[builder(builder_method(doc = "
Create a builder for building `ClientBuilder`.

On the builder call, call methods with same name as its fields to set their values.

Finally, call `.build()` to create the instance of `ClientBuilder`.
"))]
pub struct ClientBuilder {
    /// Base URL every request path is resolved against.
    ///
    /// Can be pointed at a mock server for tests.
    #[builder(default_code = "String::from(DEFAULT_BASE_URL)")]
    base_url: String,

    /// Public API key, sent as the `api_key` query parameter.
    api_key: Option<SecretString>,

    /// API secret, sent as the `api_secret` query parameter.
    ///
    /// Grants access to subscriber data. Every call that accepts the key
    /// accepts the secret too, so when both are set only the secret is sent.
    api_secret: Option<SecretString>,

    /// User-agent sent with every request.
    #[builder(default_code = "String::from(DEFAULT_USER_AGENT)")]
    user_agent: String,

    /// Response timeout per request.
    ///
    /// A call that times out is rejected with a `No Response` error. Its
    /// slot in the rate window stays spent.
    timeout: Option<Duration>,

    /// Rate ceiling and queueing behavior.
    rate_limit: RateLimitConfig,

    /// Sets the default [headers] for every request.
    ///
    /// [headers]: https://docs.rs/http/latest/http/header/struct.HeaderName.html
    custom_headers: HeaderMap,
}

impl Default for ClientBuilder {
    #[inline]
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientBuilder {
    /// Instantiates a [`Client`].
    ///
    /// # Errors
    ///
    /// Returns an `Err` if:
    /// - The base URL cannot be parsed.
    /// - The user-agent is invalid.
    /// - The rate limit configuration is invalid.
    /// - The request client cannot be created.
    ///   See [here](https://docs.rs/reqwest/latest/reqwest/struct.ClientBuilder.html#errors).
    pub fn client(self) -> Result<Client> {
        let Self {
            base_url,
            api_key,
            api_secret,
            user_agent,
            timeout,
            rate_limit,
            custom_headers: mut headers,
        } = self;

        let base_url =
            Url::parse(&base_url).map_err(|e| ErrorKind::InvalidBaseUrl(base_url.clone(), e))?;

        headers.insert(header::USER_AGENT, HeaderValue::from_str(&user_agent)?);
        headers
            .entry(header::CONTENT_TYPE)
            .or_insert(HeaderValue::from_static("application/json"));
        headers
            .entry(header::ACCEPT)
            .or_insert(HeaderValue::from_static("application/json"));

        let builder = reqwest::ClientBuilder::new()
            .gzip(true)
            .default_headers(headers);

        let http = (match timeout {
            Some(t) => builder.timeout(t),
            None => builder,
        })
        .build()
        .map_err(ErrorKind::BuildRequestClient)?;

        let governor = Governor::new(rate_limit, Transport::new(http, base_url))?;

        let credential = match (api_secret, api_key) {
            (Some(secret), _) => Some(Credential::ApiSecret(secret)),
            (None, Some(key)) => Some(Credential::ApiKey(key)),
            (None, None) => None,
        };

        Ok(Client {
            governor,
            credential,
        })
    }
}

/// The credential appended to every request
#[derive(Debug, Clone)]
enum Credential {
    ApiSecret(SecretString),
    ApiKey(SecretString),
}

impl Credential {
    fn query_pair(&self) -> (&'static str, &str) {
        match self {
            Self::ApiSecret(secret) => ("api_secret", secret.expose_secret()),
            Self::ApiKey(key) => ("api_key", key.expose_secret()),
        }
    }
}

/// Handles incoming requests and returns the parsed JSON bodies.
///
/// Cheap to clone: clones share one [`Governor`] and therefore one rate
/// ceiling.
#[derive(Debug, Clone)]
pub struct Client {
    governor: Governor,
    credential: Option<Credential>,
}

impl Client {
    /// Perform a call described by `description`, with credentials added.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Api`] with the classified error if the call
    /// fails. HTTP 429 is never returned: throttled calls are retried.
    pub async fn execute(&self, mut description: RequestDescription) -> Result<Value> {
        if let Some(credential) = &self.credential {
            let (key, value) = credential.query_pair();
            description.query.push((key.to_string(), value.to_string()));
        }
        Ok(self.governor.request(description).await?)
    }

    /// `GET` the given path.
    ///
    /// # Errors
    ///
    /// See [`Client::execute`].
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.execute(RequestDescription::get(path).with_query(query.iter().copied()))
            .await
    }

    /// `POST` a JSON body to the given path.
    ///
    /// # Errors
    ///
    /// See [`Client::execute`].
    pub async fn post(&self, path: &str, body: Value, query: &[(&str, &str)]) -> Result<Value> {
        self.execute(
            RequestDescription::post(path)
                .with_body(body)
                .with_query(query.iter().copied()),
        )
        .await
    }

    /// `PUT` a JSON body to the given path.
    ///
    /// # Errors
    ///
    /// See [`Client::execute`].
    pub async fn put(&self, path: &str, body: Value, query: &[(&str, &str)]) -> Result<Value> {
        self.execute(
            RequestDescription::put(path)
                .with_body(body)
                .with_query(query.iter().copied()),
        )
        .await
    }

    /// `DELETE` the given path.
    ///
    /// # Errors
    ///
    /// See [`Client::execute`].
    pub async fn delete(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.execute(RequestDescription::delete(path).with_query(query.iter().copied()))
            .await
    }

    /// The governor all calls go through
    #[must_use]
    pub const fn governor(&self) -> &Governor {
        &self.governor
    }

    /// Snapshot of the governor's counters
    #[must_use]
    pub fn stats(&self) -> GovernorStats {
        self.governor.stats()
    }

    /// Account endpoints
    #[must_use]
    pub const fn account(&self) -> Account<'_> {
        Account::new(self)
    }

    /// Broadcast endpoints
    #[must_use]
    pub const fn broadcasts(&self) -> Broadcasts<'_> {
        Broadcasts::new(self)
    }

    /// Custom field endpoints
    #[must_use]
    pub const fn custom_fields(&self) -> CustomFields<'_> {
        CustomFields::new(self)
    }

    /// Form endpoints
    #[must_use]
    pub const fn forms(&self) -> Forms<'_> {
        Forms::new(self)
    }

    /// Subscriber endpoints
    #[must_use]
    pub const fn subscribers(&self) -> Subscribers<'_> {
        Subscribers::new(self)
    }

    /// Tag endpoints
    #[must_use]
    pub const fn tags(&self) -> Tags<'_> {
        Tags::new(self)
    }
}

/// Deserialize a response body into a typed value
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(ErrorKind::UnexpectedPayload)
}
