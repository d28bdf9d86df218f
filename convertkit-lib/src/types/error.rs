use serde::{Serialize, Serializer};
use std::path::PathBuf;
use thiserror::Error;

use super::ApiError;

/// Possible errors when interacting with `convertkit_lib`
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A call made it to the governor and failed there, see [`ApiError`]
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The configured base URL could not be parsed
    #[error("Cannot parse `{0}` as the API base URL: {1}")]
    InvalidBaseUrl(String, url::ParseError),

    /// The underlying HTTP client could not be constructed
    #[error("Failed to build the request client: {0}")]
    BuildRequestClient(#[source] reqwest::Error),

    /// The given header could not be parsed.
    /// A possible error when converting a `HeaderValue` from a string or byte
    /// slice.
    #[error("Header could not be parsed.")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    /// A configured header name is not a valid HTTP header name
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// The rate limit settings cannot be used to build a governor
    #[error("Invalid rate limit configuration: {0}")]
    InvalidRateLimit(String),

    /// Any form of I/O error occurred while reading a configuration file
    #[error("Failed to read config file `{path}`: {error}", path = .0.display(), error = .1)]
    ReadConfig(PathBuf, #[source] std::io::Error),

    /// The configuration file is not valid TOML or has unknown keys
    #[error("Cannot parse configuration: {0}")]
    ParseConfig(#[from] toml::de::Error),

    /// A response body did not have the shape a resource wrapper expected
    #[error("Unexpected response payload: {0}")]
    UnexpectedPayload(#[source] serde_json::Error),
}

impl ErrorKind {
    /// The classified API error behind this error, if any.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Api(e1), Self::Api(e2)) => e1 == e2,
            (Self::InvalidBaseUrl(s1, e1), Self::InvalidBaseUrl(s2, e2)) => s1 == s2 && e1 == e2,
            (Self::InvalidRateLimit(s1), Self::InvalidRateLimit(s2)) => s1 == s2,
            (Self::ReadConfig(p1, e1), Self::ReadConfig(p2, e2)) => {
                p1 == p2 && e1.kind() == e2.kind()
            }
            (Self::BuildRequestClient(e1), Self::BuildRequestClient(e2)) => {
                e1.to_string() == e2.to_string()
            }
            (Self::ParseConfig(e1), Self::ParseConfig(e2)) => e1.to_string() == e2.to_string(),
            (Self::UnexpectedPayload(e1), Self::UnexpectedPayload(e2)) => {
                e1.to_string() == e2.to_string()
            }
            (Self::InvalidHeader(_), Self::InvalidHeader(_))
            | (Self::InvalidHeaderName(_), Self::InvalidHeaderName(_)) => true,
            _ => false,
        }
    }
}

impl Serialize for ErrorKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Api(e) => e.serialize(serializer),
            _ => serializer.collect_str(self),
        }
    }
}

impl From<serde_json::Error> for ErrorKind {
    fn from(e: serde_json::Error) -> Self {
        Self::UnexpectedPayload(e)
    }
}
