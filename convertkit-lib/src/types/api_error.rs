use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Name and message used for HTTP 404 responses.
pub const NOT_FOUND: &str = "Not Found";

/// Name given to calls that were sent but never got a response.
pub const NO_RESPONSE: &str = "No Response";

/// Name given to calls that failed before anything was sent.
pub const INVALID_REQUEST: &str = "Invalid Request";

/// Name given to calls turned away because the pending queue was full.
pub const QUEUE_FULL: &str = "Queue Full";

/// Name given to calls whose governor went away before they were dispatched.
pub const CANCELLED: &str = "Cancelled";

/// The classified outcome of a failed API call.
///
/// Every call routed through the [`crate::Governor`] either resolves with the
/// parsed response body or rejects with exactly one of these. Throttling
/// (HTTP 429) never shows up here: it is retried transparently.
///
/// Serializes to `{ error, message, status?, properties? }`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The server responded with 404.
    #[error("Not Found")]
    NotFound {
        /// HTTP status code, always 404 for server responses
        status: u16,
    },

    /// The server responded with 422, or a precondition failed locally
    /// before any request was attempted.
    #[error("{message}")]
    Validation {
        /// Server- or locally-provided description of the problem
        message: String,
        /// Snapshot of the offending entity, if the check was local
        properties: Option<Value>,
    },

    /// Any other failure: a non-404/422 error status, no response at all,
    /// or a request that could not be built.
    #[error("{name}: {message}")]
    Network {
        /// Error name reported by the server, or a local kind such as
        /// [`NO_RESPONSE`] or [`INVALID_REQUEST`]
        name: String,
        /// Human readable description
        message: String,
        /// HTTP status, `None` when no HTTP exchange completed
        status: Option<u16>,
    },
}

impl ApiError {
    /// A 404 error.
    #[must_use]
    pub const fn not_found() -> Self {
        Self::NotFound { status: 404 }
    }

    /// A validation error without an entity snapshot.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            properties: None,
        }
    }

    /// A validation error carrying the serialized state of the entity
    /// that failed the check.
    #[must_use]
    pub fn invalid_entity(message: impl Into<String>, properties: Value) -> Self {
        Self::Validation {
            message: message.into(),
            properties: Some(properties),
        }
    }

    /// A generic network error.
    #[must_use]
    pub fn network(name: impl Into<String>, message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Network {
            name: name.into(),
            message: message.into(),
            status,
        }
    }

    pub(crate) fn no_response(message: impl Into<String>) -> Self {
        Self::network(NO_RESPONSE, message, None)
    }

    pub(crate) fn invalid_request(message: impl Into<String>) -> Self {
        Self::network(INVALID_REQUEST, message, None)
    }

    pub(crate) fn queue_full() -> Self {
        Self::network(
            QUEUE_FULL,
            "The pending request queue is full, the call was not scheduled",
            None,
        )
    }

    pub(crate) fn cancelled() -> Self {
        Self::network(
            CANCELLED,
            "The client was dropped before the call could be dispatched",
            None,
        )
    }

    /// The error name, as it appears in the `error` field when serialized.
    ///
    /// For validation errors this is the message itself.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::NotFound { .. } => NOT_FOUND,
            Self::Validation { message, .. } => message,
            Self::Network { name, .. } => name,
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound { .. } => NOT_FOUND,
            Self::Validation { message, .. } | Self::Network { message, .. } => message,
        }
    }

    /// The HTTP status that caused this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { status } => Some(*status),
            Self::Validation { .. } => None,
            Self::Network { status, .. } => *status,
        }
    }

    /// Entity snapshot attached to a local validation failure.
    #[must_use]
    pub const fn properties(&self) -> Option<&Value> {
        match self {
            Self::Validation { properties, .. } => properties.as_ref(),
            _ => None,
        }
    }
}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::NotFound { status } => {
                let mut state = serializer.serialize_struct("ApiError", 3)?;
                state.serialize_field("error", NOT_FOUND)?;
                state.serialize_field("message", NOT_FOUND)?;
                state.serialize_field("status", status)?;
                state.end()
            }
            Self::Validation {
                message,
                properties,
            } => {
                let len = if properties.is_some() { 3 } else { 2 };
                let mut state = serializer.serialize_struct("ApiError", len)?;
                state.serialize_field("error", message)?;
                state.serialize_field("message", message)?;
                if let Some(properties) = properties {
                    state.serialize_field("properties", properties)?;
                }
                state.end()
            }
            Self::Network {
                name,
                message,
                status,
            } => {
                let mut state = serializer.serialize_struct("ApiError", 3)?;
                state.serialize_field("error", name)?;
                state.serialize_field("message", message)?;
                state.serialize_field("status", status)?;
                state.end()
            }
        }
    }
}
