#![allow(unreachable_pub)]

mod api_error;
mod error;
mod request;

pub use api_error::{ApiError, CANCELLED, INVALID_REQUEST, NO_RESPONSE, NOT_FOUND, QUEUE_FULL};
pub use error::ErrorKind;
pub use request::RequestDescription;

/// The convertkit `Result` type
pub type Result<T> = std::result::Result<T, crate::ErrorKind>;

/// What a governed call settles with: the parsed JSON body or a classified error
pub type Outcome = std::result::Result<serde_json::Value, ApiError>;
