//! Typed wrappers around the API endpoints.
//!
//! Each group of endpoints is reached through an accessor on
//! [`crate::Client`], e.g. [`crate::Client::tags`]. Entities returned by these
//! wrappers carry methods for follow-up calls which take the client
//! explicitly.

mod account;
mod broadcasts;
mod custom_fields;
mod forms;
mod subscribers;
mod subscription;
mod tags;

pub use account::Account;
pub use broadcasts::{Broadcast, BroadcastStats, Broadcasts};
pub use custom_fields::{CustomField, CustomFields};
pub use forms::{Form, Forms, NewSubscriber};
pub use subscribers::{Subscriber, SubscriberUpdate, Subscribers};
pub use subscription::Subscription;
pub use tags::{Tag, Tags};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Result;
use crate::client::decode;

/// Decode the value stored under `key` in a response body.
///
/// A missing key decodes from `null`.
pub(crate) fn take_field<T: DeserializeOwned>(mut body: Value, key: &str) -> Result<T> {
    let value = body.get_mut(key).map(Value::take).unwrap_or_default();
    decode(value)
}
