//! `convertkit_lib` is an async client for the ConvertKit v3 API.
//!
//! Every call goes through a [`Governor`] which keeps the client under the
//! API's rate ceiling (120 calls per minute by default). Calls beyond the
//! ceiling are queued and sent in order once the window resets. If the API
//! answers `429 Too Many Requests` anyway, the call is retried after the next
//! reset without the caller noticing.
//!
//! ```no_run
//! use convertkit_lib::{ClientBuilder, Result, SubscriberFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ClientBuilder::builder()
//!         .api_secret(Some("my-api-secret".into()))
//!         .build()
//!         .client()?;
//!
//!     let subscribers = client.subscribers().all(&SubscriberFilter::default()).await?;
//!     for subscriber in subscribers {
//!         println!("{:?}", subscriber.email_address);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Failed calls surface as [`ErrorKind::Api`] carrying an [`ApiError`]:
//! `NotFound` for 404, `Validation` for 422 and local precondition failures,
//! and `Network` for everything else.
#![warn(missing_docs)]

#[cfg(test)]
pub(crate) mod test_utils;

mod client;
mod config;
mod filter;
mod pagination;
mod types;

pub mod governor;
pub mod resources;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use config::ClientConfig;
pub use filter::{SortField, SortOrder, SubscriberFilter, SubscriberState, SubscriptionFilter};
pub use governor::{
    Call, Completion, Governor, GovernorStats, OverflowPolicy, RateLimitConfig, Transport,
};
pub use pagination::{collect_all, paginate};
pub use resources::{
    Broadcast, BroadcastStats, CustomField, Form, NewSubscriber, Subscriber, SubscriberUpdate,
    Subscription, Tag,
};
pub use types::*;
