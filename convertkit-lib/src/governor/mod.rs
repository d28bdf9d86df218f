//! Client-side rate limiting for outbound API calls.
//!
//! The API allows a fixed number of calls per time window and answers
//! `429 Too Many Requests` beyond that. Every call made by a
//! [`crate::Client`] goes through a [`Governor`], which keeps the client under
//! that ceiling and absorbs any 429 that still gets through.
//!
//! # Architecture
//!
//! - [`Call`]: One logical API call and its single-resolution completion handle
//! - [`Governor`]: Admits, queues, backs off and drains calls
//! - [`Transport`]: Performs one HTTP exchange and classifies the answer
//! - [`RateLimitConfig`]: Ceiling, window length and queue bounds
//! - [`GovernorStats`]: Counters for dispatched, failed and throttled calls

mod call;
mod config;
mod scheduler;
mod stats;
mod transport;
mod window;

pub use call::{Call, Completion};
pub use config::{OverflowPolicy, RateLimitConfig};
pub use scheduler::Governor;
pub use stats::GovernorStats;
pub use transport::{Attempt, Transport};
