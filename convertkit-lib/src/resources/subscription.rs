use serde::{Deserialize, Serialize};

use super::Subscriber;
use crate::{Client, Result};

/// A subscriber's membership in a form, tag or sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    /// Subscription ID
    pub id: Option<u64>,
    /// Subscription state, e.g. `active`
    pub state: Option<String>,
    /// Creation time, ISO 8601
    pub created_at: Option<String>,
    /// Where the subscription came from
    pub source: Option<String>,
    /// Referring URL
    pub referrer: Option<String>,
    /// ID of the form, tag or sequence subscribed to
    pub subscribable_id: Option<u64>,
    /// `form`, `tag` or `course`
    pub subscribable_type: Option<String>,
    /// The subscriber, as far as the response included it
    pub subscriber: Option<Subscriber>,
}

impl Subscription {
    /// Fetch the full subscriber behind this subscription.
    ///
    /// Returns `None` without calling the API if the subscription carries no
    /// subscriber ID.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn subscriber(&self, client: &Client) -> Result<Option<Subscriber>> {
        match self.subscriber.as_ref().and_then(|s| s.id) {
            Some(id) => client.subscribers().get(id).await.map(Some),
            None => Ok(None),
        }
    }
}
