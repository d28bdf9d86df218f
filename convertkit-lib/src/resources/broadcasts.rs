use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::take_field;
use crate::client::decode;
use crate::{Client, Result};

/// A broadcast email
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Broadcast {
    /// Broadcast ID
    pub id: u64,
    /// Email subject
    pub subject: Option<String>,
    /// Creation time, ISO 8601
    pub created_at: Option<String>,
}

/// Delivery and engagement numbers of a broadcast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastStats {
    /// Number of recipients
    pub recipients: Option<u64>,
    /// Open rate in percent
    pub open_rate: Option<f64>,
    /// Click rate in percent
    pub click_rate: Option<f64>,
    /// Unsubscribes caused by this broadcast
    pub unsubscribes: Option<u64>,
    /// Total link clicks
    pub total_clicks: Option<u64>,
    /// Whether click counts are shown in the app
    pub show_total_clicks: Option<bool>,
    /// Delivery status, e.g. `completed`
    pub status: Option<String>,
    /// Delivery progress in percent
    pub progress: Option<f64>,
}

impl Broadcast {
    /// Statistics for this broadcast, if the API has any.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn stats(&self, client: &Client) -> Result<Option<BroadcastStats>> {
        client.broadcasts().stats(self.id).await
    }
}

/// Broadcast endpoints
#[derive(Debug, Clone, Copy)]
pub struct Broadcasts<'a> {
    client: &'a Client,
}

impl<'a> Broadcasts<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// All broadcasts.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn all(&self) -> Result<Vec<Broadcast>> {
        let body = self.client.get("broadcasts", &[]).await?;
        take_field(body, "broadcasts")
    }

    /// Statistics for a broadcast.
    ///
    /// The stats sit under `broadcast`, either directly or in the first
    /// element of an array. `None` if neither holds any.
    ///
    /// # Errors
    ///
    /// Fails if the call fails or the stats have an unexpected shape.
    pub async fn stats(&self, broadcast_id: u64) -> Result<Option<BroadcastStats>> {
        let body = self
            .client
            .get(&format!("broadcasts/{broadcast_id}/stats"), &[])
            .await?;
        let mut broadcast: Value = take_field(body, "broadcast")?;

        let entry = if broadcast.is_array() {
            broadcast.get_mut(0)
        } else {
            Some(&mut broadcast)
        };
        match entry.and_then(|e| e.get_mut("stats")).map(Value::take) {
            Some(Value::Null) | None => Ok(None),
            Some(stats) => decode(stats).map(Some),
        }
    }
}
