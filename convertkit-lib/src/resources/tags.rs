use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Subscription, take_field};
use crate::client::decode;
use crate::pagination::collect_all;
use crate::{Client, Result, SubscriptionFilter};

/// A tag as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    /// Tag ID
    pub id: u64,
    /// Tag name
    pub name: String,
    /// Tag state, if reported
    pub state: Option<String>,
    /// Creation time, ISO 8601
    pub created_at: Option<String>,
    /// Last update, ISO 8601
    pub updated_at: Option<String>,
    /// Deletion time, ISO 8601
    pub deleted_at: Option<String>,
}

impl Tag {
    /// Every subscription to this tag.
    ///
    /// # Errors
    ///
    /// Fails if any page request fails.
    pub async fn subscriptions(
        &self,
        client: &Client,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<Subscription>> {
        client.tags().subscriptions(self.id, filter).await
    }

    /// Tag an email address.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn add_subscriber(&self, client: &Client, email: &str) -> Result<Subscription> {
        let body = client
            .post(
                &format!("tags/{}/subscribe", self.id),
                json!({ "email": email }),
                &[],
            )
            .await?;
        take_field(body, "subscription")
    }

    /// Remove this tag from an email address.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn remove_subscriber(&self, client: &Client, email: &str) -> Result<()> {
        client
            .post(
                &format!("tags/{}/unsubscribe", self.id),
                json!({ "email": email }),
                &[],
            )
            .await?;
        Ok(())
    }
}

/// Tag endpoints
#[derive(Debug, Clone, Copy)]
pub struct Tags<'a> {
    client: &'a Client,
}

impl<'a> Tags<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// All tags of the account.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn all(&self) -> Result<Vec<Tag>> {
        let body = self.client.get("tags", &[]).await?;
        take_field(body, "tags")
    }

    /// The first tag with exactly this name.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        Ok(self.all().await?.into_iter().find(|tag| tag.name == name))
    }

    /// Create a tag.
    ///
    /// # Errors
    ///
    /// Fails if the call fails, e.g. with a validation error if the name is
    /// taken.
    pub async fn create(&self, name: &str) -> Result<Tag> {
        let body = self
            .client
            .post("tags", json!({ "tag": { "name": name } }), &[])
            .await?;
        decode(body)
    }

    /// Create several tags with one call.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn bulk_create<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Tag>> {
        let tags: Vec<_> = names
            .iter()
            .map(|name| json!({ "name": name.as_ref() }))
            .collect();
        let body = self
            .client
            .post("tags", json!({ "tag": tags }), &[])
            .await?;
        decode(body)
    }

    /// Every subscription to a tag.
    ///
    /// # Errors
    ///
    /// Fails if any page request fails.
    pub async fn subscriptions(
        &self,
        tag_id: u64,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<Subscription>> {
        collect_all(
            self.client,
            format!("tags/{tag_id}/subscriptions"),
            filter.to_query(),
            "subscriptions",
        )
        .await
    }
}
