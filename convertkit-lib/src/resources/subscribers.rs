use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::{Subscription, Tag, take_field};
use crate::pagination::collect_all;
use crate::{ApiError, Client, Result, SubscriberFilter};

/// A subscriber as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscriber {
    /// Subscriber ID
    pub id: Option<u64>,
    /// First name
    pub first_name: Option<String>,
    /// Email address
    pub email_address: Option<String>,
    /// `active` or `cancelled`
    pub state: Option<String>,
    /// Creation time, ISO 8601
    pub created_at: Option<String>,
    /// Custom field values keyed by field key
    pub fields: Option<Map<String, Value>>,
}

/// Changes to apply to a subscriber. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubscriberUpdate {
    /// New first name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// New email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    /// New custom field values. The fields have to exist already.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Map<String, Value>>,
}

impl Subscriber {
    /// Reject a local precondition with a snapshot of this subscriber
    fn invalid(&self, message: &str) -> crate::ErrorKind {
        let snapshot = serde_json::to_value(self).unwrap_or_default();
        ApiError::invalid_entity(message, snapshot).into()
    }

    fn require_id(&self) -> Result<u64> {
        self.id.ok_or_else(|| self.invalid("Invalid Subscriber ID"))
    }

    fn require_email(&self) -> Result<&str> {
        self.email_address
            .as_deref()
            .filter(|email| !email.is_empty())
            .ok_or_else(|| self.invalid("Invalid Subscriber email"))
    }

    /// Take over the server's view of this subscriber, keeping the ID
    fn refresh(&mut self, updated: Self) {
        let id = self.id;
        *self = updated;
        self.id = id;
    }

    /// Update this subscriber and refresh it from the response.
    ///
    /// # Errors
    ///
    /// Fails with a validation error if the subscriber has no ID, or if the
    /// call fails.
    pub async fn update(&mut self, client: &Client, update: &SubscriberUpdate) -> Result<()> {
        let id = self.require_id()?;
        let updated = client.subscribers().update(id, update).await?;
        self.refresh(updated);
        Ok(())
    }

    /// Unsubscribe this subscriber from all forms and sequences.
    ///
    /// # Errors
    ///
    /// Fails with a validation error if the subscriber has no email address,
    /// or if the call fails.
    pub async fn unsubscribe(&mut self, client: &Client) -> Result<()> {
        let email = self.require_email()?.to_string();
        let updated = client.subscribers().unsubscribe(&email).await?;
        self.refresh(updated);
        Ok(())
    }

    /// Tags applied to this subscriber.
    ///
    /// # Errors
    ///
    /// Fails with a validation error if the subscriber has no ID, or if the
    /// call fails.
    pub async fn tags(&self, client: &Client) -> Result<Vec<Tag>> {
        let id = self.require_id()?;
        client.subscribers().tags(id).await
    }

    /// Apply a tag to this subscriber.
    ///
    /// # Errors
    ///
    /// Fails with a validation error if the subscriber has no email address,
    /// or if the call fails.
    pub async fn add_tag(&self, client: &Client, tag_id: u64) -> Result<Subscription> {
        let email = self.require_email()?;
        let body = client
            .post(&format!("tags/{tag_id}/subscribe"), json!({ "email": email }), &[])
            .await?;
        take_field(body, "subscription")
    }

    /// Remove a tag from this subscriber, returning the removed tag.
    ///
    /// # Errors
    ///
    /// Fails with a validation error if the subscriber has no ID, or if the
    /// call fails.
    pub async fn remove_tag(&self, client: &Client, tag_id: u64) -> Result<Tag> {
        let id = self.require_id()?;
        let body = client
            .delete(&format!("subscribers/{id}/tags/{tag_id}"), &[])
            .await?;
        crate::client::decode(body)
    }
}

/// Subscriber endpoints
#[derive(Debug, Clone, Copy)]
pub struct Subscribers<'a> {
    client: &'a Client,
}

impl<'a> Subscribers<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetch a single subscriber.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiError::NotFound`] for unknown IDs, or if the call
    /// fails.
    pub async fn get(&self, id: u64) -> Result<Subscriber> {
        let body = self.client.get(&format!("subscribers/{id}"), &[]).await?;
        take_field(body, "subscriber")
    }

    /// Find the subscriber with exactly this email address.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn find(&self, email: &str) -> Result<Option<Subscriber>> {
        let body = self
            .client
            .get("subscribers", &[("email_address", email)])
            .await?;
        let subscribers: Vec<Subscriber> = take_field(body, "subscribers")?;
        Ok(subscribers
            .into_iter()
            .find(|s| s.email_address.as_deref() == Some(email)))
    }

    /// List every subscriber matching `filter`, across all pages.
    ///
    /// # Errors
    ///
    /// Fails if any page request fails.
    pub async fn all(&self, filter: &SubscriberFilter) -> Result<Vec<Subscriber>> {
        collect_all(self.client, "subscribers", filter.to_query(), "subscribers").await
    }

    /// Update a subscriber and return its new state.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn update(&self, id: u64, update: &SubscriberUpdate) -> Result<Subscriber> {
        let body = serde_json::to_value(update)?;
        let body = self
            .client
            .put(&format!("subscribers/{id}"), body, &[])
            .await?;
        take_field(body, "subscriber")
    }

    /// Unsubscribe an email address from all forms and sequences.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn unsubscribe(&self, email: &str) -> Result<Subscriber> {
        let body = self
            .client
            .put("unsubscribe", json!({ "email": email }), &[])
            .await?;
        take_field(body, "subscriber")
    }

    /// Tags applied to a subscriber.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn tags(&self, id: u64) -> Result<Vec<Tag>> {
        let body = self
            .client
            .get(&format!("subscribers/{id}/tags"), &[])
            .await?;
        take_field(body, "tags")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_utils::mock_client;

    fn subscriber_json(id: u64, email: &str) -> Value {
        json!({
            "id": id,
            "first_name": "Jon",
            "email_address": email,
            "state": "active",
            "created_at": "2023-02-17T11:43:55Z",
            "fields": { "last_name": "Snow" }
        })
    }

    #[tokio::test]
    async fn test_find_requires_exact_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscribers"))
            .and(query_param("email_address", "jon@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "subscribers": [
                    subscriber_json(1, "jon.snow@example.com"),
                    subscriber_json(2, "jon@example.com"),
                ]
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let found = client.subscribers().find("jon@example.com").await.unwrap();
        assert_eq!(found.and_then(|s| s.id), Some(2));

        let missing = client.subscribers().find("arya@example.com").await;
        // No mock matches the query, so wiremock answers 404
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_update_sends_only_set_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/subscribers/7"))
            .and(body_json(json!({ "first_name": "Aegon" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "subscriber": {
                    "id": 7,
                    "first_name": "Aegon",
                    "email_address": "jon@example.com",
                    "state": "active"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let mut subscriber: Subscriber =
            serde_json::from_value(subscriber_json(7, "jon@example.com")).unwrap();
        let update = SubscriberUpdate {
            first_name: Some("Aegon".into()),
            ..SubscriberUpdate::default()
        };
        subscriber.update(&client, &update).await.unwrap();

        assert_eq!(subscriber.id, Some(7));
        assert_eq!(subscriber.first_name.as_deref(), Some("Aegon"));
        assert_eq!(subscriber.fields, None);
    }

    #[tokio::test]
    async fn test_preconditions_carry_snapshot() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        let mut subscriber = Subscriber {
            first_name: Some("Ghost".into()),
            ..Subscriber::default()
        };

        let err = subscriber
            .update(&client, &SubscriberUpdate::default())
            .await
            .unwrap_err();
        let api_error = err.api_error().unwrap();
        assert_eq!(api_error.message(), "Invalid Subscriber ID");
        assert_eq!(api_error.properties().unwrap()["first_name"], "Ghost");
        assert_eq!(api_error.properties().unwrap()["id"], Value::Null);

        let err = subscriber.unsubscribe(&client).await.unwrap_err();
        assert_eq!(err.api_error().unwrap().message(), "Invalid Subscriber email");

        assert!(subscriber.tags(&client).await.is_err());
        assert!(subscriber.remove_tag(&client, 1).await.is_err());
        assert!(subscriber.add_tag(&client, 1).await.is_err());

        // Nothing reached the server
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsubscribe_by_email() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/unsubscribe"))
            .and(body_json(json!({ "email": "jon@example.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "subscriber": {
                    "id": 3,
                    "email_address": "jon@example.com",
                    "state": "cancelled"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let mut subscriber: Subscriber =
            serde_json::from_value(subscriber_json(3, "jon@example.com")).unwrap();
        subscriber.unsubscribe(&client).await.unwrap();
        assert_eq!(subscriber.state.as_deref(), Some("cancelled"));
    }

    #[tokio::test]
    async fn test_tag_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tags/11/subscribe"))
            .and(body_json(json!({ "email": "jon@example.com" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "subscription": {
                    "id": 99,
                    "state": "active",
                    "subscribable_id": 11,
                    "subscribable_type": "tag",
                    "subscriber": { "id": 3 }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/subscribers/3/tags/11"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": 11, "name": "vip" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/subscribers/3/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tags": [{ "id": 11, "name": "vip" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let subscriber: Subscriber =
            serde_json::from_value(subscriber_json(3, "jon@example.com")).unwrap();

        let subscription = subscriber.add_tag(&client, 11).await.unwrap();
        assert_eq!(subscription.id, Some(99));
        assert_eq!(subscription.subscribable_type.as_deref(), Some("tag"));

        let tags = subscriber.tags(&client).await.unwrap();
        assert_eq!(tags[0].name, "vip");

        let removed = subscriber.remove_tag(&client, 11).await.unwrap();
        assert_eq!(removed.id, 11);
    }

    #[tokio::test]
    async fn test_get_unknown_subscriber() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscribers/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = mock_client(&server)
            .subscribers()
            .get(404)
            .await
            .unwrap_err();
        assert_eq!(err.api_error(), Some(&ApiError::not_found()));
    }
}
