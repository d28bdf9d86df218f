use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Subscription, take_field};
use crate::pagination::collect_all;
use crate::{Client, Result, SubscriptionFilter};

/// A form or landing page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Form {
    /// Form ID
    pub id: u64,
    /// Internal name
    pub name: Option<String>,
    /// Creation time, ISO 8601
    pub created_at: Option<String>,
    /// `embed` or `hosted`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Hosted URL
    pub url: Option<String>,
    /// Embed script URL
    pub embed_js: Option<String>,
    /// Embed page URL
    pub embed_url: Option<String>,
    /// Public title
    pub title: Option<String>,
    /// Public description
    pub description: Option<String>,
    /// Label of the sign-up button
    pub sign_up_button_text: Option<String>,
    /// Message shown after signing up
    pub success_message: Option<String>,
}

/// Details of someone signing up through a form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSubscriber {
    /// Email address
    pub email: String,
    /// First name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Custom field values keyed by field key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Map<String, Value>>,
    /// IDs of tags to apply as well
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<u64>,
}

impl NewSubscriber {
    /// A sign-up with only an email address
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }
}

impl Form {
    /// Subscribe someone to this form.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn add_subscriber(
        &self,
        client: &Client,
        details: &NewSubscriber,
    ) -> Result<Subscription> {
        client.forms().add_subscriber(self.id, details).await
    }

    /// Every subscription through this form.
    ///
    /// # Errors
    ///
    /// Fails if any page request fails.
    pub async fn subscriptions(
        &self,
        client: &Client,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<Subscription>> {
        client.forms().subscriptions(self.id, filter).await
    }
}

/// Form endpoints
#[derive(Debug, Clone, Copy)]
pub struct Forms<'a> {
    client: &'a Client,
}

impl<'a> Forms<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// All forms and landing pages.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn all(&self) -> Result<Vec<Form>> {
        let body = self.client.get("forms", &[]).await?;
        take_field(body, "forms")
    }

    /// Subscribe someone to a form.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn add_subscriber(&self, form_id: u64, details: &NewSubscriber) -> Result<Subscription> {
        let body = serde_json::to_value(details)?;
        let body = self
            .client
            .post(&format!("forms/{form_id}/subscribe"), body, &[])
            .await?;
        take_field(body, "subscription")
    }

    /// Every subscription through a form.
    ///
    /// # Errors
    ///
    /// Fails if any page request fails.
    pub async fn subscriptions(
        &self,
        form_id: u64,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<Subscription>> {
        collect_all(
            self.client,
            format!("forms/{form_id}/subscriptions"),
            filter.to_query(),
            "subscriptions",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::SortOrder;
    use crate::test_utils::mock_client;

    #[tokio::test]
    async fn test_all_forms() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forms"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "forms": [{
                    "id": 12,
                    "name": "Newsletter",
                    "type": "embed",
                    "sign_up_button_text": "Join"
                }]
            })))
            .mount(&server)
            .await;

        let forms = mock_client(&server).forms().all().await.unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].kind.as_deref(), Some("embed"));
        assert_eq!(forms[0].sign_up_button_text.as_deref(), Some("Join"));
    }

    #[tokio::test]
    async fn test_add_subscriber_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/forms/12/subscribe"))
            .and(body_json(json!({
                "email": "jon@example.com",
                "first_name": "Jon",
                "tags": [1, 2]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "subscription": {
                    "id": 77,
                    "state": "inactive",
                    "subscribable_id": 12,
                    "subscribable_type": "form",
                    "subscriber": { "id": 3 }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let form = Form {
            id: 12,
            ..Form::default()
        };
        let details = NewSubscriber {
            first_name: Some("Jon".into()),
            tags: vec![1, 2],
            ..NewSubscriber::new("jon@example.com")
        };

        let subscription = form.add_subscriber(&client, &details).await.unwrap();
        assert_eq!(subscription.id, Some(77));
        assert_eq!(subscription.state.as_deref(), Some("inactive"));
    }

    #[tokio::test]
    async fn test_subscriptions_are_paginated() {
        let server = MockServer::start().await;
        for page in 1..=2 {
            Mock::given(method("GET"))
                .and(path("/forms/12/subscriptions"))
                .and(query_param("sort_order", "desc"))
                .and(query_param("page", page.to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "total_pages": 2,
                    "page": page,
                    "subscriptions": [{ "id": page }]
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = mock_client(&server);
        let filter = SubscriptionFilter::default().order(SortOrder::Desc);
        let subscriptions = client.forms().subscriptions(12, &filter).await.unwrap();
        let ids: Vec<_> = subscriptions.iter().filter_map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
