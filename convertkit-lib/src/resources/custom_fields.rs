use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::take_field;
use crate::client::decode;
use crate::{Client, Result};

/// A custom subscriber field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomField {
    /// Field ID
    pub id: u64,
    /// Internal name, e.g. `ck_field_1_last_name`
    pub name: Option<String>,
    /// Key used in subscriber `fields`
    pub key: Option<String>,
    /// Display label
    pub label: Option<String>,
}

impl CustomField {
    /// Rename this field.
    ///
    /// # Errors
    ///
    /// Fails if the call fails. The label is only changed locally on
    /// success.
    pub async fn update(&mut self, client: &Client, label: &str) -> Result<()> {
        client.custom_fields().update(self.id, label).await?;
        self.label = Some(label.to_string());
        Ok(())
    }

    /// Delete this field along with all subscriber values for it.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn delete(self, client: &Client) -> Result<()> {
        client.custom_fields().delete(self.id).await
    }
}

/// Custom field endpoints
#[derive(Debug, Clone, Copy)]
pub struct CustomFields<'a> {
    client: &'a Client,
}

impl<'a> CustomFields<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// All custom fields.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn all(&self) -> Result<Vec<CustomField>> {
        let body = self.client.get("custom_fields", &[]).await?;
        take_field(body, "custom_fields")
    }

    /// Create a custom field.
    ///
    /// The API answers with either the new field or a list of fields. Both
    /// come back as a list.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn create(&self, label: &str) -> Result<Vec<CustomField>> {
        let body = self
            .client
            .post("custom_fields", json!({ "label": label }), &[])
            .await?;
        match body {
            Value::Array(_) => decode(body),
            _ => Ok(vec![decode(body)?]),
        }
    }

    /// Rename a custom field.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn update(&self, id: u64, label: &str) -> Result<()> {
        self.client
            .put(&format!("custom_fields/{id}"), json!({ "label": label }), &[])
            .await?;
        Ok(())
    }

    /// Delete a custom field.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client
            .delete(&format!("custom_fields/{id}"), &[])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_utils::mock_client;

    #[tokio::test]
    async fn test_create_accepts_object_or_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/custom_fields"))
            .and(body_json(json!({ "label": "Last name" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1, "name": "ck_field_1_last_name", "key": "last_name", "label": "Last name"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/custom_fields"))
            .and(body_json(json!({ "label": "Company" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 2, "key": "company", "label": "Company" },
                { "id": 3, "key": "company_size", "label": "Company size" }
            ])))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let single = client.custom_fields().create("Last name").await.unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].key.as_deref(), Some("last_name"));

        let many = client.custom_fields().create("Company").await.unwrap();
        assert_eq!(many.iter().map(|f| f.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/custom_fields/4"))
            .and(body_json(json!({ "label": "Surname" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/custom_fields/4"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let mut field = CustomField {
            id: 4,
            label: Some("Last name".into()),
            ..CustomField::default()
        };
        field.update(&client, "Surname").await.unwrap();
        assert_eq!(field.label.as_deref(), Some("Surname"));

        field.delete(&client).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_update_keeps_label() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/custom_fields/4"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Label can't be blank"
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let mut field = CustomField {
            id: 4,
            label: Some("Last name".into()),
            ..CustomField::default()
        };
        let err = field.update(&client, "").await.unwrap_err();
        assert_eq!(err.api_error().unwrap().message(), "Label can't be blank");
        assert_eq!(field.label.as_deref(), Some("Last name"));
    }
}
