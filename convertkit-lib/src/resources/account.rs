use serde_json::Value;

use crate::{Client, Result};

/// Account endpoints
#[derive(Debug, Clone, Copy)]
pub struct Account<'a> {
    client: &'a Client,
}

impl<'a> Account<'a> {
    pub(crate) const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Name, plan and primary email of the account the credentials belong to.
    ///
    /// # Errors
    ///
    /// Fails if the call fails.
    pub async fn current(&self) -> Result<Value> {
        self.client.get("account", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_utils::mock_server;
    use wiremock::ResponseTemplate;

    use crate::test_utils::mock_client;

    #[tokio::test]
    async fn test_current_account() {
        let server = mock_server!(
            "GET",
            "/account",
            ResponseTemplate::new(200).set_body_json(json!({
                "name": "Acme Newsletter",
                "plan_type": "creator",
                "primary_email_address": "owner@acme.test"
            }))
        );

        let account = mock_client(&server).account().current().await.unwrap();
        assert_eq!(account["name"], "Acme Newsletter");
    }
}
