//! Read-only paid-customer lookup.
//!
//! A user counts as paid exactly when the billing system holds a non-deleted
//! customer record for them; there is no other signal.

use serde::Deserialize;
use tracing::debug;

use super::ClientError;

#[derive(Debug, Deserialize)]
struct CustomerRecord {
    customer_id: Option<String>,
    deleted_at: Option<String>,
}

pub struct SubscriptionClient {
    http: reqwest::Client,
    base_url: String,
}

impl SubscriptionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Reads `SUBSCRIPTION_API_URL`. Missing configuration is a blocking
    /// error.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("SUBSCRIPTION_API_URL")
            .map_err(|_| ClientError::Config("SUBSCRIPTION_API_URL not set".to_string()))?;
        Ok(Self::new(base_url))
    }

    /// Whether a non-deleted customer record exists for this user.
    pub async fn has_paid_customer(&self, user_id: &str) -> Result<bool, ClientError> {
        let response = self
            .http
            .get(format!("{}/customers/{}", self.base_url, user_id))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(ClientError::UnexpectedResponse(format!(
                "customer lookup returned {}",
                response.status()
            )));
        }

        let record: CustomerRecord = response.json().await?;
        let paid = record.customer_id.is_some() && record.deleted_at.is_none();
        debug!(user_id = %user_id, paid = paid, "customer lookup complete");
        Ok(paid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_customers_do_not_count_as_paid() {
        let record: CustomerRecord = serde_json::from_str(
            r#"{"customer_id": "cus_123", "deleted_at": "2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(!(record.customer_id.is_some() && record.deleted_at.is_none()));

        let record: CustomerRecord =
            serde_json::from_str(r#"{"customer_id": "cus_123", "deleted_at": null}"#).unwrap();
        assert!(record.customer_id.is_some() && record.deleted_at.is_none());
    }
}
