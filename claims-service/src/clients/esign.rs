//! E-signature handoff.
//!
//! Creates a submission on the signing provider from the assembled form and
//! returns the hosted signing URL for the veteran to complete in a separate
//! window. Completion comes back as a screen event, not through this client.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::ClientError;
use crate::assembly::StatementFormData;

const DEFAULT_API_URL: &str = "https://api.docuseal.com";
const DEFAULT_PORTAL_URL: &str = "https://docuseal.com";

/// The submitter role configured on the signing template.
const SUBMITTER_ROLE: &str = "First Party";

#[derive(Debug, Serialize)]
struct FormField {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct SubmitterRecord {
    id: i64,
    submission_id: i64,
    slug: String,
}

/// Everything the caller needs to hand the user off to signing.
#[derive(Debug, Clone, Serialize)]
pub struct SigningHandoff {
    pub submission_slug: String,
    pub claim_id: i64,
    pub submitter_id: i64,
    pub signing_url: String,
}

pub struct EsignClient {
    http: reqwest::Client,
    api_url: String,
    portal_url: String,
    api_key: String,
    template_id: i64,
}

impl EsignClient {
    pub fn new(
        api_url: impl Into<String>,
        portal_url: impl Into<String>,
        api_key: impl Into<String>,
        template_id: i64,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            portal_url: portal_url.into(),
            api_key: api_key.into(),
            template_id,
        }
    }

    /// Reads `ESIGN_API_KEY` and `ESIGN_TEMPLATE_ID` (plus optional
    /// `ESIGN_API_URL` / `ESIGN_PORTAL_URL`). Missing configuration is a
    /// blocking error.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_key = std::env::var("ESIGN_API_KEY")
            .map_err(|_| ClientError::Config("ESIGN_API_KEY not set".to_string()))?;
        let template_id = std::env::var("ESIGN_TEMPLATE_ID")
            .map_err(|_| ClientError::Config("ESIGN_TEMPLATE_ID not set".to_string()))?
            .parse::<i64>()
            .map_err(|_| ClientError::Config("ESIGN_TEMPLATE_ID is not a number".to_string()))?;
        let api_url =
            std::env::var("ESIGN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let portal_url =
            std::env::var("ESIGN_PORTAL_URL").unwrap_or_else(|_| DEFAULT_PORTAL_URL.to_string());
        Ok(Self::new(api_url, portal_url, api_key, template_id))
    }

    /// Create a submission pre-filled with the assembled form.
    pub async fn create_submission(
        &self,
        form: &StatementFormData,
        submitter_email: &str,
    ) -> Result<SigningHandoff, ClientError> {
        let payload = json!({
            "template_id": self.template_id,
            "send_email": true,
            "submitters": [{
                "role": SUBMITTER_ROLE,
                "email": submitter_email,
                "fields": template_fields(form),
            }],
        });

        let response = self
            .http
            .post(format!("{}/submissions", self.api_url))
            .header("X-Auth-Token", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::UnexpectedResponse(format!(
                "submission create returned {}",
                response.status()
            )));
        }

        // The provider answers with the list of created submitters.
        let submitters: Vec<SubmitterRecord> = response.json().await?;
        let submitter = submitters
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::UnexpectedResponse("no submitters returned".to_string()))?;

        info!(
            submission_id = submitter.submission_id,
            slug = %submitter.slug,
            "signing submission created"
        );

        Ok(SigningHandoff {
            signing_url: format!("{}/s/{}", self.portal_url, submitter.slug),
            submission_slug: submitter.slug,
            claim_id: submitter.submission_id,
            submitter_id: submitter.id,
        })
    }
}

/// The form flattened into the provider's name/value field list. `FullEmail`
/// addresses the submitter, not a template field, so it is excluded.
fn template_fields(form: &StatementFormData) -> Vec<FormField> {
    let value = serde_json::to_value(form).expect("form serializes");
    let object = value.as_object().expect("form is an object");

    object
        .iter()
        .filter(|(name, _)| name.as_str() != "FullEmail")
        .map(|(name, value)| FormField {
            name: name.clone(),
            value: value.as_str().unwrap_or_default().to_string(),
        })
        .collect()
}
