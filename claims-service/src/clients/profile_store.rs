//! Bridge to the external profile store.
//!
//! The store speaks its own flattened shape (snake_case top-level keys with
//! camelCase nested objects), so the in-memory profile is projected into a
//! wire record on save and folded back on fetch.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ClientError;
use crate::profile::{Address, ClaimInfo, MilitaryService, VeteranProfile};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAddress {
    street: String,
    apt: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMilitaryService {
    branch: String,
    service_years: String,
    rank: String,
    discharge_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireClaimInfo {
    primary_condition: String,
    condition_type: String,
    service_connection: String,
    symptoms: String,
    medical_treatment: String,
    work_impact: String,
    witnesses: String,
    additional_info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireProfile {
    email: String,
    first_name: String,
    middle_initial: String,
    last_name: String,
    ssn: String,
    phone: String,
    date_of_birth: Option<String>,
    file_number: String,
    veterans_service_number: String,
    military_service: WireMilitaryService,
    claim_info: WireClaimInfo,
    address: WireAddress,
    claim_statement: Option<String>,
    has_signed_up: bool,
    has_paid: bool,
}

#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    profile: WireProfile,
}

impl WireProfile {
    fn from_profile(profile: &VeteranProfile) -> Self {
        Self {
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            middle_initial: profile.middle_initial.clone(),
            last_name: profile.last_name.clone(),
            ssn: profile.ssn.clone(),
            phone: profile.phone.clone(),
            date_of_birth: if profile.date_of_birth.is_empty() {
                None
            } else {
                Some(profile.date_of_birth.clone())
            },
            file_number: profile.file_number.clone(),
            veterans_service_number: profile.veterans_service_number.clone(),
            military_service: WireMilitaryService {
                branch: profile.military_service.branch.clone(),
                service_years: profile.military_service.service_years.clone(),
                rank: profile.military_service.rank.clone(),
                discharge_type: profile.military_service.discharge_type.clone(),
            },
            claim_info: WireClaimInfo {
                primary_condition: profile.claim_info.primary_condition.clone(),
                condition_type: profile.claim_info.condition_type.clone(),
                service_connection: profile.claim_info.service_connection.clone(),
                symptoms: profile.claim_info.symptoms.clone(),
                medical_treatment: profile.claim_info.medical_treatment.clone(),
                work_impact: profile.claim_info.work_impact.clone(),
                witnesses: profile.claim_info.witnesses.clone(),
                additional_info: profile.claim_info.additional_info.clone(),
            },
            address: WireAddress {
                street: profile.address.street.clone(),
                apt: profile.address.apt.clone(),
                city: profile.address.city.clone(),
                state: profile.address.state.clone(),
                zip_code: profile.address.zip_code.clone(),
                country: if profile.address.country.is_empty() {
                    "USA".to_string()
                } else {
                    profile.address.country.clone()
                },
            },
            claim_statement: profile.claim_statement.clone(),
            has_signed_up: profile.has_signed_up,
            has_paid: profile.has_paid,
        }
    }

    fn into_profile(self) -> VeteranProfile {
        VeteranProfile {
            email: self.email,
            first_name: self.first_name,
            middle_initial: self.middle_initial,
            last_name: self.last_name,
            ssn: self.ssn,
            phone: self.phone,
            date_of_birth: self.date_of_birth.unwrap_or_default(),
            file_number: self.file_number,
            veterans_service_number: self.veterans_service_number,
            military_service: MilitaryService {
                branch: self.military_service.branch,
                service_years: self.military_service.service_years,
                rank: self.military_service.rank,
                discharge_type: self.military_service.discharge_type,
            },
            claim_info: ClaimInfo {
                primary_condition: self.claim_info.primary_condition,
                condition_type: self.claim_info.condition_type,
                service_connection: self.claim_info.service_connection,
                symptoms: self.claim_info.symptoms,
                medical_treatment: self.claim_info.medical_treatment,
                work_impact: self.claim_info.work_impact,
                witnesses: self.claim_info.witnesses,
                additional_info: self.claim_info.additional_info,
            },
            address: Address {
                street: self.address.street,
                apt: self.address.apt,
                city: self.address.city,
                state: self.address.state,
                zip_code: self.address.zip_code,
                country: self.address.country,
            },
            claim_statement: self.claim_statement,
            has_signed_up: self.has_signed_up,
            has_paid: self.has_paid,
        }
    }
}

pub struct ProfileStoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProfileStoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Reads `PROFILE_STORE_URL`. Missing configuration is a blocking error.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("PROFILE_STORE_URL")
            .map_err(|_| ClientError::Config("PROFILE_STORE_URL not set".to_string()))?;
        Ok(Self::new(base_url))
    }

    /// Create or update the stored profile. Profiles without the identity
    /// fields are skipped rather than sent, since the store keys on email.
    pub async fn save(&self, profile: &VeteranProfile) -> Result<(), ClientError> {
        if profile.email.is_empty() || profile.first_name.is_empty() || profile.last_name.is_empty()
        {
            warn!("skipping profile save, identity fields incomplete");
            return Ok(());
        }

        let record = WireProfile::from_profile(profile);
        let response = self
            .http
            .post(format!("{}/veteran-profiles", self.base_url))
            .json(&record)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::UnexpectedResponse(format!(
                "profile save returned {}",
                response.status()
            )));
        }

        debug!(email = %profile.email, "profile saved");
        Ok(())
    }

    /// Fetch the stored profile for an email. A 404 means no profile yet.
    pub async fn fetch(&self, email: &str) -> Result<Option<VeteranProfile>, ClientError> {
        let response = self
            .http
            .get(format!("{}/veteran-profiles/{}", self.base_url, email))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ClientError::UnexpectedResponse(format!(
                "profile fetch returned {}",
                response.status()
            )));
        }

        let envelope: ProfileEnvelope = response.json().await?;
        Ok(Some(envelope.profile.into_profile()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_uses_store_field_names() {
        let mut profile = VeteranProfile::default();
        profile.set_field("email", "vet@example.com");
        profile.set_field("first_name", "Darin");
        profile.set_field("last_name", "Manley");
        profile.set_field("military_service.service_years", "2003-2007");
        profile.set_field("address.zip_code", "62701");

        let value = serde_json::to_value(WireProfile::from_profile(&profile)).unwrap();
        assert_eq!(value["first_name"], "Darin");
        assert_eq!(value["military_service"]["serviceYears"], "2003-2007");
        assert_eq!(value["address"]["zipCode"], "62701");
        assert_eq!(value["address"]["country"], "USA");
        assert_eq!(value["date_of_birth"], serde_json::Value::Null);
    }

    #[test]
    fn wire_round_trip_preserves_the_profile() {
        let mut profile = VeteranProfile::default();
        profile.set_field("email", "vet@example.com");
        profile.set_field("first_name", "Darin");
        profile.set_field("last_name", "Manley");
        profile.set_field("date_of_birth", "01/15/1985");
        profile.set_field("claim_info.symptoms", "chronic pain");
        profile.set_field("address.country", "USA");
        profile.claim_statement = Some("statement".to_string());

        let restored = WireProfile::from_profile(&profile).into_profile();
        assert_eq!(restored, profile);
    }
}
