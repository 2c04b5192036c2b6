use serde::{Deserialize, Serialize};

/// Mailing address, always kept as a four-part object plus apt/country.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub apt: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilitaryService {
    pub branch: String,
    pub service_years: String,
    pub rank: String,
    pub discharge_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimInfo {
    pub primary_condition: String,
    pub condition_type: String,
    pub service_connection: String,
    pub symptoms: String,
    pub medical_treatment: String,
    pub work_impact: String,
    pub witnesses: String,
    pub additional_info: String,
}

/// Everything collected about a veteran over the course of a session.
///
/// Created empty, mutated one validated answer (or edit directive) at a time,
/// and cleared only when the user explicitly starts a new claim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VeteranProfile {
    pub email: String,
    pub first_name: String,
    pub middle_initial: String,
    pub last_name: String,
    pub ssn: String,
    pub phone: String,
    pub date_of_birth: String,
    pub file_number: String,
    pub veterans_service_number: String,
    pub address: Address,
    pub military_service: MilitaryService,
    pub claim_info: ClaimInfo,
    pub claim_statement: Option<String>,
    pub has_signed_up: bool,
    pub has_paid: bool,
}

impl VeteranProfile {
    /// Read a field by dot path, e.g. `address.city`.
    pub fn get_field(&self, path: &str) -> Option<&str> {
        let value = match path {
            "email" => &self.email,
            "first_name" => &self.first_name,
            "middle_initial" => &self.middle_initial,
            "last_name" => &self.last_name,
            "ssn" => &self.ssn,
            "phone" => &self.phone,
            "date_of_birth" => &self.date_of_birth,
            "file_number" => &self.file_number,
            "veterans_service_number" => &self.veterans_service_number,
            "address.street" => &self.address.street,
            "address.apt" => &self.address.apt,
            "address.city" => &self.address.city,
            "address.state" => &self.address.state,
            "address.zip_code" => &self.address.zip_code,
            "address.country" => &self.address.country,
            "military_service.branch" => &self.military_service.branch,
            "military_service.service_years" => &self.military_service.service_years,
            "military_service.rank" => &self.military_service.rank,
            "military_service.discharge_type" => &self.military_service.discharge_type,
            "claim_info.primary_condition" => &self.claim_info.primary_condition,
            "claim_info.condition_type" => &self.claim_info.condition_type,
            "claim_info.service_connection" => &self.claim_info.service_connection,
            "claim_info.symptoms" => &self.claim_info.symptoms,
            "claim_info.medical_treatment" => &self.claim_info.medical_treatment,
            "claim_info.work_impact" => &self.claim_info.work_impact,
            "claim_info.witnesses" => &self.claim_info.witnesses,
            "claim_info.additional_info" => &self.claim_info.additional_info,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Write a field by dot path. Returns false for unknown paths, including
    /// a bare `address` (only the four sub-fields are writable).
    pub fn set_field(&mut self, path: &str, value: &str) -> bool {
        let value = value.trim().to_string();
        match path {
            "email" => self.email = value,
            "first_name" => self.first_name = value,
            "middle_initial" => self.middle_initial = value,
            "last_name" => self.last_name = value,
            "ssn" => self.ssn = value,
            "phone" => self.phone = value,
            "date_of_birth" => self.date_of_birth = value,
            "file_number" => self.file_number = value,
            "veterans_service_number" => self.veterans_service_number = value,
            "address.street" => self.address.street = value,
            "address.apt" => self.address.apt = value,
            "address.city" => self.address.city = value,
            "address.state" => self.address.state = value,
            "address.zip_code" => self.address.zip_code = value,
            "address.country" => self.address.country = value,
            "military_service.branch" => self.military_service.branch = value,
            "military_service.service_years" => self.military_service.service_years = value,
            "military_service.rank" => self.military_service.rank = value,
            "military_service.discharge_type" => self.military_service.discharge_type = value,
            "claim_info.primary_condition" => self.claim_info.primary_condition = value,
            "claim_info.condition_type" => self.claim_info.condition_type = value,
            "claim_info.service_connection" => self.claim_info.service_connection = value,
            "claim_info.symptoms" => self.claim_info.symptoms = value,
            "claim_info.medical_treatment" => self.claim_info.medical_treatment = value,
            "claim_info.work_impact" => self.claim_info.work_impact = value,
            "claim_info.witnesses" => self.claim_info.witnesses = value,
            "claim_info.additional_info" => self.claim_info.additional_info = value,
            _ => return false,
        }
        true
    }

    /// The fields a statement cannot be generated without.
    pub fn required_fields_complete(&self) -> bool {
        const REQUIRED: &[&str] = &[
            "first_name",
            "last_name",
            "email",
            "ssn",
            "phone",
            "military_service.branch",
            "military_service.service_years",
            "claim_info.primary_condition",
            "claim_info.service_connection",
        ];

        REQUIRED.iter().all(|path| {
            self.get_field(path)
                .map(|value| !value.trim().is_empty())
                .unwrap_or(false)
        })
    }
}

/// Human-readable name for a field path, used in edit confirmations.
pub fn field_display_name(path: &str) -> &str {
    match path {
        "first_name" => "first name",
        "last_name" => "last name",
        "middle_initial" => "middle initial",
        "email" => "email address",
        "phone" => "phone number",
        "ssn" => "Social Security Number",
        "date_of_birth" => "date of birth",
        "file_number" => "VA file number",
        "veterans_service_number" => "veterans service number",
        "address.street" => "street address",
        "address.city" => "city",
        "address.state" => "state",
        "address.zip_code" => "ZIP code",
        "address.apt" => "apartment number",
        "address.country" => "country",
        "military_service.branch" => "service branch",
        "military_service.service_years" => "service years",
        "military_service.rank" => "military rank",
        "military_service.discharge_type" => "discharge type",
        "claim_info.primary_condition" => "primary condition",
        "claim_info.condition_type" => "condition type",
        "claim_info.service_connection" => "service connection",
        "claim_info.symptoms" => "symptoms",
        "claim_info.medical_treatment" => "medical treatment",
        "claim_info.work_impact" => "work impact",
        "claim_info.witnesses" => "witnesses",
        "claim_info.additional_info" => "additional information",
        other => other.rsplit('.').next().unwrap_or(other),
    }
}
