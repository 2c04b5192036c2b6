//! Projection of a profile into the fixed-field signing form.
//!
//! This mapping never fails: missing inputs become empty strings. The field
//! names mirror the signing template exactly, so the serialized form can be
//! sent to the e-signature provider as-is.

use serde::{Deserialize, Serialize};

use crate::profile::VeteranProfile;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatementFormData {
    pub first_name: String,
    pub middle_initial: String,
    pub last_name: String,
    #[serde(rename = "SSN1")]
    pub ssn1: String,
    #[serde(rename = "SSN2")]
    pub ssn2: String,
    #[serde(rename = "SSN3")]
    pub ssn3: String,
    // The signing template carries a second, identical SSN region.
    #[serde(rename = "SSN4")]
    pub ssn4: String,
    #[serde(rename = "SSN5")]
    pub ssn5: String,
    #[serde(rename = "SSN6")]
    pub ssn6: String,
    pub file_number: String,
    pub birth_month: String,
    pub birth_day: String,
    pub birth_year: String,
    pub veterans_service_number: String,
    pub phone1: String,
    pub phone2: String,
    pub phone3: String,
    pub email: String,
    pub email2: String,
    /// Complete address for the e-signature submitter, not a template field.
    pub full_email: String,
    pub street_address: String,
    pub apt_num: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code1: String,
    pub zip_code2: String,
    pub remarks1: String,
    pub remarks2: String,
}

impl StatementFormData {
    pub fn from_profile(profile: &VeteranProfile) -> Self {
        let ssn = digits(&profile.ssn);
        let phone = digits(&profile.phone);
        let zip = digits(&profile.address.zip_code);
        let (birth_month, birth_day, birth_year) = split_date(&profile.date_of_birth);
        let statement = profile.claim_statement.as_deref().unwrap_or("");

        let ssn1 = slice(&ssn, 0, 3);
        let ssn2 = slice(&ssn, 3, 5);
        let ssn3 = slice(&ssn, 5, 9);

        Self {
            first_name: profile.first_name.clone(),
            middle_initial: profile.middle_initial.clone(),
            last_name: profile.last_name.clone(),
            ssn4: ssn1.clone(),
            ssn5: ssn2.clone(),
            ssn6: ssn3.clone(),
            ssn1,
            ssn2,
            ssn3,
            file_number: profile.file_number.clone(),
            birth_month,
            birth_day,
            birth_year,
            veterans_service_number: profile.veterans_service_number.clone(),
            phone1: slice(&phone, 0, 3),
            phone2: slice(&phone, 3, 6),
            phone3: slice(&phone, 6, 10),
            email: slice(&profile.email, 0, 20),
            email2: slice(&profile.email, 20, 40),
            full_email: profile.email.clone(),
            street_address: profile.address.street.clone(),
            apt_num: profile.address.apt.clone(),
            city: profile.address.city.clone(),
            state: state_abbreviation(&profile.address.state),
            country: country_code(&profile.address.country),
            zip_code1: slice(&zip, 0, 5),
            // The template's extended-ZIP box is left blank; the first five
            // digits are the whole ZIP on the form.
            zip_code2: String::new(),
            remarks1: slice(statement, 0, 2000),
            remarks2: slice(statement, 2000, 4000),
        }
    }
}

fn digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Characters `start..end`, silently shortened when the input runs out.
fn slice(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end.saturating_sub(start)).collect()
}

/// Split MM/DD/YYYY into zero-padded month and day plus the year. Anything
/// that is not three slash-separated parts maps to empty strings.
fn split_date(date: &str) -> (String, String, String) {
    let parts: Vec<&str> = date.split('/').collect();
    if parts.len() != 3 {
        return (String::new(), String::new(), String::new());
    }
    (
        format!("{:0>2}", parts[0]),
        format!("{:0>2}", parts[1]),
        parts[2].to_string(),
    )
}

fn country_code(country: &str) -> String {
    let trimmed = country.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("usa") {
        return "US".to_string();
    }
    slice(trimmed, 0, 2).to_uppercase()
}

/// Two-letter postal abbreviation for a state. Two-letter input passes
/// through uppercased; unknown names fall back to their first two letters.
pub fn state_abbreviation(state: &str) -> String {
    let trimmed = state.trim();
    if trimmed.len() == 2 {
        return trimmed.to_uppercase();
    }

    let code = match trimmed.to_lowercase().as_str() {
        "alabama" => "AL",
        "alaska" => "AK",
        "arizona" => "AZ",
        "arkansas" => "AR",
        "california" => "CA",
        "colorado" => "CO",
        "connecticut" => "CT",
        "delaware" => "DE",
        "florida" => "FL",
        "georgia" => "GA",
        "hawaii" => "HI",
        "idaho" => "ID",
        "illinois" => "IL",
        "indiana" => "IN",
        "iowa" => "IA",
        "kansas" => "KS",
        "kentucky" => "KY",
        "louisiana" => "LA",
        "maine" => "ME",
        "maryland" => "MD",
        "massachusetts" => "MA",
        "michigan" => "MI",
        "minnesota" => "MN",
        "mississippi" => "MS",
        "missouri" => "MO",
        "montana" => "MT",
        "nebraska" => "NE",
        "nevada" => "NV",
        "new hampshire" => "NH",
        "new jersey" => "NJ",
        "new mexico" => "NM",
        "new york" => "NY",
        "north carolina" => "NC",
        "north dakota" => "ND",
        "ohio" => "OH",
        "oklahoma" => "OK",
        "oregon" => "OR",
        "pennsylvania" => "PA",
        "rhode island" => "RI",
        "south carolina" => "SC",
        "south dakota" => "SD",
        "tennessee" => "TN",
        "texas" => "TX",
        "utah" => "UT",
        "vermont" => "VT",
        "virginia" => "VA",
        "washington" => "WA",
        "west virginia" => "WV",
        "wisconsin" => "WI",
        "wyoming" => "WY",
        "district of columbia" => "DC",
        "puerto rico" => "PR",
        "guam" => "GU",
        "virgin islands" => "VI",
        _ => return slice(trimmed, 0, 2).to_uppercase(),
    };
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::VeteranProfile;

    fn sample_profile() -> VeteranProfile {
        let mut profile = VeteranProfile::default();
        profile.set_field("first_name", "Darin");
        profile.set_field("last_name", "Manley");
        profile.set_field("email", "darin.j.manley@gmail.com");
        profile.set_field("ssn", "123-45-6789");
        profile.set_field("phone", "555-123-4567");
        profile.set_field("date_of_birth", "01/15/1985");
        profile.set_field("address.street", "123 Main Street");
        profile.set_field("address.city", "Springfield");
        profile.set_field("address.state", "Illinois");
        profile.set_field("address.zip_code", "62701-1234");
        profile.claim_statement = Some("I respectfully request review of my claim.".to_string());
        profile
    }

    #[test]
    fn ssn_splits_into_three_groups_twice() {
        let form = StatementFormData::from_profile(&sample_profile());
        assert_eq!(form.ssn1, "123");
        assert_eq!(form.ssn2, "45");
        assert_eq!(form.ssn3, "6789");
        assert_eq!(form.ssn4, form.ssn1);
        assert_eq!(form.ssn5, form.ssn2);
        assert_eq!(form.ssn6, form.ssn3);
    }

    #[test]
    fn phone_splits_area_exchange_line() {
        let form = StatementFormData::from_profile(&sample_profile());
        assert_eq!(form.phone1, "555");
        assert_eq!(form.phone2, "123");
        assert_eq!(form.phone3, "4567");
    }

    #[test]
    fn nine_digit_zip_keeps_first_five_and_drops_the_extension() {
        let form = StatementFormData::from_profile(&sample_profile());
        assert_eq!(form.zip_code1, "62701");
        assert_eq!(form.zip_code2, "");
    }

    #[test]
    fn date_parts_are_zero_padded() {
        let mut profile = sample_profile();
        profile.set_field("date_of_birth", "1/5/1985");
        let form = StatementFormData::from_profile(&profile);
        assert_eq!(form.birth_month, "01");
        assert_eq!(form.birth_day, "05");
        assert_eq!(form.birth_year, "1985");
    }

    #[test]
    fn long_email_overflows_into_second_field() {
        let mut profile = sample_profile();
        profile.set_field("email", "a.very.long.email.address@example-domain.com");
        let form = StatementFormData::from_profile(&profile);
        assert_eq!(form.email, "a.very.long.email.ad");
        assert_eq!(form.email2, "dress@example-domain");
        assert_eq!(form.full_email, "a.very.long.email.address@example-domain.com");
    }

    #[test]
    fn long_statement_splits_across_remarks() {
        let mut profile = sample_profile();
        profile.claim_statement = Some("x".repeat(2500));
        let form = StatementFormData::from_profile(&profile);
        assert_eq!(form.remarks1.len(), 2000);
        assert_eq!(form.remarks2.len(), 500);
    }

    #[test]
    fn missing_inputs_become_empty_strings() {
        let form = StatementFormData::from_profile(&VeteranProfile::default());
        assert_eq!(form.ssn1, "");
        assert_eq!(form.birth_year, "");
        assert_eq!(form.zip_code1, "");
        assert_eq!(form.remarks1, "");
        // an absent country still normalizes
        assert_eq!(form.country, "US");
    }

    #[test]
    fn state_lookup_covers_names_codes_and_unknowns() {
        assert_eq!(state_abbreviation("california"), "CA");
        assert_eq!(state_abbreviation("New York"), "NY");
        assert_eq!(state_abbreviation("il"), "IL");
        assert_eq!(state_abbreviation("Atlantis"), "AT");
        assert_eq!(state_abbreviation("puerto rico"), "PR");
    }

    #[test]
    fn country_normalizes_to_two_letters() {
        assert_eq!(country_code("USA"), "US");
        assert_eq!(country_code(""), "US");
        assert_eq!(country_code("Canada"), "CA");
    }

    #[test]
    fn serialized_field_names_match_the_template() {
        let form = StatementFormData::from_profile(&sample_profile());
        let value = serde_json::to_value(&form).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "FirstName", "SSN1", "SSN6", "BirthMonth", "Phone3", "Email2", "FullEmail",
            "AptNum", "ZipCode1", "ZipCode2", "Remarks2",
        ] {
            assert!(object.contains_key(key), "missing field {key}");
        }
    }
}
