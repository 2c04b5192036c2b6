//! Per-answer validation for the scripted intake.
//!
//! A failed validation returns the clarifying feedback to show the user; the
//! question index must not advance and the profile must not be written.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::profile::field_display_name;
use crate::questions::{AnswerKind, QuestionDef};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s'\-]+$").expect("name pattern"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static SSN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}-\d{2}-\d{4}$").expect("ssn pattern"));
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|1[0-2])/(0[1-9]|[12]\d|3[01])/\d{4}$").expect("date pattern")
});

/// Validate `answer` against the question's answer kind. Returns the
/// clarifying message to re-ask with on failure.
pub fn validate_answer(question: &QuestionDef, answer: &str) -> Result<(), String> {
    let answer = answer.trim();

    if answer.is_empty() {
        return Err(format!(
            "{} cannot be empty. {}",
            capitalize(field_display_name(question.path)),
            question.prompt
        ));
    }

    match question.kind {
        AnswerKind::Name => {
            if !NAME_RE.is_match(answer) {
                return Err(format!(
                    "Please enter a valid {} using only letters, spaces, hyphens, and apostrophes. {}",
                    field_display_name(question.path),
                    question.prompt
                ));
            }
        }
        AnswerKind::Email => {
            if !EMAIL_RE.is_match(answer) {
                return Err(format!(
                    "Please enter a valid email address (for example: john.smith@email.com). {}",
                    question.prompt
                ));
            }
        }
        AnswerKind::Ssn => {
            if !SSN_RE.is_match(answer) {
                return Err(format!(
                    "Please enter your Social Security Number in the correct format: XXX-XX-XXXX (for example: 123-45-6789). {}",
                    question.prompt
                ));
            }
        }
        AnswerKind::Phone => {
            let digits = answer.chars().filter(char::is_ascii_digit).count();
            if digits < 10 {
                return Err(format!(
                    "Please enter a phone number with area code (for example: 555-123-4567). {}",
                    question.prompt
                ));
            }
        }
        AnswerKind::Date => {
            if !DATE_RE.is_match(answer) {
                return Err(format!(
                    "Please enter your date of birth in MM/DD/YYYY format (for example: 01/15/1985). {}",
                    question.prompt
                ));
            }
            if !is_real_calendar_date(answer) {
                return Err(format!(
                    "Please enter a valid date in MM/DD/YYYY format. {}",
                    question.prompt
                ));
            }
        }
        AnswerKind::Text | AnswerKind::LongText | AnswerKind::Choice => {}
    }

    Ok(())
}

/// True when an MM/DD/YYYY string names a date that exists on the calendar.
fn is_real_calendar_date(answer: &str) -> bool {
    let mut parts = answer.splitn(3, '/');
    let (Some(month), Some(day), Some(year)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let (Ok(month), Ok(day), Ok(year)) =
        (month.parse::<u32>(), day.parse::<u32>(), year.parse::<i32>())
    else {
        return false;
    };
    NaiveDate::from_ymd_opt(year, month, day).is_some()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
