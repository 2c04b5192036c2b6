//! The fixed intake script: one question per profile field, asked in order.

/// How an answer to a question is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    /// Letters, spaces, hyphens and apostrophes only.
    Name,
    /// Any non-empty text.
    Text,
    /// Any non-empty text, expected to run long.
    LongText,
    Email,
    /// XXX-XX-XXXX.
    Ssn,
    /// At least ten digits once punctuation is stripped.
    Phone,
    /// MM/DD/YYYY, and a real calendar date.
    Date,
    /// Free text with suggested quick replies.
    Choice,
}

pub struct QuestionDef {
    /// Profile field path the validated answer is written to.
    pub path: &'static str,
    pub prompt: &'static str,
    pub kind: AnswerKind,
    pub choices: &'static [&'static str],
}

pub const QUESTIONS: &[QuestionDef] = &[
    QuestionDef {
        path: "first_name",
        prompt: "What's your first name?",
        kind: AnswerKind::Name,
        choices: &[],
    },
    QuestionDef {
        path: "last_name",
        prompt: "What's your last name?",
        kind: AnswerKind::Name,
        choices: &[],
    },
    QuestionDef {
        path: "email",
        prompt: "What's your email address?",
        kind: AnswerKind::Email,
        choices: &[],
    },
    QuestionDef {
        path: "ssn",
        prompt: "What's your Social Security Number? Please enter it in the format XXX-XX-XXXX (This will be encrypted and secured)",
        kind: AnswerKind::Ssn,
        choices: &[],
    },
    QuestionDef {
        path: "phone",
        prompt: "What's your phone number?",
        kind: AnswerKind::Phone,
        choices: &[],
    },
    QuestionDef {
        path: "date_of_birth",
        prompt: "What's your date of birth? Please enter it in MM/DD/YYYY format (for example: 01/15/1985)",
        kind: AnswerKind::Date,
        choices: &[],
    },
    QuestionDef {
        path: "military_service.branch",
        prompt: "Which branch of the military did you serve in?",
        kind: AnswerKind::Choice,
        choices: &["Army", "Navy", "Air Force", "Marines", "Coast Guard", "Space Force"],
    },
    QuestionDef {
        path: "military_service.service_years",
        prompt: "What were your dates of service? (From - To)",
        kind: AnswerKind::Text,
        choices: &[],
    },
    QuestionDef {
        path: "military_service.rank",
        prompt: "What was your rank at discharge?",
        kind: AnswerKind::Text,
        choices: &[],
    },
    QuestionDef {
        path: "claim_info.condition_type",
        prompt: "What type of disability are you claiming?",
        kind: AnswerKind::Choice,
        choices: &[
            "Physical Injury",
            "Mental Health (PTSD/Anxiety/Depression)",
            "Hearing Loss",
            "Multiple Conditions",
            "Other",
        ],
    },
    QuestionDef {
        path: "claim_info.primary_condition",
        prompt: "What is your primary condition or injury you're claiming?",
        kind: AnswerKind::LongText,
        choices: &[],
    },
    QuestionDef {
        path: "claim_info.service_connection",
        prompt: "How is this condition connected to your military service? Please describe the incident, exposure, or circumstances.",
        kind: AnswerKind::LongText,
        choices: &[],
    },
    QuestionDef {
        path: "claim_info.symptoms",
        prompt: "What symptoms do you experience? Please describe how this condition affects your daily life.",
        kind: AnswerKind::LongText,
        choices: &[],
    },
    QuestionDef {
        path: "claim_info.medical_treatment",
        prompt: "Have you received medical treatment for this condition? If yes, please provide details.",
        kind: AnswerKind::LongText,
        choices: &[],
    },
    QuestionDef {
        path: "claim_info.work_impact",
        prompt: "How does this condition affect your ability to work or perform daily activities?",
        kind: AnswerKind::LongText,
        choices: &[],
    },
    QuestionDef {
        path: "address.street",
        prompt: "What's your complete street address? (Include house number and street name, e.g., '123 Main Street')",
        kind: AnswerKind::Text,
        choices: &[],
    },
    QuestionDef {
        path: "address.city",
        prompt: "What city do you live in?",
        kind: AnswerKind::Text,
        choices: &[],
    },
    QuestionDef {
        path: "address.state",
        prompt: "What state do you live in?",
        kind: AnswerKind::Text,
        choices: &[],
    },
    QuestionDef {
        path: "address.zip_code",
        prompt: "What's your ZIP code?",
        kind: AnswerKind::Text,
        choices: &[],
    },
];

/// Canned answers, one per question, used by developer mode to auto-drive
/// the intake for testing.
pub const DEMO_ANSWERS: &[&str] = &[
    "Darin",
    "Manley",
    "darin.j.manley@gmail.com",
    "123-45-6789",
    "555-123-4567",
    "01/15/1985",
    "Army",
    "2003-2007",
    "Staff Sergeant",
    "Physical Injury",
    "Lower back injury and chronic pain from lifting heavy equipment during deployment",
    "During my deployment in Iraq in 2005, I was required to lift heavy ammunition boxes and equipment daily. One day while loading supplies, I felt a sharp pain in my lower back. The pain persisted throughout my deployment but I continued my duties. The injury was documented by the medic but I did not receive proper treatment until after returning home.",
    "I experience constant lower back pain that ranges from 4-8 on the pain scale daily. The pain is worse in the morning and after sitting for long periods. I have muscle spasms, stiffness, and shooting pain down my left leg. I have difficulty bending, lifting anything over 20 pounds, and standing for more than 30 minutes.",
    "I have been treated by Dr. Johnson at the VA Medical Center since 2008. I receive physical therapy twice a month and take prescription pain medication (Ibuprofen 800mg). I have had two MRI scans showing disc degeneration at L4-L5. I also see a pain management specialist quarterly for injections.",
    "My back injury significantly impacts my daily life and work capacity. I can no longer perform physical labor and had to change careers from construction to desk work. I have difficulty playing with my children, doing household chores, and sleeping through the night. I use a heating pad daily and have to take frequent breaks when walking or standing.",
    "123 Main Street",
    "Springfield",
    "Illinois",
    "62701",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::VeteranProfile;

    #[test]
    fn every_question_targets_a_known_profile_field() {
        let mut profile = VeteranProfile::default();
        for question in QUESTIONS {
            assert!(
                profile.set_field(question.path, "x"),
                "question targets unknown path {}",
                question.path
            );
        }
    }

    #[test]
    fn demo_answers_cover_every_question() {
        assert_eq!(QUESTIONS.len(), DEMO_ANSWERS.len());
    }

    #[test]
    fn choice_questions_carry_their_options() {
        for question in QUESTIONS {
            match question.kind {
                AnswerKind::Choice => assert!(!question.choices.is_empty()),
                _ => assert!(question.choices.is_empty()),
            }
        }
    }
}
