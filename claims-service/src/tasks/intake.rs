use async_trait::async_trait;
use claim_flow::{Context, NextAction, Result, Task, TaskResult};
use tracing::info;

use super::types::{load_profile, session_keys, store_profile};
use crate::profile::VeteranProfile;
use crate::questions::{AnswerKind, DEMO_ANSWERS, QUESTIONS};
use crate::validation::validate_answer;

const COMPLETION_MESSAGE: &str = "Excellent work! We've gathered all the essential information \
for your VA disability claim.\n\nYour dedication to providing thorough details will greatly \
strengthen your claim. Based on our conversation, I can now generate a comprehensive statement \
that properly documents your service-connected condition and its impact on your daily life.";

/// What one intake step decided.
#[derive(Debug)]
enum StepOutcome {
    /// The answer failed validation; re-ask with this feedback.
    Reask(String),
    /// The answer was accepted; ask the next question.
    NextQuestion {
        response: String,
        options: Vec<String>,
    },
    /// The answer was accepted and the script is finished.
    Completed { ready_to_generate: bool },
}

/// Apply one answer to the profile. The profile is only written, and the
/// caller may only advance the index, when the answer validates.
fn apply_answer(profile: &mut VeteranProfile, index: usize, answer: &str) -> StepOutcome {
    let question = &QUESTIONS[index];

    if let Err(feedback) = validate_answer(question, answer) {
        return StepOutcome::Reask(feedback);
    }

    profile.set_field(question.path, answer);

    let next_index = index + 1;
    if next_index >= QUESTIONS.len() {
        return StepOutcome::Completed {
            ready_to_generate: profile.required_fields_complete(),
        };
    }

    let next_question = &QUESTIONS[next_index];
    StepOutcome::NextQuestion {
        response: format!("Thank you for that information. {}", next_question.prompt),
        options: match next_question.kind {
            AnswerKind::Choice => next_question.choices.iter().map(|s| s.to_string()).collect(),
            _ => Vec::new(),
        },
    }
}

/// Walks the fixed question script one validated answer at a time.
pub struct IntakeTask;

#[async_trait]
impl Task for IntakeTask {
    fn id(&self) -> &str {
        "intake"
    }

    async fn run(&self, context: Context) -> Result<TaskResult> {
        let mut profile = load_profile(&context).await;
        let index: usize = context
            .get(session_keys::QUESTION_INDEX)
            .await
            .unwrap_or(0)
            .min(QUESTIONS.len().saturating_sub(1));

        let raw_input: String = context
            .get(session_keys::USER_INPUT)
            .await
            .unwrap_or_default();
        let dev_mode: bool = context.get(session_keys::DEV_MODE).await.unwrap_or(false);

        // Developer mode answers the script with canned data.
        let input = if raw_input.trim().is_empty() && dev_mode {
            DEMO_ANSWERS.get(index).copied().unwrap_or_default().to_string()
        } else {
            raw_input
        };

        if input.trim().is_empty() {
            let question = &QUESTIONS[index];
            return Ok(TaskResult::new(
                Some(question.prompt.to_string()),
                NextAction::WaitForInput,
            ));
        }

        context.add_user_message(input.clone()).await;

        match apply_answer(&mut profile, index, &input) {
            StepOutcome::Reask(feedback) => {
                info!(task_id = %self.id(), index = index, "answer rejected, re-asking");
                context.add_assistant_message(feedback.clone()).await;
                Ok(TaskResult::new(Some(feedback), NextAction::WaitForInput))
            }
            StepOutcome::NextQuestion { response, options } => {
                store_profile(&context, &profile).await;
                context.set(session_keys::QUESTION_INDEX, index + 1).await;

                if options.is_empty() {
                    context.add_assistant_message(response.clone()).await;
                } else {
                    context
                        .add_assistant_message_with_options(response.clone(), options)
                        .await;
                }
                Ok(TaskResult::new(Some(response), NextAction::WaitForInput))
            }
            StepOutcome::Completed { ready_to_generate } => {
                store_profile(&context, &profile).await;
                context
                    .set(session_keys::QUESTION_INDEX, QUESTIONS.len())
                    .await;
                context.add_assistant_message(COMPLETION_MESSAGE).await;

                if ready_to_generate {
                    info!(task_id = %self.id(), "intake complete, generating statement");
                    Ok(TaskResult::new_with_status(
                        None,
                        NextAction::ContinueAndExecute,
                        Some("intake complete, generating statement".to_string()),
                    ))
                } else {
                    info!(task_id = %self.id(), "intake complete, required fields missing");
                    let response = format!(
                        "{COMPLETION_MESSAGE}\n\nIt looks like a few required details are still \
                         missing, though. Tell me anything you'd like to add or correct and we'll \
                         fill in the gaps."
                    );
                    Ok(TaskResult::new_with_status(
                        Some(response),
                        NextAction::GoTo("general_chat".to_string()),
                        Some("intake complete, required fields missing".to_string()),
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_answer_leaves_profile_untouched() {
        let mut profile = VeteranProfile::default();
        let outcome = apply_answer(&mut profile, 0, "D4rin!");

        assert!(matches!(outcome, StepOutcome::Reask(_)));
        assert_eq!(profile, VeteranProfile::default());
    }

    #[test]
    fn valid_answer_writes_field_and_asks_next() {
        let mut profile = VeteranProfile::default();
        let outcome = apply_answer(&mut profile, 0, "Darin");

        assert_eq!(profile.first_name, "Darin");
        match outcome {
            StepOutcome::NextQuestion { response, .. } => {
                assert!(response.contains(QUESTIONS[1].prompt));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn choice_question_offers_its_options() {
        let mut profile = VeteranProfile::default();
        // Answer the question before the branch question.
        let branch_index = QUESTIONS
            .iter()
            .position(|q| q.path == "military_service.branch")
            .unwrap();
        let outcome = apply_answer(&mut profile, branch_index - 1, "01/15/1985");

        match outcome {
            StepOutcome::NextQuestion { options, .. } => {
                assert!(options.contains(&"Army".to_string()));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn demo_answers_complete_the_script_and_trigger_generation() {
        let mut profile = VeteranProfile::default();
        let mut outcome = None;
        for (index, answer) in DEMO_ANSWERS.iter().enumerate() {
            outcome = Some(apply_answer(&mut profile, index, answer));
            if let Some(StepOutcome::Reask(feedback)) = &outcome {
                panic!("demo answer {index} rejected: {feedback}");
            }
        }

        assert!(matches!(
            outcome,
            Some(StepOutcome::Completed {
                ready_to_generate: true
            })
        ));
        assert_eq!(profile.address.zip_code, "62701");
        assert!(profile.required_fields_complete());
    }

    #[test]
    fn completing_with_missing_required_fields_blocks_generation() {
        let mut profile = VeteranProfile::default();
        for (index, answer) in DEMO_ANSWERS.iter().enumerate().take(QUESTIONS.len() - 1) {
            apply_answer(&mut profile, index, answer);
        }
        profile.email.clear();

        let outcome = apply_answer(&mut profile, QUESTIONS.len() - 1, "62701");
        assert!(matches!(
            outcome,
            StepOutcome::Completed {
                ready_to_generate: false
            }
        ));
    }

    #[tokio::test]
    async fn question_index_only_advances_on_valid_answers() {
        let context = Context::new();
        context.set(session_keys::QUESTION_INDEX, 0usize).await;
        context.set(session_keys::USER_INPUT, "not a valid name 123").await;

        IntakeTask.run(context.clone()).await.unwrap();
        let index: usize = context.get(session_keys::QUESTION_INDEX).await.unwrap_or(0);
        assert_eq!(index, 0);

        context.set(session_keys::USER_INPUT, "Darin").await;
        IntakeTask.run(context.clone()).await.unwrap();
        let index: usize = context.get(session_keys::QUESTION_INDEX).await.unwrap();
        assert_eq!(index, 1);
    }
}
