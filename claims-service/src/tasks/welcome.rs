use async_trait::async_trait;
use claim_flow::{Context, NextAction, Result, Task, TaskResult};
use tracing::info;

use super::types::{intake_routes, session_keys};
use crate::questions::QUESTIONS;

const WELCOME_MESSAGE: &str = "Welcome to Vets4Claims!\n\n\
I'm your dedicated VA Claims Assistant, built by veterans for veterans, here to guide you \
step by step in preparing your disability claim statement.\n\n\
Here's what you can expect during our time together:\n\n\
1. Craft Your Claim Statement - We'll assist you in drafting a clear, VA-ready personal \
statement based on your service history and conditions, in your own words.\n\n\
2. Gather Supporting Evidence - Later we'll assist you in identifying and organizing medical \
records, service documents, and buddy letters so that you can generate a fully developed claim.\n\n\
3. Prepare for Exams - We'll help you understand what to expect in C&P exams so you feel ready.\n\n\
Stay Informed - You'll review and approve everything that is generated before using it.\n\n\
Your information is kept secure and private. We're not a law firm and don't provide legal \
advice; our role is to help you generate the documentation you need for your claim.\n\n\
Do you already have a VA disability claim submitted?\n\n\
If yes, just say \"claim submitted\" and I'll take you to our Claims Guide where you can get \
expert assistance with your existing claim process.\n\n\
If no, say \"create new claim\".";

const EXISTING_CLAIM_REDIRECT: &str = "Perfect! I'll take you to our Claims Guide where you can \
get expert assistance with your existing VA disability claim. You can ask me about the claims \
process, C&P exams, appeals, timelines, and any other questions you have.";

fn quick_replies() -> Vec<String> {
    vec!["Claim Submitted".to_string(), "Create New Claim".to_string()]
}

fn mentions_existing_claim(input: &str) -> bool {
    ["claim submitted", "already have", "existing claim", "submitted"]
        .iter()
        .any(|phrase| input.contains(phrase))
}

fn mentions_new_claim(input: &str) -> bool {
    ["new claim", "create", "start"]
        .iter()
        .any(|phrase| input.contains(phrase))
}

/// First task of every session: greets the veteran and decides between the
/// guided intake and the existing-claim assistant based on their first reply.
pub struct WelcomeTask;

#[async_trait]
impl Task for WelcomeTask {
    fn id(&self) -> &str {
        "welcome"
    }

    async fn run(&self, context: Context) -> Result<TaskResult> {
        let user_input: String = context
            .get(session_keys::USER_INPUT)
            .await
            .unwrap_or_default();

        if user_input.trim().is_empty() {
            context
                .add_assistant_message_with_options(WELCOME_MESSAGE, quick_replies())
                .await;
            return Ok(TaskResult::new(
                Some(WELCOME_MESSAGE.to_string()),
                NextAction::WaitForInput,
            ));
        }

        context.add_user_message(user_input.clone()).await;
        let normalized = user_input.to_lowercase();

        if mentions_existing_claim(&normalized) {
            info!(task_id = %self.id(), route = intake_routes::EXISTING_CLAIM, "routing first reply");
            context
                .set(session_keys::INTAKE_ROUTE, intake_routes::EXISTING_CLAIM)
                .await;
            context
                .set(session_keys::SCREEN, crate::screens::Screen::PostClaimChat)
                .await;
            context.add_assistant_message(EXISTING_CLAIM_REDIRECT).await;

            return Ok(TaskResult::new_with_status(
                Some(EXISTING_CLAIM_REDIRECT.to_string()),
                NextAction::Continue,
                Some("routed to existing-claim guidance".to_string()),
            ));
        }

        if mentions_new_claim(&normalized) {
            info!(task_id = %self.id(), route = intake_routes::NEW_CLAIM, "routing first reply");
            context
                .set(session_keys::INTAKE_ROUTE, intake_routes::NEW_CLAIM)
                .await;
            context.set(session_keys::QUESTION_INDEX, 0usize).await;

            let first_question = &QUESTIONS[0];
            let response = format!(
                "Excellent! I'll guide you through creating your VA disability claim statement \
                 step by step.\n\n{}",
                first_question.prompt
            );
            context.add_assistant_message(response.clone()).await;

            return Ok(TaskResult::new_with_status(
                Some(response),
                NextAction::Continue,
                Some("structured intake started".to_string()),
            ));
        }

        // Neither route recognized; ask again.
        let response = "I want to make sure I take you to the right place. Do you already have \
                        a VA disability claim submitted?\n\nIf yes, say \"claim submitted\". If \
                        no, say \"create new claim\"."
            .to_string();
        context
            .add_assistant_message_with_options(response.clone(), quick_replies())
            .await;

        Ok(TaskResult::new(Some(response), NextAction::WaitForInput))
    }
}
