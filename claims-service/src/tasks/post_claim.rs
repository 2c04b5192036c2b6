use async_trait::async_trait;
use claim_flow::{Context, FlowError, NextAction, Result, Task, TaskResult};
use rig::completion::Chat;
use tracing::info;

use super::types::session_keys;
use crate::clients::llm::claims_agent;

/// How much conversation is replayed to the model each turn.
const HISTORY_WINDOW: usize = 5;

const POST_CLAIM_WELCOME: &str = "Welcome to your Claims Guidance Assistant!\n\n\
Congratulations on completing your VA Form 21-4138 Statement in Support of Claim! You've taken \
an important step in your disability claims journey.\n\n\
I'm here to help guide you through the next crucial steps in the VA claims process:\n\n\
Immediate Next Steps:\n\
- File an Intent to File (ITF) - Protects your effective date while you gather evidence\n\
- Submit your signed VA Form 21-4138 - Get your statement officially filed\n\
- Understand the claims timeline - Know what to expect and when\n\n\
Preparation & Evidence:\n\
- Prepare for C&P exams - Tips for Compensation & Pension examinations\n\
- Gather supporting evidence - Medical records, buddy letters, service records\n\
- Secondary conditions - Identify related conditions that may qualify\n\n\
Claims Strategy:\n\
- VA rating criteria - Understand how the VA evaluates your condition\n\
- Appeal processes - Know your options if the initial decision isn't favorable\n\
- Effective date strategies - Maximize your benefits timeline\n\n\
What would you like to discuss first? You can ask me anything about the VA claims process, \
deadlines, required documentation, or any concerns you have about moving forward with your claim.";

const POST_CLAIM_PREAMBLE: &str = "You are a VA claims expert helping a veteran who has just \
completed their VA Form 21-4138 Statement in Support of Claim. Provide guidance on:

1. Filing an Intent to File (ITF) to protect their effective date
2. Submitting their signed form to the VA
3. Understanding the claims process timeline
4. Preparing for C&P exams
5. Gathering additional supporting evidence
6. Understanding VA rating criteria
7. Secondary conditions and nexus letters
8. Appeal processes if needed

Be encouraging, professional, and provide actionable advice. Focus on next steps and practical \
guidance for navigating the VA system.";

const BACK_MESSAGE: &str = "I'll take you back to your claim document now.";

fn wants_document(input: &str) -> bool {
    let normalized = input.to_lowercase();
    ["back to document", "return to claim", "go back"]
        .iter()
        .any(|phrase| normalized.contains(phrase))
}

/// Free-form guidance chat for veterans with a claim already on file.
pub struct PostClaimChatTask;

#[async_trait]
impl Task for PostClaimChatTask {
    fn id(&self) -> &str {
        "post_claim_chat"
    }

    async fn run(&self, context: Context) -> Result<TaskResult> {
        let input: String = context
            .get(session_keys::USER_INPUT)
            .await
            .unwrap_or_default();

        if input.trim().is_empty() {
            context.add_assistant_message(POST_CLAIM_WELCOME).await;
            return Ok(TaskResult::new(
                Some(POST_CLAIM_WELCOME.to_string()),
                NextAction::WaitForInput,
            ));
        }

        if wants_document(&input) {
            info!(task_id = %self.id(), "returning to document preview");
            context.add_user_message(input).await;
            context.add_assistant_message(BACK_MESSAGE).await;
            return Ok(TaskResult::new_with_status(
                Some(BACK_MESSAGE.to_string()),
                NextAction::End,
                Some("returned to document preview".to_string()),
            ));
        }

        let history = context.recent_rig_messages(HISTORY_WINDOW);
        context.add_user_message(input.clone()).await;

        let agent = claims_agent(POST_CLAIM_PREAMBLE)
            .map_err(|e| FlowError::TaskExecutionFailed(e.to_string()))?;
        let reply = agent
            .chat(&input, history)
            .await
            .map_err(|e| FlowError::TaskExecutionFailed(e.to_string()))?;

        context.add_assistant_message(reply.clone()).await;
        Ok(TaskResult::new(Some(reply), NextAction::WaitForInput))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_phrases_end_the_chat() {
        assert!(wants_document("take me back to document preview"));
        assert!(wants_document("Return to claim"));
        assert!(wants_document("can I go back?"));
        assert!(!wants_document("what is an ITF?"));
    }

    #[tokio::test]
    async fn empty_turn_shows_the_guidance_welcome() {
        let context = Context::new();
        let result = PostClaimChatTask.run(context.clone()).await.unwrap();
        assert!(matches!(result.next_action, NextAction::WaitForInput));
        assert!(result.response.unwrap().contains("Claims Guidance Assistant"));
    }

    #[tokio::test]
    async fn back_request_completes_without_an_llm_call() {
        let context = Context::new();
        context.set(session_keys::USER_INPUT, "go back").await;
        let result = PostClaimChatTask.run(context.clone()).await.unwrap();
        assert!(matches!(result.next_action, NextAction::End));
        assert_eq!(result.response.as_deref(), Some(BACK_MESSAGE));
    }
}
