use async_trait::async_trait;
use claim_flow::{Context, FlowError, NextAction, Result, Task, TaskResult};
use rig::completion::Chat;

use super::types::session_keys;
use crate::clients::llm::plain_agent;

const HISTORY_WINDOW: usize = 5;

/// Plain free-form chat once the scripted intake has finished: the last few
/// exchanges plus the new message are forwarded and the reply is shown
/// verbatim.
pub struct GeneralChatTask;

#[async_trait]
impl Task for GeneralChatTask {
    fn id(&self) -> &str {
        "general_chat"
    }

    async fn run(&self, context: Context) -> Result<TaskResult> {
        let input: String = context
            .get(session_keys::USER_INPUT)
            .await
            .unwrap_or_default();

        if input.trim().is_empty() {
            return Ok(TaskResult::new(None, NextAction::WaitForInput));
        }

        let history = context.recent_rig_messages(HISTORY_WINDOW);
        context.add_user_message(input.clone()).await;

        let agent = plain_agent().map_err(|e| FlowError::TaskExecutionFailed(e.to_string()))?;
        let reply = agent
            .chat(&input, history)
            .await
            .map_err(|e| FlowError::TaskExecutionFailed(e.to_string()))?;

        context.add_assistant_message(reply.clone()).await;
        Ok(TaskResult::new(Some(reply), NextAction::WaitForInput))
    }
}
