use std::sync::Arc;
use std::sync::LazyLock;

use async_trait::async_trait;
use claim_flow::{Context, FlowError, NextAction, Result, Task, TaskResult};
use regex::Regex;
use rig::completion::Chat;
use tracing::{info, warn};

use super::types::{load_profile, session_keys, store_profile};
use crate::clients::{ProfileStoreClient, llm::claims_agent};
use crate::profile::{VeteranProfile, field_display_name};

const EDIT_WELCOME: &str = "Welcome back, warrior!\n\n\
I'm here to help you update your information. What would you like to change or correct in your \
VA disability claim details?\n\n\
You can tell me things like:\n\
- \"I need to update my address\"\n\
- \"My phone number is wrong\"\n\
- \"I want to add more details about my condition\"\n\
- \"My service dates are incorrect\"\n\n\
Just let me know what you'd like to fix, and I'll help you update it. When you're finished \
making changes, just say \"I'm finished\", \"I'm done\", or \"continue\" to return to your \
claim statement.";

const EDIT_CLOSING: &str = "Perfect! I've updated your information. Let me take you back to \
your claim statement.";

const FOLLOW_UP: &str = "Is there anything else you'd like to update, or are you ready to \
continue with your claim?";

static UPDATE_DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"UPDATE_FIELD:\s*([^\s=]+)\s*=\s*(.+)").expect("directive pattern")
});
static UPDATE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^.*UPDATE_FIELD:[^\n]*\n?").expect("directive line pattern"));

fn edit_preamble(profile: &VeteranProfile) -> String {
    format!(
        "You are helping a veteran update their VA disability claim information. Help them \
         identify what they want to change and guide them through updating that specific \
         information.\n\n\
         CRITICAL: When updating addresses, you MUST break down the address into separate \
         components:\n\
         - address.street = [street number and name only]\n\
         - address.city = [city name]\n\
         - address.state = [state name]\n\
         - address.zip_code = [zip code]\n\n\
         For example, if the user says \"My address is 2628 Cedar St., Quincy, IL 62301\", \
         respond with:\n\
         UPDATE_FIELD: address.street = 2628 Cedar St.\n\
         UPDATE_FIELD: address.city = Quincy\n\
         UPDATE_FIELD: address.state = Illinois\n\
         UPDATE_FIELD: address.zip_code = 62301\n\n\
         NEVER use just \"address\" as a field name - always use the specific nested fields.\n\
         Format your response naturally, but if you're updating data, end your message with one \
         or more update commands:\n\
         UPDATE_FIELD: [field_path] = [new_value]\n\n\
         For other nested fields, use dot notation like:\n\
         UPDATE_FIELD: military_service.branch = [branch_name]\n\
         UPDATE_FIELD: claim_info.primary_condition = [condition_description]\n\n\
         Current veteran data for context:\n\
         Name: {} {}\n\
         Email: {}\n\
         Current Address: {}, {}, {} {}",
        profile.first_name,
        profile.last_name,
        profile.email,
        not_set(&profile.address.street),
        not_set(&profile.address.city),
        not_set(&profile.address.state),
        not_set(&profile.address.zip_code),
    )
}

fn not_set(value: &str) -> &str {
    if value.is_empty() { "Not set" } else { value }
}

/// Pull `UPDATE_FIELD: path = value` directives out of a model reply.
fn extract_field_updates(response: &str) -> Vec<(String, String)> {
    UPDATE_DIRECTIVE_RE
        .captures_iter(response)
        .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
        .collect()
}

/// The reply with all directive lines removed.
fn strip_directives(response: &str) -> String {
    UPDATE_LINE_RE.replace_all(response, "").trim().to_string()
}

fn wants_to_finish(input: &str) -> bool {
    let normalized = input.to_lowercase();
    ["done", "finished", "continue", "ready"]
        .iter()
        .any(|phrase| normalized.contains(phrase))
}

/// Conversational profile editing: the model proposes field updates as
/// directives, which are applied to the profile and confirmed per field.
pub struct EditProfileTask {
    profiles: Arc<ProfileStoreClient>,
}

impl EditProfileTask {
    pub fn new(profiles: Arc<ProfileStoreClient>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl Task for EditProfileTask {
    fn id(&self) -> &str {
        "edit_profile"
    }

    async fn run(&self, context: Context) -> Result<TaskResult> {
        let input: String = context
            .get(session_keys::USER_INPUT)
            .await
            .unwrap_or_default();

        if input.trim().is_empty() {
            context.add_assistant_message(EDIT_WELCOME).await;
            return Ok(TaskResult::new(
                Some(EDIT_WELCOME.to_string()),
                NextAction::WaitForInput,
            ));
        }

        let mut profile = load_profile(&context).await;
        let history = context.recent_rig_messages(5);
        context.add_user_message(input.clone()).await;

        let agent = claims_agent(&edit_preamble(&profile))
            .map_err(|e| FlowError::TaskExecutionFailed(e.to_string()))?;
        let reply = agent
            .chat(&input, history)
            .await
            .map_err(|e| FlowError::TaskExecutionFailed(e.to_string()))?;

        let updates = extract_field_updates(&reply);
        let mut updated_fields = Vec::new();
        for (path, value) in &updates {
            // The model is told to never target the bare address object.
            if path == "address" {
                warn!(task_id = %self.id(), "ignoring bare address directive");
                continue;
            }
            if profile.set_field(path, value) {
                info!(task_id = %self.id(), field = %path, "profile field updated");
                updated_fields.push(field_display_name(path).to_string());
            } else {
                warn!(task_id = %self.id(), field = %path, "ignoring unknown field directive");
            }
        }

        if !updated_fields.is_empty() {
            store_profile(&context, &profile).await;
        }

        let mut response = strip_directives(&reply);
        if !updated_fields.is_empty() {
            response = if response.is_empty() {
                FOLLOW_UP.to_string()
            } else {
                format!("{response}\n\n{FOLLOW_UP}")
            };
        }

        let status_message = if updated_fields.is_empty() {
            None
        } else {
            Some(format!("Updated {}", updated_fields.join(", ")))
        };

        if wants_to_finish(&input) {
            if let Err(e) = self.profiles.save(&profile).await {
                warn!(task_id = %self.id(), error = %e, "failed to persist edited profile");
            }
            let response = if response.is_empty() {
                EDIT_CLOSING.to_string()
            } else {
                format!("{response}\n\n{EDIT_CLOSING}")
            };
            context.add_assistant_message(response.clone()).await;
            return Ok(TaskResult::new_with_status(
                Some(response),
                NextAction::End,
                Some("editing complete".to_string()),
            ));
        }

        context.add_assistant_message(response.clone()).await;
        Ok(TaskResult::new_with_status(
            Some(response),
            NextAction::WaitForInput,
            status_message,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_are_extracted_line_by_line() {
        let reply = "I've updated your address.\n\
                     UPDATE_FIELD: address.street = 2628 Cedar St.\n\
                     UPDATE_FIELD: address.city = Quincy\n\
                     UPDATE_FIELD: address.state = Illinois\n\
                     UPDATE_FIELD: address.zip_code = 62301";

        let updates = extract_field_updates(reply);
        assert_eq!(updates.len(), 4);
        assert_eq!(updates[0], ("address.street".to_string(), "2628 Cedar St.".to_string()));
        assert_eq!(updates[3].1, "62301");
    }

    #[test]
    fn directive_lines_are_stripped_from_the_reply() {
        let reply = "Got it, updating now.\nUPDATE_FIELD: phone = 555-987-6543\nAll set.";
        let cleaned = strip_directives(reply);
        assert_eq!(cleaned, "Got it, updating now.\nAll set.");
    }

    #[test]
    fn applying_directives_normalizes_into_the_address_object() {
        let mut profile = VeteranProfile::default();
        let updates = extract_field_updates(
            "UPDATE_FIELD: address.street = 2628 Cedar St.\n\
             UPDATE_FIELD: address.city = Quincy",
        );
        for (path, value) in &updates {
            assert!(profile.set_field(path, value));
        }
        assert_eq!(profile.address.street, "2628 Cedar St.");
        assert_eq!(profile.address.city, "Quincy");
        assert_eq!(profile.address.state, "");
    }

    #[test]
    fn finish_phrases_are_detected() {
        assert!(wants_to_finish("I'm done"));
        assert!(wants_to_finish("Finished, thanks"));
        assert!(wants_to_finish("ready to continue"));
        assert!(!wants_to_finish("change my phone number"));
    }

    #[test]
    fn preamble_embeds_current_data() {
        let mut profile = VeteranProfile::default();
        profile.set_field("first_name", "Darin");
        profile.set_field("last_name", "Manley");
        profile.set_field("email", "vet@example.com");

        let preamble = edit_preamble(&profile);
        assert!(preamble.contains("Name: Darin Manley"));
        assert!(preamble.contains("Not set, Not set, Not set Not set"));
    }
}
