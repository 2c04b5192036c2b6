use std::sync::Arc;

use async_trait::async_trait;
use claim_flow::{Context, FlowError, NextAction, Result, Task, TaskResult};
use rig::completion::Chat;
use tracing::{info, warn};

use super::types::{load_profile, store_profile};
use crate::clients::{ProfileStoreClient, llm::claims_agent};
use crate::profile::VeteranProfile;

const STATEMENT_PREAMBLE: &str = "You are a VA claims assistant helping veterans create \
professional disability claim statements. Generate a comprehensive VA Form 21-4138 statement \
based on the veteran's information. Be empathetic, professional, and thorough. Focus on service \
connection and current impact on daily life.

IMPORTANT: Do NOT include signature lines, date fields, or any signature sections in the \
statement as these will be handled by electronic signing. End the statement with a professional \
closing like \"Thank you for your consideration of my claim.\" but absolutely no signature or \
date sections.";

fn statement_request(profile: &VeteranProfile) -> String {
    format!(
        "Please generate a professional VA disability claim statement for the following veteran:\n\n\
         Name: {} {}\n\
         Service: {} ({})\n\
         Rank: {}\n\
         Primary Condition: {}\n\
         Service Connection: {}\n\
         Current Symptoms: {}\n\
         Impact on Work/Daily Life: {}\n\
         Medical Treatment: {}\n\n\
         Format this as a formal VA Form 21-4138 Statement in Support of Claim. Do not include \
         signature or date sections as these will be added electronically.",
        profile.first_name,
        profile.last_name,
        profile.military_service.branch,
        profile.military_service.service_years,
        profile.military_service.rank,
        profile.claim_info.primary_condition,
        profile.claim_info.service_connection,
        profile.claim_info.symptoms,
        profile.claim_info.work_impact,
        profile.claim_info.medical_treatment,
    )
}

/// Generates the claim statement from the collected profile and persists it.
pub struct GenerateStatementTask {
    profiles: Arc<ProfileStoreClient>,
}

impl GenerateStatementTask {
    pub fn new(profiles: Arc<ProfileStoreClient>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl Task for GenerateStatementTask {
    fn id(&self) -> &str {
        "generate_statement"
    }

    async fn run(&self, context: Context) -> Result<TaskResult> {
        let mut profile = load_profile(&context).await;

        info!(task_id = %self.id(), email = %profile.email, "generating claim statement");

        let agent = claims_agent(STATEMENT_PREAMBLE)
            .map_err(|e| FlowError::TaskExecutionFailed(e.to_string()))?;
        let statement = agent
            .chat(&statement_request(&profile), vec![])
            .await
            .map_err(|e| FlowError::TaskExecutionFailed(e.to_string()))?;

        profile.claim_statement = Some(statement.clone());
        store_profile(&context, &profile).await;
        context.add_assistant_message(statement.clone()).await;

        // Persistence failures must not lose the generated statement; it
        // stays on the session and the save is retried on later changes.
        let status = match self.profiles.save(&profile).await {
            Ok(()) => "claim statement generated".to_string(),
            Err(e) => {
                warn!(task_id = %self.id(), error = %e, "failed to persist profile");
                "claim statement generated, profile save failed".to_string()
            }
        };

        Ok(TaskResult::new_with_status(
            Some(statement),
            NextAction::Continue,
            Some(status),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_includes_the_load_bearing_fields() {
        let mut profile = VeteranProfile::default();
        profile.set_field("first_name", "Darin");
        profile.set_field("last_name", "Manley");
        profile.set_field("military_service.branch", "Army");
        profile.set_field("military_service.service_years", "2003-2007");
        profile.set_field("claim_info.primary_condition", "Lower back injury");
        profile.set_field("claim_info.service_connection", "Injured lifting equipment");

        let request = statement_request(&profile);
        assert!(request.contains("Darin Manley"));
        assert!(request.contains("Army (2003-2007)"));
        assert!(request.contains("Lower back injury"));
        assert!(request.contains("VA Form 21-4138"));
    }
}
