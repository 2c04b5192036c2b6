use claim_flow::Context;

use crate::profile::VeteranProfile;

/// Context keys shared across tasks and handlers.
pub mod session_keys {
    pub const USER_INPUT: &str = "user_input";
    pub const SESSION_ID: &str = "session_id";
    pub const PROFILE: &str = "veteran_profile";
    pub const QUESTION_INDEX: &str = "question_index";
    pub const INTAKE_ROUTE: &str = "intake_route";
    pub const SCREEN: &str = "screen";
    pub const USER_ID: &str = "user_id";
    pub const DEV_MODE: &str = "dev_mode";
}

/// Values stored under [`session_keys::INTAKE_ROUTE`].
pub mod intake_routes {
    pub const NEW_CLAIM: &str = "new_claim";
    pub const EXISTING_CLAIM: &str = "existing_claim";
}

pub async fn load_profile(context: &Context) -> VeteranProfile {
    context
        .get(session_keys::PROFILE)
        .await
        .unwrap_or_default()
}

pub async fn store_profile(context: &Context, profile: &VeteranProfile) {
    context.set(session_keys::PROFILE, profile).await;
}
