pub mod edit_profile;
pub mod general_chat;
pub mod generate_statement;
pub mod intake;
pub mod post_claim;
pub mod welcome;

// Shared modules
pub mod types;

// Re-export task implementations
pub use edit_profile::EditProfileTask;
pub use general_chat::GeneralChatTask;
pub use generate_statement::GenerateStatementTask;
pub use intake::IntakeTask;
pub use post_claim::PostClaimChatTask;
pub use welcome::WelcomeTask;

// Re-export session keys
pub use types::{intake_routes, session_keys};
