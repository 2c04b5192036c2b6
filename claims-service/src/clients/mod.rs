pub mod esign;
pub mod llm;
pub mod profile_store;
pub mod subscription;

use thiserror::Error;

pub use esign::{EsignClient, SigningHandoff};
pub use profile_store::ProfileStoreClient;
pub use subscription::SubscriptionClient;

/// Errors from the outbound service clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing or invalid configuration. Not retried.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}
