use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlowError>;

/// Errors produced while building or executing a flow graph.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("context error: {0}")]
    ContextError(String),

    #[error("task execution failed: {0}")]
    TaskExecutionFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),
}
