use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{context::Context, error::Result};

/// Result of a single task execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Response to send to the user, if any.
    pub response: Option<String>,
    /// Short machine-friendly summary of what the task did, surfaced on the
    /// session for observability.
    pub status_message: Option<String>,
    /// What the graph should do next.
    pub next_action: NextAction,
    /// Id of the task that produced this result. Filled in by the graph.
    #[serde(default)]
    pub task_id: String,
}

impl TaskResult {
    pub fn new(response: Option<String>, next_action: NextAction) -> Self {
        Self {
            response,
            status_message: None,
            next_action,
            task_id: String::new(),
        }
    }

    pub fn new_with_status(
        response: Option<String>,
        next_action: NextAction,
        status_message: Option<String>,
    ) -> Self {
        Self {
            response,
            status_message,
            next_action,
            task_id: String::new(),
        }
    }
}

/// Defines what should happen after a task completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NextAction {
    /// Advance to the next task along the edges and wait for user input there.
    Continue,
    /// Advance to the next task along the edges and execute it immediately.
    ContinueAndExecute,
    /// Move to a specific task by id and wait for user input there.
    GoTo(String),
    /// Return to the previously active task.
    GoBack,
    /// The flow is finished.
    End,
    /// Stay on the current task and wait for more user input.
    WaitForInput,
}

/// Core trait implemented by every step of a flow.
#[async_trait]
pub trait Task: Send + Sync {
    /// Unique identifier for this task within a graph.
    fn id(&self) -> &str;

    /// Execute the task against the shared session context.
    async fn run(&self, context: Context) -> Result<TaskResult>;
}
