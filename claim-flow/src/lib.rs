pub mod context;
pub mod error;
pub mod graph;
pub mod storage;
pub mod task;

// Re-export commonly used types
pub use context::{ChatMessage, Context, MessageRole};
pub use error::{FlowError, Result};
pub use graph::{ExecutionResult, ExecutionStatus, Graph, GraphBuilder};
pub use storage::{
    GraphStorage, InMemoryGraphStorage, InMemorySessionStorage, Session, SessionStorage,
};
pub use task::{NextAction, Task, TaskResult};

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoTask {
        id: String,
        next_action: NextAction,
    }

    #[async_trait]
    impl Task for EchoTask {
        fn id(&self) -> &str {
            &self.id
        }

        async fn run(&self, context: Context) -> Result<TaskResult> {
            let input: String = context.get("input").await.unwrap_or_default();
            context.set(format!("visited_{}", self.id), true).await;

            Ok(TaskResult::new(
                Some(format!("{}: {}", self.id, input)),
                self.next_action.clone(),
            ))
        }
    }

    fn echo(id: &str, next_action: NextAction) -> Arc<EchoTask> {
        Arc::new(EchoTask {
            id: id.to_string(),
            next_action,
        })
    }

    #[tokio::test]
    async fn single_task_completes() {
        let graph = GraphBuilder::new("single")
            .add_task(echo("only", NextAction::End))
            .build();

        let mut session = Session::new_from_task("s1".to_string(), "only");
        session.context.set("input", "hello").await;

        let result = graph.execute_session(&mut session).await.unwrap();

        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(result.task_id, "only");
        assert_eq!(result.response.as_deref(), Some("only: hello"));
        assert_eq!(session.current_task_id, "only");
    }

    #[tokio::test]
    async fn continue_advances_one_step_per_turn() {
        let graph = GraphBuilder::new("linear")
            .add_task(echo("first", NextAction::Continue))
            .add_task(echo("second", NextAction::End))
            .add_edge("first", "second")
            .build();

        let mut session = Session::new_from_task("s1".to_string(), "first");

        let result = graph.execute_session(&mut session).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::WaitingForInput);
        assert_eq!(result.task_id, "first");
        assert_eq!(session.current_task_id, "second");
        // second has not run yet
        let visited: Option<bool> = session.context.get("visited_second").await;
        assert!(visited.is_none());
    }

    #[tokio::test]
    async fn continue_and_execute_chains_within_a_turn() {
        let graph = GraphBuilder::new("chained")
            .add_task(echo("first", NextAction::ContinueAndExecute))
            .add_task(echo("second", NextAction::End))
            .add_edge("first", "second")
            .build();

        let mut session = Session::new_from_task("s1".to_string(), "first");
        session.context.set("input", "x").await;

        let result = graph.execute_session(&mut session).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(result.task_id, "second");
        assert_eq!(result.response.as_deref(), Some("second: x"));
        let visited: bool = session.context.get("visited_first").await.unwrap();
        assert!(visited);
    }

    #[tokio::test]
    async fn conditional_edge_selects_branch() {
        let build = || {
            GraphBuilder::new("branching")
                .add_task(echo("decide", NextAction::Continue))
                .add_task(echo("yes_branch", NextAction::End))
                .add_task(echo("no_branch", NextAction::End))
                .add_conditional_edge(
                    "decide",
                    |ctx| {
                        ctx.get_sync::<String>("route")
                            .map(|r| r == "yes")
                            .unwrap_or(false)
                    },
                    "yes_branch",
                    "no_branch",
                )
                .build()
        };

        let graph = build();
        let mut session = Session::new_from_task("s1".to_string(), "decide");
        session.context.set("route", "yes").await;
        graph.execute_session(&mut session).await.unwrap();
        assert_eq!(session.current_task_id, "yes_branch");

        let graph = build();
        let mut session = Session::new_from_task("s2".to_string(), "decide");
        graph.execute_session(&mut session).await.unwrap();
        assert_eq!(session.current_task_id, "no_branch");
    }

    #[tokio::test]
    async fn wait_for_input_keeps_pointer() {
        let graph = GraphBuilder::new("waiting")
            .add_task(echo("asker", NextAction::WaitForInput))
            .add_task(echo("after", NextAction::End))
            .add_edge("asker", "after")
            .build();

        let mut session = Session::new_from_task("s1".to_string(), "asker");
        for _ in 0..3 {
            let result = graph.execute_session(&mut session).await.unwrap();
            assert_eq!(result.status, ExecutionStatus::WaitingForInput);
            assert_eq!(session.current_task_id, "asker");
        }
    }

    #[tokio::test]
    async fn go_back_returns_to_previous_task() {
        let graph = GraphBuilder::new("back")
            .add_task(echo("first", NextAction::Continue))
            .add_task(echo("second", NextAction::GoBack))
            .add_edge("first", "second")
            .build();

        let mut session = Session::new_from_task("s1".to_string(), "first");
        graph.execute_session(&mut session).await.unwrap();
        assert_eq!(session.current_task_id, "second");
        assert_eq!(session.previous_task_id.as_deref(), Some("first"));

        graph.execute_session(&mut session).await.unwrap();
        assert_eq!(session.current_task_id, "first");
        assert!(session.previous_task_id.is_none());
    }

    #[tokio::test]
    async fn goto_unknown_task_is_an_error() {
        struct JumpTask;

        #[async_trait]
        impl Task for JumpTask {
            fn id(&self) -> &str {
                "jumper"
            }

            async fn run(&self, _context: Context) -> Result<TaskResult> {
                Ok(TaskResult::new(
                    None,
                    NextAction::GoTo("missing".to_string()),
                ))
            }
        }

        let graph = GraphBuilder::new("jumping").add_task(Arc::new(JumpTask)).build();
        let mut session = Session::new_from_task("s1".to_string(), "jumper");

        let err = graph.execute_session(&mut session).await.unwrap_err();
        assert!(matches!(err, FlowError::TaskNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn transcript_is_append_only_and_ordered() {
        let context = Context::new();
        context.add_assistant_message("welcome").await;
        context.add_user_message("hi").await;
        context
            .add_assistant_message_with_options("pick one", vec!["a".to_string(), "b".to_string()])
            .await;

        let history = context.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, MessageRole::Assistant);
        assert_eq!(history[1].content, "hi");
        assert_eq!(history[2].options.as_ref().unwrap().len(), 2);

        let recent = context.recent_history(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "hi");
    }

    #[tokio::test]
    async fn storage_round_trip() {
        let graph_storage = InMemoryGraphStorage::new();
        let session_storage = InMemorySessionStorage::new();

        let graph = Arc::new(Graph::new("stored"));
        graph_storage
            .save("stored".to_string(), graph.clone())
            .await
            .unwrap();
        assert!(graph_storage.get("stored").await.unwrap().is_some());

        let session = Session::new_from_task("session1".to_string(), "task1");
        session_storage.save(session.clone()).await.unwrap();
        let retrieved = session_storage.get("session1").await.unwrap().unwrap();
        assert_eq!(retrieved.current_task_id, "task1");

        session_storage.delete("session1").await.unwrap();
        assert!(session_storage.get("session1").await.unwrap().is_none());
    }
}
