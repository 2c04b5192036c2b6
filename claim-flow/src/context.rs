use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// A single entry in the session's conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Quick-reply choices offered alongside an assistant message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            options: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            options: None,
        }
    }

    pub fn assistant_with_options(content: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            options: Some(options),
        }
    }
}

/// Shared per-session state: a key/value map for task data plus an
/// append-only conversation transcript.
///
/// Cloning is cheap; clones share the same underlying storage.
#[derive(Clone, Debug, Default)]
pub struct Context {
    data: Arc<DashMap<String, Value>>,
    history: Arc<Mutex<Vec<ChatMessage>>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Serialize) {
        let value = serde_json::to_value(value).expect("failed to serialize context value");
        self.data.insert(key.into(), value);
    }

    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Synchronous read, for edge conditions which cannot await.
    pub fn get_sync<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, v)| v)
    }

    /// Drop all task data and the transcript.
    pub async fn clear(&self) {
        self.data.clear();
        self.history.lock().unwrap().clear();
    }

    pub async fn add_user_message(&self, content: impl Into<String>) {
        self.push_message(ChatMessage::user(content));
    }

    pub async fn add_assistant_message(&self, content: impl Into<String>) {
        self.push_message(ChatMessage::assistant(content));
    }

    pub async fn add_assistant_message_with_options(
        &self,
        content: impl Into<String>,
        options: Vec<String>,
    ) {
        self.push_message(ChatMessage::assistant_with_options(content, options));
    }

    pub fn push_message(&self, message: ChatMessage) {
        self.history.lock().unwrap().push(message);
    }

    /// Full transcript, oldest first.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().unwrap().clone()
    }

    /// The last `n` transcript entries, oldest first.
    pub fn recent_history(&self, n: usize) -> Vec<ChatMessage> {
        let history = self.history.lock().unwrap();
        let start = history.len().saturating_sub(n);
        history[start..].to_vec()
    }
}

#[cfg(feature = "rig")]
impl Context {
    /// The last `n` transcript entries converted for a rig chat call.
    pub fn recent_rig_messages(&self, n: usize) -> Vec<rig::completion::Message> {
        self.recent_history(n).iter().map(to_rig_message).collect()
    }

    /// The full transcript converted for a rig chat call.
    pub fn rig_messages(&self) -> Vec<rig::completion::Message> {
        self.history().iter().map(to_rig_message).collect()
    }
}

#[cfg(feature = "rig")]
fn to_rig_message(message: &ChatMessage) -> rig::completion::Message {
    use rig::completion::Message;
    match message.role {
        MessageRole::User => Message::user(message.content.clone()),
        MessageRole::Assistant => Message::assistant(message.content.clone()),
        // rig has no system history entry; carry it as a tagged user message
        MessageRole::System => Message::user(format!("[SYSTEM] {}", message.content)),
    }
}
