//! Conversation memory: durable history kept around the loop.
//!
//! The reason-act core never touches memory. A wrapper records the
//! user's input and the returned answer after a run completes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use crate::error::MemoryError;

/// Who said a remembered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// A single remembered message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryMessage {
    pub speaker: Speaker,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Durable conversation history.
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    /// Record something the user said.
    async fn add_user_message(&self, content: &str) -> Result<(), MemoryError>;

    /// Record something the assistant answered.
    async fn add_assistant_message(&self, content: &str) -> Result<(), MemoryError>;

    /// All remembered messages, oldest first.
    async fn messages(&self) -> Result<Vec<MemoryMessage>, MemoryError>;

    /// Forget everything.
    async fn clear(&self) -> Result<(), MemoryError>;
}

/// Process-local memory, lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryConversation {
    messages: Mutex<Vec<MemoryMessage>>,
}

impl InMemoryConversation {
    pub fn new() -> Self {
        Self::default()
    }

    async fn push(&self, speaker: Speaker, content: &str) {
        self.messages.lock().await.push(MemoryMessage {
            speaker,
            content: content.to_string(),
            created_at: Utc::now(),
        });
    }
}

#[async_trait]
impl ConversationMemory for InMemoryConversation {
    async fn add_user_message(&self, content: &str) -> Result<(), MemoryError> {
        self.push(Speaker::User, content).await;
        Ok(())
    }

    async fn add_assistant_message(&self, content: &str) -> Result<(), MemoryError> {
        self.push(Speaker::Assistant, content).await;
        Ok(())
    }

    async fn messages(&self) -> Result<Vec<MemoryMessage>, MemoryError> {
        Ok(self.messages.lock().await.clone())
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        self.messages.lock().await.clear();
        Ok(())
    }
}
