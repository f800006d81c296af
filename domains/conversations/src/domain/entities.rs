//! Domain entities for the Conversations domain
//!
//! Conversations are owned by one user inside one project. Messages form an
//! append-only log per conversation, ordered by `created_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_common::{Error, Result};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_sender", rename_all = "UPPERCASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageSender {
    User,
    Assistant,
}

impl std::fmt::Display for MessageSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageSender::User => write!(f, "USER"),
            MessageSender::Assistant => write!(f, "ASSISTANT"),
        }
    }
}

impl From<MessageSender> for parley_llm::LlmRole {
    fn from(sender: MessageSender) -> Self {
        match sender {
            MessageSender::User => parley_llm::LlmRole::User,
            MessageSender::Assistant => parley_llm::LlmRole::Assistant,
        }
    }
}

/// Conversation entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new, empty conversation owned by `user_id` in `project_id`
    pub fn new(user_id: Uuid, project_id: Uuid) -> Self {
        let now = Utc::now();
        Conversation {
            id: Uuid::new_v4(),
            user_id,
            project_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: MessageSender,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new user message
    pub fn new_user(conversation_id: Uuid, content: String) -> Result<Self> {
        Self::new(conversation_id, MessageSender::User, content)
    }

    /// Create a new assistant message
    pub fn new_assistant(conversation_id: Uuid, content: String) -> Result<Self> {
        Self::new(conversation_id, MessageSender::Assistant, content)
    }

    fn new(conversation_id: Uuid, sender: MessageSender, content: String) -> Result<Self> {
        Self::validate_content(&content)?;

        Ok(Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender,
            content,
            created_at: Utc::now(),
        })
    }

    /// Validate message content (CHECK (length(trim(content)) > 0))
    fn validate_content(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::Validation(
                "Message content cannot be empty or whitespace-only".to_string(),
            ));
        }
        Ok(())
    }
}

/// Listing row: a conversation with its size and latest message
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub conversation: Conversation,
    pub message_count: i64,
    pub last_message: Option<Message>,
}
