//! Conversation repository

use chrono::{DateTime, Utc};
use parley_common::{RepositoryError, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Conversation, ConversationSummary, Message, MessageSender};

/// Flat row produced by the listing query
#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    user_id: Uuid,
    project_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    message_count: i64,
    last_message_id: Option<Uuid>,
    last_message_sender: Option<MessageSender>,
    last_message_content: Option<String>,
    last_message_created_at: Option<DateTime<Utc>>,
}

impl TryFrom<SummaryRow> for ConversationSummary {
    type Error = RepositoryError;

    fn try_from(row: SummaryRow) -> std::result::Result<Self, Self::Error> {
        let last_message = match (
            row.last_message_id,
            row.last_message_sender,
            row.last_message_content,
            row.last_message_created_at,
        ) {
            (Some(id), Some(sender), Some(content), Some(created_at)) => Some(Message {
                id,
                conversation_id: row.id,
                sender,
                content,
                created_at,
            }),
            (None, None, None, None) => None,
            _ => {
                return Err(RepositoryError::InvalidData(format!(
                    "Incomplete last message for conversation {}",
                    row.id
                )))
            }
        };

        Ok(ConversationSummary {
            conversation: Conversation {
                id: row.id,
                user_id: row.user_id,
                project_id: row.project_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            message_count: row.message_count,
            last_message,
        })
    }
}

#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a conversation by ID, visible only to its owner within its project.
    ///
    /// A conversation owned by someone else, or filed under another project,
    /// is indistinguishable from one that does not exist.
    pub async fn find_owned(
        &self,
        id: Uuid,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Conversation>> {
        let conv = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, user_id, project_id, created_at, updated_at
            FROM conversations
            WHERE id = $1 AND project_id = $2 AND user_id = $3
            "#,
        )
        .bind(id)
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conv)
    }

    /// List a user's conversations in a project, most recently updated first,
    /// each with its message count and latest message
    pub async fn list_summaries(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ConversationSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT c.id, c.user_id, c.project_id, c.created_at, c.updated_at,
                   (SELECT COUNT(*) FROM messages m WHERE m.conversation_id = c.id) AS message_count,
                   lm.id AS last_message_id,
                   lm.sender AS last_message_sender,
                   lm.content AS last_message_content,
                   lm.created_at AS last_message_created_at
            FROM conversations c
            LEFT JOIN LATERAL (
                SELECT id, sender, content, created_at
                FROM messages
                WHERE conversation_id = c.id
                ORDER BY created_at DESC, id DESC
                LIMIT 1
            ) lm ON TRUE
            WHERE c.project_id = $1 AND c.user_id = $2
            ORDER BY c.updated_at DESC, c.id DESC
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let summaries = rows
            .into_iter()
            .map(ConversationSummary::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    /// Create a new conversation
    pub async fn create(&self, conv: &Conversation) -> Result<Conversation> {
        let created = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (id, user_id, project_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, project_id, created_at, updated_at
            "#,
        )
        .bind(conv.id)
        .bind(conv.user_id)
        .bind(conv.project_id)
        .bind(conv.created_at)
        .bind(conv.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Move `updated_at` forward to `at` after a message exchange.
    /// Never moves it backwards.
    pub async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> Result<Conversation> {
        let updated = sqlx::query_as::<_, Conversation>(
            r#"
            UPDATE conversations
            SET updated_at = GREATEST(updated_at, $2)
            WHERE id = $1
            RETURNING id, user_id, project_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| RepositoryError::NotFound.into())
    }
}
