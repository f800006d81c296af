//! Conversation API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use parley_auth::AuthUser;
use parley_common::{Error, Result};
use serde::Serialize;
use uuid::Uuid;

use super::messages::MessageResponse;
use crate::api::middleware::ConversationsState;
use crate::domain::entities::{Conversation, ConversationSummary};

/// Conversation response DTO
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub project_id: Uuid,
    pub user_id: Uuid,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            created_at: c.created_at,
            updated_at: c.updated_at,
            project_id: c.project_id,
            user_id: c.user_id,
        }
    }
}

/// Listing entry: conversation plus size and latest message
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummaryResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: i64,
    pub last_message: Option<MessageResponse>,
}

impl From<ConversationSummary> for ConversationSummaryResponse {
    fn from(s: ConversationSummary) -> Self {
        Self {
            id: s.conversation.id,
            created_at: s.conversation.created_at,
            updated_at: s.conversation.updated_at,
            message_count: s.message_count,
            last_message: s.last_message.map(Into::into),
        }
    }
}

/// Conversation with its full message log
#[derive(Debug, Serialize)]
pub struct ConversationDetailResponse {
    #[serde(flatten)]
    pub conversation: ConversationResponse,
    pub messages: Vec<MessageResponse>,
}

/// Create a new conversation in a project
pub async fn create_conversation(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path(project_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ConversationResponse>)> {
    let conversation = Conversation::new(ctx.user_id(), project_id);

    let created = state.repos.conversations.create(&conversation).await?;

    tracing::info!(
        conversation_id = %created.id,
        project_id = %project_id,
        user_id = %ctx.user_id(),
        "Conversation created"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List the caller's conversations in a project
pub async fn list_conversations(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<ConversationSummaryResponse>>> {
    let summaries = state
        .repos
        .conversations
        .list_summaries(project_id, ctx.user_id())
        .await?;

    let responses: Vec<ConversationSummaryResponse> =
        summaries.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// Get a single conversation with its messages
pub async fn get_conversation(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path((project_id, conversation_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ConversationDetailResponse>> {
    let conv = state
        .repos
        .conversations
        .find_owned(conversation_id, project_id, ctx.user_id())
        .await?
        .ok_or_else(|| Error::NotFound("Conversation not found".to_string()))?;

    let messages = state
        .repos
        .messages
        .list_by_conversation(conv.id)
        .await?;

    Ok(Json(ConversationDetailResponse {
        conversation: conv.into(),
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}
