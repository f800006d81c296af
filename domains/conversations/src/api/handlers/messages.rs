//! Message API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use parley_auth::AuthUser;
use parley_common::{Error, Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::ConversationsState;
use crate::domain::assistant::{self, HISTORY_LIMIT, MAX_RETRIES};
use crate::domain::entities::{Conversation, Message, MessageSender};

/// Request for sending a message
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Message content
    #[validate(
        length(min = 1, message = "Message content is required"),
        custom(function = "validate_not_blank", message = "Message content cannot be blank")
    )]
    pub content: String,
}

fn validate_not_blank(content: &str) -> std::result::Result<(), validator::ValidationError> {
    if content.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Message response DTO
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: MessageSender,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            sender: m.sender,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

/// Response for send message (includes both user and assistant messages)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub user_message: MessageResponse,
    pub assistant_message: MessageResponse,
}

/// Send a message to a conversation and post the assistant's reply
pub async fn send_message(
    AuthUser(ctx): AuthUser,
    State(state): State<ConversationsState>,
    Path((project_id, conversation_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>> {
    let conv = state
        .repos
        .conversations
        .find_owned(conversation_id, project_id, ctx.user_id())
        .await?
        .ok_or_else(|| Error::NotFound("Conversation not found".to_string()))?;

    let user_msg = Message::new_user(conv.id, req.content)?;
    let created_user_msg = state.repos.messages.create(&user_msg).await?;

    let reply = generate_reply(&state, &conv, &created_user_msg).await?;

    let assistant_msg = Message::new_assistant(conv.id, reply)?;
    let created_assistant_msg = state.repos.messages.create(&assistant_msg).await?;

    state
        .repos
        .conversations
        .touch(conv.id, Utc::now())
        .await?;

    tracing::info!(
        conversation_id = %conv.id,
        project_id = %project_id,
        user_message_id = %created_user_msg.id,
        assistant_message_id = %created_assistant_msg.id,
        "Message exchange recorded"
    );

    Ok(Json(SendMessageResponse {
        user_message: created_user_msg.into(),
        assistant_message: created_assistant_msg.into(),
    }))
}

/// Produce the assistant's text for `new_message`.
///
/// Only storage failures are returned as errors. Anything that goes wrong on
/// the provider side ends up in the reply text instead.
async fn generate_reply(
    state: &ConversationsState,
    conv: &Conversation,
    new_message: &Message,
) -> Result<String> {
    let Some(key) = state
        .repos
        .llm_api_keys
        .find_latest_for_project(conv.project_id)
        .await?
    else {
        tracing::debug!(project_id = %conv.project_id, "No LLM credential, sending onboarding reply");
        return Ok(assistant::onboarding_reply(&new_message.content));
    };

    let credential = match key.decode(&state.cipher) {
        Ok(credential) => credential,
        Err(e) => {
            tracing::warn!(
                project_id = %conv.project_id,
                llm_api_key_id = %key.id,
                error = %e,
                "Stored LLM credential could not be decoded"
            );
            return Ok(assistant::credential_error_reply(&e));
        }
    };

    let history = state
        .repos
        .messages
        .list_recent(conv.id, HISTORY_LIMIT)
        .await?;
    let request = assistant::build_completion_request(credential.adapter, &history, new_message);

    let outcome = match state.llm.service_for(&credential) {
        Ok(service) => {
            parley_llm::complete_with_retries(service.as_ref(), request, MAX_RETRIES).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = &outcome {
        tracing::warn!(
            conversation_id = %conv.id,
            adapter = %credential.adapter,
            error = %e,
            "LLM completion failed, replying with error text"
        );
    }

    Ok(assistant::reply_from_outcome(outcome))
}
