//! Reply rules for the project assistant
//!
//! Everything here is pure: prompt assembly, the canned onboarding reply and
//! the texts that stand in for a provider answer when something goes wrong.

use std::fmt::Display;

use parley_llm::{CompletionRequest, CompletionResponse, LlmAdapter, LlmError, LlmMessage};

use super::entities::Message;

/// Fixed instruction sent ahead of the conversation history
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Provide clear, concise, and accurate responses to user questions.";

/// Most recent messages considered as context for a reply
pub const HISTORY_LIMIT: i64 = 20;

/// Extra attempts after the first failed provider call
pub const MAX_RETRIES: usize = 1;

pub const TEMPERATURE: f32 = 0.7;

pub const MAX_TOKENS: u32 = 1000;

/// Used when the provider answers without any text
pub const EMPTY_REPLY: &str = "I apologize, but I couldn't generate a response. Please try again.";

/// Reply sent while the project has no provider configured
pub fn onboarding_reply(content: &str) -> String {
    format!(
        "Hello! I received your message: \"{}\".\n\n\
         To get AI-generated answers here, add an LLM provider to this project:\n\
         1. Open the project settings and go to the LLM API keys section.\n\
         2. Add a key for OpenAI, Anthropic, or any OpenAI-compatible endpoint \
         (with a custom base URL and headers if needed).\n\
         3. Send your message again.\n\n\
         Once a provider is configured, replies in this conversation will come from it.",
        content
    )
}

/// Reply used when the provider call itself failed
pub fn provider_error_reply(error: &dyn Display) -> String {
    format!(
        "I'm sorry, but I encountered an error while generating a response: {}. \
         Please check the project's LLM configuration and try again.",
        error
    )
}

/// Reply used when the stored credential could not be decoded
pub fn credential_error_reply(error: &dyn Display) -> String {
    format!(
        "I'm sorry, but I encountered an error while reading this project's LLM configuration: {}. \
         Please update the API key in the project settings and try again.",
        error
    )
}

/// Assemble the completion request for `new_message`.
///
/// `history` is the recent window in chronological order. The new message is
/// dropped from it if present and always sent as the final user turn.
pub fn build_completion_request(
    adapter: LlmAdapter,
    history: &[Message],
    new_message: &Message,
) -> CompletionRequest {
    let mut messages: Vec<LlmMessage> = history
        .iter()
        .filter(|m| m.id != new_message.id)
        .map(|m| LlmMessage {
            role: m.sender.into(),
            content: m.content.clone(),
        })
        .collect();
    messages.push(LlmMessage::user(new_message.content.clone()));

    CompletionRequest {
        model: adapter.default_model().to_string(),
        system_prompt: Some(SYSTEM_PROMPT.to_string()),
        messages,
        temperature: Some(TEMPERATURE),
        max_tokens: Some(MAX_TOKENS),
    }
}

/// Turn the outcome of a provider call into the text the assistant posts.
/// Failures never escape; they become part of the conversation.
pub fn reply_from_outcome(outcome: Result<CompletionResponse, LlmError>) -> String {
    match outcome {
        Ok(response) => match response.content {
            Some(text) if !text.trim().is_empty() => text,
            _ => EMPTY_REPLY.to_string(),
        },
        Err(e) => provider_error_reply(&e),
    }
}
