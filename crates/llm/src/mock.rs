//! Mock LLM Service Implementation
//!
//! Used by `LlmServiceFactory` when the adapter is `"mock"`.
//! Returns deterministic responses for testing.

use crate::{CompletionRequest, CompletionResponse, LlmError, LlmService};

/// Mock LLM service for testing
#[derive(Debug, Clone, Default)]
pub struct MockLlmService {
    failure: Option<String>,
}

impl MockLlmService {
    /// Create a mock that echoes the last message back
    pub fn new() -> Self {
        Self { failure: None }
    }

    /// Create a mock whose every call fails with a non-retryable error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
        }
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tracing::info!("Mock LLM service processing completion request");

        if let Some(message) = &self.failure {
            return Err(LlmError::Http {
                status: 400,
                message: message.clone(),
            });
        }

        let model = if request.model.is_empty() {
            "mock-model".to_string()
        } else {
            request.model
        };

        // Generate a simple response based on the last user message
        let last_message = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or("empty");

        let content = format!("Mock response to: {}", last_message);
        let input_tokens = request
            .messages
            .iter()
            .map(|m| m.content.len() as i32 / 4)
            .sum::<i32>();
        let output_tokens = content.len() as i32 / 4;

        Ok(CompletionResponse {
            content: Some(content),
            model,
            input_tokens,
            output_tokens,
            stop_reason: "end_turn".to_string(),
        })
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}
