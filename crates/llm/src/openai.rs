//! OpenAI-compatible Chat Completions implementation
//!
//! Works against api.openai.com and any server exposing the same
//! `/chat/completions` contract at a custom base URL.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    http_client, normalize_base_url, CompletionRequest, CompletionResponse, LlmConfig, LlmError,
    LlmService,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: i32,
    completion_tokens: i32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

pub struct OpenAiService {
    client: Client,
    config: LlmConfig,
    base_url: String,
}

impl OpenAiService {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let base_url = normalize_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL));

        Ok(Self {
            client: http_client(&config)?,
            config,
            base_url,
        })
    }
}

#[async_trait::async_trait]
impl LlmService for OpenAiService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.model
        };

        let max_tokens = request.max_tokens.unwrap_or(self.config.max_tokens);

        // The system instruction travels as the first chat turn
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.extend(request.messages.into_iter().map(|m| ChatMessage {
            role: m.role.as_str(),
            content: m.content,
        }));

        let body = ChatRequest {
            model: model.clone(),
            messages,
            max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(model = %model, max_tokens = %max_tokens, url = %url, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimit);
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            let message = serde_json::from_str::<ErrorResponse>(&error_body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(error_body);

            return Err(LlmError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Response(format!("Failed to parse response: {}", e)))?;

        let (content, stop_reason) = match api_response.choices.into_iter().next() {
            Some(choice) => (
                choice.message.content.filter(|text| !text.is_empty()),
                choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
            ),
            None => (None, "stop".to_string()),
        };

        let (input_tokens, output_tokens) = api_response
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        Ok(CompletionResponse {
            content,
            model: api_response.model.unwrap_or(model),
            input_tokens,
            output_tokens,
            stop_reason,
        })
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
