//! LLM completion services for Parley
//!
//! Defines the provider-neutral `LlmService` trait plus adapters for
//! OpenAI-compatible Chat Completions endpoints and the Anthropic Messages API.
//! `LlmServiceFactory` turns a decoded project credential into a ready service.

mod anthropic;
mod mock;
mod openai;
mod retry;

#[cfg(feature = "test-support")]
pub mod testing;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

pub use anthropic::AnthropicService;
pub use mock::MockLlmService;
pub use openai::OpenAiService;
pub use retry::complete_with_retries;

const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Speaker of a single turn in a completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    User,
    Assistant,
}

impl LlmRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmRole::User => "user",
            LlmRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

impl LlmMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::Assistant,
            content: content.into(),
        }
    }
}

/// A single non-streaming completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier; empty means the service default
    pub model: String,
    pub system_prompt: Option<String>,
    pub messages: Vec<LlmMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text; `None` when the provider returned no text content
    pub content: Option<String>,
    pub model: String,
    pub input_tokens: i32,
    pub output_tokens: i32,
    pub stop_reason: String,
}

/// Errors raised while talking to a completion provider
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM provider returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("LLM rate limit exceeded")]
    RateLimit,

    #[error("Invalid LLM response: {0}")]
    Response(String),

    #[error("Invalid LLM configuration: {0}")]
    Configuration(String),

    #[error("Unsupported LLM adapter: {0}")]
    UnsupportedAdapter(String),
}

impl LlmError {
    /// Transport failures, rate limits and 5xx responses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Request(_) | LlmError::RateLimit => true,
            LlmError::Http { status, .. } => *status >= 500,
            LlmError::Response(_)
            | LlmError::Configuration(_)
            | LlmError::UnsupportedAdapter(_) => false,
        }
    }
}

/// Provider-neutral completion service
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    fn default_model(&self) -> &str;
}

/// Wire protocol spoken by a configured provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmAdapter {
    /// OpenAI Chat Completions, or any endpoint compatible with it
    OpenAi,
    Anthropic,
    Mock,
}

impl LlmAdapter {
    /// Model used when a project credential does not pin one
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmAdapter::OpenAi => "gpt-4o-mini",
            LlmAdapter::Anthropic => "claude-3-5-haiku-latest",
            LlmAdapter::Mock => "mock-model",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmAdapter::OpenAi => "openai",
            LlmAdapter::Anthropic => "anthropic",
            LlmAdapter::Mock => "mock",
        }
    }
}

impl fmt::Display for LlmAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmAdapter {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "openai_compatible" => Ok(LlmAdapter::OpenAi),
            "anthropic" => Ok(LlmAdapter::Anthropic),
            "mock" => Ok(LlmAdapter::Mock),
            other => Err(LlmError::UnsupportedAdapter(other.to_string())),
        }
    }
}

/// Decrypted provider credential, ready to build a service from
#[derive(Clone)]
pub struct LlmCredential {
    pub adapter: LlmAdapter,
    pub api_key: String,
    pub base_url: Option<String>,
    pub extra_headers: HashMap<String, String>,
}

impl fmt::Debug for LlmCredential {
    #[mutants::skip] // Formatting only; redaction is covered by a unit test
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmCredential")
            .field("adapter", &self.adapter)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("extra_headers", &self.extra_headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Per-service configuration
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub default_model: String,
    pub max_tokens: u32,
    pub extra_headers: HashMap<String, String>,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn from_credential(credential: &LlmCredential, timeout: Duration) -> Self {
        Self {
            api_key: credential.api_key.clone(),
            base_url: credential.base_url.clone(),
            default_model: credential.adapter.default_model().to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            extra_headers: credential.extra_headers.clone(),
            timeout,
        }
    }
}

/// Build the HTTP client shared by the adapters: request timeout plus the
/// credential's custom headers applied to every call.
pub(crate) fn http_client(config: &LlmConfig) -> Result<reqwest::Client, LlmError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.extra_headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| LlmError::Configuration(format!("invalid header name '{}'", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| LlmError::Configuration(format!("invalid value for header '{}'", name)))?;
        headers.insert(name, value);
    }

    reqwest::Client::builder()
        .timeout(config.timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| LlmError::Configuration(format!("HTTP client: {}", e)))
}

/// Trim the trailing slash so `{base}/path` joins cleanly
pub(crate) fn normalize_base_url(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

/// Resolves a credential to a completion service.
///
/// The conversations domain holds this behind an `Arc<dyn _>` so tests can
/// swap in a provider that fails on demand.
pub trait LlmServiceProvider: Send + Sync {
    fn service_for(&self, credential: &LlmCredential) -> Result<Arc<dyn LlmService>, LlmError>;
}

/// Production provider: dispatches on the credential's adapter
#[derive(Debug, Clone)]
pub struct LlmServiceFactory {
    timeout: Duration,
}

impl LlmServiceFactory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for LlmServiceFactory {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl LlmServiceProvider for LlmServiceFactory {
    fn service_for(&self, credential: &LlmCredential) -> Result<Arc<dyn LlmService>, LlmError> {
        let config = LlmConfig::from_credential(credential, self.timeout);
        let service: Arc<dyn LlmService> = match credential.adapter {
            LlmAdapter::OpenAi => Arc::new(OpenAiService::new(config)?),
            LlmAdapter::Anthropic => Arc::new(AnthropicService::new(config)?),
            LlmAdapter::Mock => Arc::new(MockLlmService::new()),
        };
        Ok(service)
    }
}
