//! Test doubles for crates that depend on `LlmServiceProvider`
//!
//! Enabled with the `test-support` feature.

use std::sync::{Arc, Mutex};

use crate::{
    CompletionRequest, CompletionResponse, LlmCredential, LlmError, LlmService, LlmServiceProvider,
};

/// Provider that hands out the same service for every credential and
/// remembers which credentials it was asked about.
pub struct StaticLlmProvider {
    service: Arc<dyn LlmService>,
    seen: Mutex<Vec<LlmCredential>>,
}

impl StaticLlmProvider {
    pub fn new(service: Arc<dyn LlmService>) -> Self {
        Self {
            service,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn credentials(&self) -> Vec<LlmCredential> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl LlmServiceProvider for StaticLlmProvider {
    fn service_for(&self, credential: &LlmCredential) -> Result<Arc<dyn LlmService>, LlmError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(credential.clone());
        }
        Ok(self.service.clone())
    }
}

/// Service that records every request and answers with a fixed reply.
/// A `None` reply simulates a provider returning no text.
pub struct RecordingLlmService {
    reply: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl RecordingLlmService {
    pub fn new(reply: Option<&str>) -> Self {
        Self {
            reply: reply.map(str::to_string),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LlmService for RecordingLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = request.model.clone();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        Ok(CompletionResponse {
            content: self.reply.clone(),
            model,
            input_tokens: 0,
            output_tokens: 0,
            stop_reason: "stop".to_string(),
        })
    }

    fn default_model(&self) -> &str {
        "recording-model"
    }
}
