//! Conversations domain state and auth backend integration

use crate::ConversationsRepositories;
use axum::extract::FromRef;
use parley_auth::AuthBackend;
use parley_common::SecretCipher;
use parley_llm::LlmServiceProvider;
use std::sync::Arc;

/// Application state for the Conversations domain
#[derive(Clone)]
pub struct ConversationsState {
    pub repos: ConversationsRepositories,
    pub auth: AuthBackend,
    /// Decrypts stored provider secrets
    pub cipher: SecretCipher,
    /// Builds a provider client from a decoded credential
    pub llm: Arc<dyn LlmServiceProvider>,
}

impl FromRef<ConversationsState> for AuthBackend {
    fn from_ref(state: &ConversationsState) -> Self {
        state.auth.clone()
    }
}
