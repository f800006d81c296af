//! Project-scoped LLM provider credentials
//!
//! Rows live in `llm_api_keys` and are managed elsewhere. This domain only
//! reads the newest one per project and decodes it into an `LlmCredential`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parley_common::{CryptoError, SecretCipher};
use parley_llm::{LlmAdapter, LlmCredential, LlmError};
use uuid::Uuid;

/// Why a stored credential could not be turned into a usable one
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("unsupported provider adapter '{0}'")]
    UnsupportedAdapter(String),

    #[error("the stored API key could not be decrypted ({0})")]
    Secret(#[from] CryptoError),

    #[error("custom headers are not a JSON object of strings ({0})")]
    Headers(String),
}

/// Stored credential row; `secret_key` and `extra_headers` are ciphertext
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LlmApiKey {
    pub id: Uuid,
    pub project_id: Uuid,
    pub provider: String,
    pub adapter: String,
    pub secret_key: String,
    pub display_secret_key: String,
    pub base_url: Option<String>,
    pub extra_headers: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LlmApiKey {
    /// Build a new row, encrypting the secret and headers with `cipher`.
    pub fn new(
        project_id: Uuid,
        provider: &str,
        adapter: LlmAdapter,
        api_key: &str,
        base_url: Option<String>,
        extra_headers: &HashMap<String, String>,
        cipher: &SecretCipher,
    ) -> Result<Self, CredentialError> {
        let extra_headers = if extra_headers.is_empty() {
            None
        } else {
            let json = serde_json::to_string(extra_headers)
                .map_err(|e| CredentialError::Headers(e.to_string()))?;
            Some(cipher.encrypt(&json)?)
        };

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            project_id,
            provider: provider.to_string(),
            adapter: adapter.to_string(),
            secret_key: cipher.encrypt(api_key)?,
            display_secret_key: mask_secret(api_key),
            base_url,
            extra_headers,
            created_at: now,
            updated_at: now,
        })
    }

    /// Decrypt and validate the row into a credential the LLM crate accepts.
    pub fn decode(&self, cipher: &SecretCipher) -> Result<LlmCredential, CredentialError> {
        let adapter = self.adapter.parse::<LlmAdapter>().map_err(|e| match e {
            LlmError::UnsupportedAdapter(name) => CredentialError::UnsupportedAdapter(name),
            other => CredentialError::UnsupportedAdapter(other.to_string()),
        })?;

        let api_key = cipher.decrypt(&self.secret_key)?;

        let extra_headers = match &self.extra_headers {
            Some(sealed) => {
                let json = cipher.decrypt(sealed)?;
                serde_json::from_str::<HashMap<String, String>>(&json)
                    .map_err(|e| CredentialError::Headers(e.to_string()))?
            }
            None => HashMap::new(),
        };

        let base_url = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        Ok(LlmCredential {
            adapter,
            api_key,
            base_url,
            extra_headers,
        })
    }
}

/// Keep just enough of a key to recognise it: `sk-...abcd`
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
