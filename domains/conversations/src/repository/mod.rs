//! Repository implementations for the Conversations domain

pub mod conversations;
pub mod llm_api_keys;
pub mod messages;

use sqlx::PgPool;

pub use conversations::ConversationRepository;
pub use llm_api_keys::LlmApiKeyRepository;
pub use messages::MessageRepository;

/// Combined repository access for the Conversations domain
#[derive(Clone)]
pub struct ConversationsRepositories {
    pub conversations: ConversationRepository,
    pub messages: MessageRepository,
    pub llm_api_keys: LlmApiKeyRepository,
}

impl ConversationsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            conversations: ConversationRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            llm_api_keys: LlmApiKeyRepository::new(pool),
        }
    }
}
