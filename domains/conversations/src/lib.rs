//! Conversations domain: project-scoped chat threads and the assistant replying in them

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::credentials::{CredentialError, LlmApiKey};
pub use domain::entities::{Conversation, ConversationSummary, Message, MessageSender};

// Re-export repository types
pub use repository::{
    ConversationRepository, ConversationsRepositories, LlmApiKeyRepository, MessageRepository,
};

// Re-export API types
pub use api::routes;
pub use api::ConversationsState;
