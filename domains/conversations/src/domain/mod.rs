//! Conversations domain layer: entities, provider credentials, reply rules

pub mod assistant;
pub mod credentials;
pub mod entities;
