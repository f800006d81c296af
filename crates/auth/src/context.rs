//! Identity of the caller behind a request

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lightweight view of a `users` row.
///
/// The users table belongs to the wider application; auth only reads the
/// columns it needs and inserts a row on first sight of a new subject.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthIdentity {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents an authenticated user context
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: AuthIdentity,
}

impl AuthContext {
    pub fn new(user: AuthIdentity) -> Self {
        Self { user }
    }

    /// ID of the authenticated user
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }
}
