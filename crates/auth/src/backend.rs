//! Concrete authentication backend
//!
//! Wraps `PgPool` + `AuthConfig` and owns auth-specific SQL queries.
//! Uses runtime `sqlx::query_as` (not macros) like the domain repositories.

use sqlx::PgPool;
use uuid::Uuid;

use crate::claims::JwtClaims;
use crate::config::AuthConfig;
use crate::context::{AuthContext, AuthIdentity};
use crate::error::AuthError;

/// Concrete authentication backend.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthBackend {
    pool: PgPool,
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(pool: PgPool, config: AuthConfig) -> Self {
        Self { pool, config }
    }

    /// Find user identity by ID
    pub(crate) async fn find_user(&self, id: Uuid) -> Result<Option<AuthIdentity>, AuthError> {
        let user: Option<AuthIdentity> = sqlx::query_as(
            r#"
            SELECT id, email, name, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %id, "Failed to load user");
            AuthError::UserLoadError
        })?;

        Ok(user)
    }

    /// Provision a new user from JWT claims (JIT user provisioning).
    ///
    /// Called on first authenticated request when the user doesn't exist in the DB.
    /// Uses `ON CONFLICT DO NOTHING` to handle concurrent first-requests safely.
    async fn provision_user_from_jwt(
        &self,
        user_id: Uuid,
        claims: &JwtClaims,
    ) -> Result<AuthIdentity, AuthError> {
        let email = claims.email.as_deref().ok_or(AuthError::MissingEmail)?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(claims.name.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %user_id, "Failed to provision user");
            AuthError::UserProvisionFailed
        })?;

        tracing::info!(user_id = %user_id, email = %email, "JIT user provisioned");

        self.find_user(user_id).await?.ok_or_else(|| {
            tracing::error!(user_id = %user_id, "User not found after provisioning");
            AuthError::UserProvisionFailed
        })
    }

    /// Validate a bearer token and resolve (or provision) its user.
    pub(crate) async fn authenticate_jwt(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = crate::jwt::validate_jwt_token(token, &self.config)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidUserId)?;

        let user = match self.find_user(user_id).await? {
            Some(user) => user,
            None => self.provision_user_from_jwt(user_id, &claims).await?,
        };

        Ok(AuthContext::new(user))
    }
}
