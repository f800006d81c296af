//! Read access to project LLM credentials

use crate::domain::credentials::LlmApiKey;
use parley_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct LlmApiKeyRepository {
    pool: PgPool,
}

impl LlmApiKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Most recently created credential for a project, if any
    pub async fn find_latest_for_project(&self, project_id: Uuid) -> Result<Option<LlmApiKey>> {
        let key = sqlx::query_as::<_, LlmApiKey>(
            r#"
            SELECT id, project_id, provider, adapter, secret_key, display_secret_key,
                   base_url, extra_headers, created_at, updated_at
            FROM llm_api_keys
            WHERE project_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    /// Insert an already-encrypted credential row
    pub async fn create(&self, key: &LlmApiKey) -> Result<LlmApiKey> {
        let created = sqlx::query_as::<_, LlmApiKey>(
            r#"
            INSERT INTO llm_api_keys (
                id, project_id, provider, adapter, secret_key, display_secret_key,
                base_url, extra_headers, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, project_id, provider, adapter, secret_key, display_secret_key,
                      base_url, extra_headers, created_at, updated_at
            "#,
        )
        .bind(key.id)
        .bind(key.project_id)
        .bind(&key.provider)
        .bind(&key.adapter)
        .bind(&key.secret_key)
        .bind(&key.display_secret_key)
        .bind(&key.base_url)
        .bind(&key.extra_headers)
        .bind(key.created_at)
        .bind(key.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }
}
