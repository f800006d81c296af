//! Parley application composition root
//!
//! Composes the domain routers and shared HTTP layers into a single application.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use parley_auth::{AuthBackend, AuthConfig};
use parley_common::{Config, SecretCipher};
use parley_conversations::{ConversationsRepositories, ConversationsState};
use parley_llm::{LlmServiceFactory, LlmServiceProvider};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create the main application router with all routes and middleware
pub async fn create_app(config: Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let llm = LlmServiceFactory::new(Duration::from_secs(config.llm_timeout_secs));
    create_app_with_provider(config, pool, Arc::new(llm)).await
}

/// Same as [`create_app`] but with an explicit LLM provider
pub async fn create_app_with_provider(
    config: Config,
    pool: PgPool,
    llm: Arc<dyn LlmServiceProvider>,
) -> Result<Router, anyhow::Error> {
    let cipher = SecretCipher::from_hex(&config.encryption_key)
        .map_err(|e| anyhow::anyhow!("Invalid ENCRYPTION_KEY: {}", e))?;

    let auth = AuthBackend::new(pool.clone(), AuthConfig::from(&config));

    let conversations_state = ConversationsState {
        repos: ConversationsRepositories::new(pool),
        auth,
        cipher,
        llm,
    };

    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { concat!("Parley API v", env!("CARGO_PKG_VERSION")) }),
        )
        .merge(parley_conversations::routes().with_state(conversations_state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(build_cors_layer(config.cors_allowed_origins.as_deref())?);

    Ok(app)
}

/// Restrict CORS to the configured origins, or allow everything when none are set
pub fn build_cors_layer(origins: Option<&[String]>) -> Result<CorsLayer, anyhow::Error> {
    let Some(origins) = origins.filter(|o| !o.is_empty()) else {
        return Ok(CorsLayer::permissive());
    };

    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", o))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
