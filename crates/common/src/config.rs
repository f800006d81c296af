//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (PostgreSQL)
    pub database_url: String,
    pub database_max_connections: u32,

    /// JWT validation
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,

    /// Hex-encoded 256-bit key used to decrypt stored provider secrets
    pub encryption_key: String,

    /// Comma-separated list; permissive CORS when absent
    pub cors_allowed_origins: Option<Vec<String>>,

    /// Upper bound for a single completion call
    pub llm_timeout_secs: u64,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} is required", key))
        };

        let encryption_key = required("ENCRYPTION_KEY")?;
        if encryption_key.len() != 64 || hex::decode(&encryption_key).is_err() {
            anyhow::bail!("ENCRYPTION_KEY must be 64 hex characters");
        }

        let config = Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),

            jwt_secret: required("JWT_SECRET")?,
            jwt_issuer: lookup("JWT_ISSUER").filter(|v| !v.is_empty()),
            jwt_audience: lookup("JWT_AUDIENCE").filter(|v| !v.is_empty()),

            encryption_key,

            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS").map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),

            llm_timeout_secs: lookup("LLM_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS),

            rust_log: lookup("RUST_LOG")
                .unwrap_or_else(|| "parley=debug,tower_http=info".to_string()),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        };

        Ok(config)
    }
}
