//! Authentication configuration

use parley_common::Config;

/// JWT validation settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Expected `iss` claim; not checked when unset
    pub issuer: Option<String>,
    /// Expected `aud` claim; not checked when unset
    pub audience: Option<String>,
}

impl From<&Config> for AuthConfig {
    fn from(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
        }
    }
}
