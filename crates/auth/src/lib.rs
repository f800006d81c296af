//! Authentication middleware for the Parley API
//!
//! Provides JWT validation and an axum extractor that works with any domain
//! state implementing `FromRef<S>` for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;

pub use backend::AuthBackend;
pub use claims::JwtClaims;
pub use config::AuthConfig;
pub use context::{AuthContext, AuthIdentity};
pub use error::AuthError;
pub use extractors::AuthUser;
