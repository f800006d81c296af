//! Shared utilities, configuration, and error handling for Parley
//!
//! This crate provides common functionality used across the Parley service:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Request extractors
//! - Encryption of stored provider secrets

pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use crypto::{CryptoError, SecretCipher};
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
