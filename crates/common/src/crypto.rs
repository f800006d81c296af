//! Symmetric encryption for secrets stored at rest
//!
//! Provider credentials keep their API key and custom headers encrypted with
//! AES-256-GCM. The stored format is `base64(nonce):base64(ciphertext)`.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("encryption key must be 32 bytes of hex")]
    InvalidKey,

    #[error("malformed encrypted payload")]
    MalformedPayload,

    #[error("unable to decrypt secret")]
    DecryptionFailed,

    #[error("unable to encrypt secret")]
    EncryptionFailed,
}

/// AES-256-GCM cipher bound to a single key.
#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for SecretCipher {
    #[mutants::skip] // Never prints key material
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCipher").finish_non_exhaustive()
    }
}

impl SecretCipher {
    /// Build a cipher from a 64-character hex key.
    pub fn from_hex(hex_key: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_key.trim()).map_err(|_| CryptoError::InvalidKey)?;
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKey);
        }
        let key = Key::<Aes256Gcm>::from_slice(&bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng); // 96-bits; unique per message
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptionFailed)?;

        Ok(format!(
            "{}:{}",
            general_purpose::STANDARD.encode(nonce),
            general_purpose::STANDARD.encode(ciphertext)
        ))
    }

    pub fn decrypt(&self, payload: &str) -> Result<String, CryptoError> {
        let (nonce_b64, data_b64) = payload
            .split_once(':')
            .ok_or(CryptoError::MalformedPayload)?;

        let nonce_bytes = general_purpose::STANDARD
            .decode(nonce_b64)
            .map_err(|_| CryptoError::MalformedPayload)?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(CryptoError::MalformedPayload);
        }
        let data = general_purpose::STANDARD
            .decode(data_b64)
            .map_err(|_| CryptoError::MalformedPayload)?;

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), data.as_ref())
            .map_err(|_| CryptoError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed)
    }
}
