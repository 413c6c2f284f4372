//! Field-level encryption for PII columns.
//!
//! Values are sealed with AES-256-GCM before they reach the database and the
//! stored form is `base64(nonce || ciphertext)`. Each call draws a fresh
//! random nonce, so encrypting the same plaintext twice yields different
//! ciphertexts.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("encryption failed")]
    Encrypt,
    #[error("decryption failed")]
    Decrypt,
    #[error("malformed ciphertext: {0}")]
    Malformed(String),
}

/// Encrypts and decrypts individual string fields.
#[derive(Clone)]
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl FieldCipher {
    /// Build a cipher from a base64-encoded 32-byte key.
    pub fn from_base64_key(encoded: &str) -> Result<Self, CryptoError> {
        let raw = BASE64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        if raw.len() != 32 {
            return Err(CryptoError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                raw.len()
            )));
        }
        let key = Key::<Aes256Gcm>::from_slice(&raw);
        Ok(Self { cipher: Aes256Gcm::new(key) })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let sealed = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encrypt)?;
        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(BASE64.encode(out))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let raw = BASE64
            .decode(encoded)
            .map_err(|e| CryptoError::Malformed(e.to_string()))?;
        if raw.len() <= NONCE_LEN {
            return Err(CryptoError::Malformed("ciphertext too short".into()));
        }
        let (nonce_bytes, sealed) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        let plain = self
            .cipher
            .decrypt(nonce, sealed)
            .map_err(|_| CryptoError::Decrypt)?;
        String::from_utf8(plain).map_err(|e| CryptoError::Malformed(e.to_string()))
    }
}

/// Generate a fresh base64 key, handy for provisioning `PII_KEY`.
pub fn generate_base64_key() -> String {
    let mut raw = [0u8; 32];
    OsRng.fill_bytes(&mut raw);
    BASE64.encode(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> FieldCipher {
        FieldCipher::from_base64_key(&generate_base64_key()).unwrap()
    }

    #[test]
    fn round_trip() {
        let c = cipher();
        let sealed = c.encrypt("Alice").unwrap();
        assert_ne!(sealed, "Alice");
        assert_eq!(c.decrypt(&sealed).unwrap(), "Alice");
    }

    #[test]
    fn fresh_nonce_per_call() {
        let c = cipher();
        assert_ne!(c.encrypt("same").unwrap(), c.encrypt("same").unwrap());
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = cipher().encrypt("secret").unwrap();
        let other = cipher();
        assert!(matches!(other.decrypt(&sealed), Err(CryptoError::Decrypt)));
    }

    #[test]
    fn rejects_short_key() {
        let short = BASE64.encode([0u8; 16]);
        assert!(FieldCipher::from_base64_key(&short).is_err());
    }

    #[test]
    fn rejects_garbage_ciphertext() {
        let c = cipher();
        assert!(c.decrypt("not-base64!!").is_err());
        assert!(c.decrypt(&BASE64.encode([1u8; 4])).is_err());
    }
}
