//! Token encryption
//!
//! Wraps a compact JWS in AES-256-GCM so claims are not readable in transit.
//!
//! ## Encryption Format
//!
//! `base64url_nopad(nonce || ciphertext || tag)`
//! - Nonce (12 bytes): random per token
//! - Ciphertext (variable): encrypted JWS
//! - Tag (16 bytes): authentication tag
//!
//! The output uses the URL-safe alphabet and no dots, so it still fits in an
//! `Authorization: Bearer` header and is never mistaken for a plain JWS.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::RngCore;

use crate::JwtError;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Key length for AES-256
pub const KEY_LEN: usize = 32;

/// AES-256-GCM token encryptor
#[derive(Clone)]
pub struct TokenEncryptor {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for TokenEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEncryptor").finish_non_exhaustive()
    }
}

impl TokenEncryptor {
    /// Create from a raw 32-byte key
    pub fn new(key: &[u8]) -> Result<Self, JwtError> {
        if key.len() != KEY_LEN {
            return Err(JwtError::InvalidKey(format!(
                "encryption key must be {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| JwtError::InvalidKey(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// Create from a base64-encoded 32-byte key
    pub fn from_base64(key_base64: &str) -> Result<Self, JwtError> {
        let key = STANDARD
            .decode(key_base64.trim())
            .map_err(|e| JwtError::InvalidKey(format!("failed to decode base64 key: {e}")))?;
        Self::new(&key)
    }

    /// Generate a fresh random key, base64-encoded
    pub fn generate_key() -> String {
        let mut key = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        STANDARD.encode(key)
    }

    /// Encrypt a signed token
    pub fn encrypt(&self, token: &str) -> Result<String, JwtError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, token.as_bytes())
            .map_err(|_| JwtError::Encryption)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Decrypt back to the signed token
    pub fn decrypt(&self, sealed: &str) -> Result<String, JwtError> {
        let sealed = URL_SAFE_NO_PAD
            .decode(sealed)
            .map_err(|_| JwtError::Decryption)?;
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(JwtError::Decryption);
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| JwtError::Decryption)?;

        String::from_utf8(plaintext).map_err(|_| JwtError::Decryption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encryptor() -> TokenEncryptor {
        TokenEncryptor::new(&[7u8; KEY_LEN]).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt() {
        let enc = encryptor();
        let sealed = enc.encrypt("header.payload.signature").unwrap();

        assert!(!sealed.contains('.'));
        assert_eq!(enc.decrypt(&sealed).unwrap(), "header.payload.signature");
    }

    #[test]
    fn test_nonce_is_random() {
        let enc = encryptor();
        assert_ne!(enc.encrypt("same").unwrap(), enc.encrypt("same").unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = encryptor().encrypt("secret").unwrap();
        let other = TokenEncryptor::new(&[8u8; KEY_LEN]).unwrap();
        assert!(matches!(other.decrypt(&sealed), Err(JwtError::Decryption)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let enc = encryptor();
        let sealed = enc.encrypt("secret").unwrap();
        let mut raw = URL_SAFE_NO_PAD.decode(&sealed).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(raw);

        assert!(matches!(enc.decrypt(&tampered), Err(JwtError::Decryption)));
    }

    #[test]
    fn test_short_input_fails() {
        assert!(matches!(encryptor().decrypt("AAAA"), Err(JwtError::Decryption)));
        assert!(matches!(encryptor().decrypt("not base64!"), Err(JwtError::Decryption)));
    }

    #[test]
    fn test_key_validation() {
        assert!(matches!(
            TokenEncryptor::new(&[0u8; 16]),
            Err(JwtError::InvalidKey(_))
        ));
        assert!(TokenEncryptor::from_base64(&TokenEncryptor::generate_key()).is_ok());
        assert!(TokenEncryptor::from_base64("***").is_err());
    }
}
