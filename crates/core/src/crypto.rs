//! Authenticated encryption for cookie payloads.
//!
//! Payloads are sealed with AES-256-GCM under a key derived from the
//! configured secret (SHA-256). The sealed form is
//! `base64url(nonce || ciphertext || tag)` without padding, safe to place in a
//! cookie value as is.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// AES-GCM standard nonce length in bytes.
const NONCE_LEN: usize = 12;

#[derive(Clone)]
pub struct SessionCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for SessionCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionCipher(..)")
    }
}

impl SessionCipher {
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(digest.as_slice());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    pub fn seal(&self, plaintext: &[u8]) -> Result<String, CoreError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CoreError::Internal("Cookie encryption failed".into()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(nonce.as_slice());
        sealed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Open a sealed value. Any tampering, truncation or foreign key yields
    /// [`CoreError::Unauthorized`].
    pub fn open(&self, sealed: &str) -> Result<Vec<u8>, CoreError> {
        let invalid = || CoreError::Unauthorized("Invalid session".into());

        let bytes = URL_SAFE_NO_PAD.decode(sealed.trim()).map_err(|_| invalid())?;
        if bytes.len() <= NONCE_LEN {
            return Err(invalid());
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| invalid())
    }

    pub fn seal_json<T: Serialize>(&self, value: &T) -> Result<String, CoreError> {
        let json = serde_json::to_vec(value)
            .map_err(|e| CoreError::Internal(format!("Cookie serialization failed: {e}")))?;
        self.seal(&json)
    }

    pub fn open_json<T: DeserializeOwned>(&self, sealed: &str) -> Result<T, CoreError> {
        let plaintext = self.open(sealed)?;
        serde_json::from_slice(&plaintext)
            .map_err(|_| CoreError::Unauthorized("Invalid session".into()))
    }
}
