//! Encryption of stored database passwords.
//!
//! # Algorithms
//!
//! - **Key derivation**: SHA-256 of the service-wide secret, used directly as
//!   the 256-bit cipher key
//! - **Encryption**: ChaCha20-Poly1305 (authenticated encryption)
//! - **Encoding**: URL-safe base64 of `nonce || ciphertext || tag`
//!
//! Decrypting with a key derived from a different secret fails the
//! authentication tag check and surfaces as [`DecryptionError::Authentication`].

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use chacha20poly1305::{aead::Aead, ChaCha20Poly1305, Key, KeyInit, Nonce};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::DecryptionError;

/// Nonce length for ChaCha20-Poly1305 (12 bytes)
pub const NONCE_LEN: usize = 12;

/// Symmetric codec for tenant database passwords
#[derive(Clone)]
pub struct SecretCodec {
    key: [u8; 32],
}

impl fmt::Debug for SecretCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCodec").finish_non_exhaustive()
    }
}

impl SecretCodec {
    /// Build a codec from the service-wide secret
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self { key }
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.key))
    }

    /// Encrypt a plaintext password, returning a printable token.
    ///
    /// Every call uses a fresh random nonce, so encrypting the same
    /// plaintext twice yields different tokens.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, DecryptionError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| DecryptionError::Encryption)?;

        let mut token = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);
        Ok(URL_SAFE.encode(token))
    }

    /// Decrypt a token produced by [`SecretCodec::encrypt`]
    pub fn decrypt(&self, token: &str) -> Result<String, DecryptionError> {
        let raw = URL_SAFE
            .decode(token.trim())
            .map_err(|_| DecryptionError::Encoding)?;

        if raw.len() <= NONCE_LEN {
            return Err(DecryptionError::Truncated);
        }
        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);

        let plaintext = self
            .cipher()
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| DecryptionError::Authentication)?;

        String::from_utf8(plaintext).map_err(|_| DecryptionError::Utf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrypt_recovers_plaintext() {
        let codec = SecretCodec::from_secret("service-secret");
        for password in ["Ab3!xYz9@Qw#Er$t", "", "ünïcødé-pässwörd"] {
            let token = codec.encrypt(password).unwrap();
            assert_eq!(codec.decrypt(&token).unwrap(), password);
        }
    }

    #[test]
    fn test_same_secret_in_new_codec_decrypts() {
        let token = SecretCodec::from_secret("shared").encrypt("hunter2hunter2!!").unwrap();
        assert_eq!(
            SecretCodec::from_secret("shared").decrypt(&token).unwrap(),
            "hunter2hunter2!!"
        );
    }

    #[test]
    fn test_different_secret_fails() {
        let token = SecretCodec::from_secret("secret-a").encrypt("p@ssw0rd").unwrap();
        let result = SecretCodec::from_secret("secret-b").decrypt(&token);
        assert_eq!(result, Err(DecryptionError::Authentication));
    }

    #[test]
    fn test_tokens_are_nonce_randomized() {
        let codec = SecretCodec::from_secret("k");
        assert_ne!(codec.encrypt("same").unwrap(), codec.encrypt("same").unwrap());
    }

    #[test]
    fn test_corrupted_tokens() {
        let codec = SecretCodec::from_secret("k");
        assert_eq!(codec.decrypt("not base64 !!"), Err(DecryptionError::Encoding));
        assert_eq!(codec.decrypt(&URL_SAFE.encode([0u8; 4])), Err(DecryptionError::Truncated));

        let mut raw = URL_SAFE.decode(codec.encrypt("password").unwrap()).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        assert_eq!(
            codec.decrypt(&URL_SAFE.encode(raw)),
            Err(DecryptionError::Authentication)
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", SecretCodec::from_secret("top-secret"));
        assert!(!rendered.contains("top-secret"));
    }
}
