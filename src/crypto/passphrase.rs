// src/crypto/passphrase.rs
//! Passphrase envelopes: PBKDF2-HMAC-SHA256 (≥ 600k iterations) + AES-256-GCM

use serde::{Deserialize, Serialize};

use crate::aliases::PlainText;
use crate::consts::{ENVELOPE_DELIMITER, NONCE_LEN, SALT_LEN};
use crate::error::CoreError;

use super::{b64_decode, b64_encode, Crypto, CryptoProvider, Result};

/// Passphrase-encrypted payload, every field base64
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassphraseEnvelope {
    pub ciphertext: String,
    pub iv: String,
    pub salt: String,
}

impl PassphraseEnvelope {
    /// `ciphertext<delimiter>salt<delimiter>iv`
    pub fn flatten(&self) -> String {
        format!(
            "{}{ENVELOPE_DELIMITER}{}{ENVELOPE_DELIMITER}{}",
            self.ciphertext, self.salt, self.iv
        )
    }

    pub fn parse(flattened: &str) -> Result<Self> {
        let parts: Vec<&str> = flattened.split(ENVELOPE_DELIMITER).collect();
        let [ciphertext, salt, iv] = parts.as_slice() else {
            return Err(CoreError::Decryption);
        };
        Ok(Self {
            ciphertext: (*ciphertext).to_owned(),
            iv: (*iv).to_owned(),
            salt: (*salt).to_owned(),
        })
    }
}

impl<P: CryptoProvider> Crypto<P> {
    /// Encrypt under a passphrase-derived key
    ///
    /// `salt` and `iv` are random unless supplied. Fixed values make the output
    /// deterministic and are only meant for slot-name derivation; never pass
    /// them when encrypting actual content.
    pub fn passphrase_encrypt(
        &self,
        passphrase: &str,
        plaintext: &[u8],
        salt: Option<&[u8; SALT_LEN]>,
        iv: Option<&[u8; NONCE_LEN]>,
    ) -> Result<PassphraseEnvelope> {
        let salt = salt.copied().unwrap_or_else(|| self.random_array());
        let iv = iv.copied().unwrap_or_else(|| self.random_array());

        let key = self.provider.derive_key(passphrase.as_bytes(), &salt);
        let ciphertext = self.provider.aead_encrypt(&key, &iv, plaintext)?;

        Ok(PassphraseEnvelope {
            ciphertext: b64_encode(&ciphertext),
            iv: b64_encode(&iv),
            salt: b64_encode(&salt),
        })
    }

    /// Re-derive the key from the envelope's salt and decrypt; fails closed
    pub fn passphrase_decrypt(
        &self,
        passphrase: &str,
        envelope: &PassphraseEnvelope,
    ) -> Result<PlainText> {
        let salt = b64_decode(&envelope.salt).map_err(|_| CoreError::Decryption)?;
        let iv: [u8; NONCE_LEN] = b64_decode(&envelope.iv)
            .map_err(|_| CoreError::Decryption)?
            .try_into()
            .map_err(|_| CoreError::Decryption)?;
        let ciphertext = b64_decode(&envelope.ciphertext).map_err(|_| CoreError::Decryption)?;

        let key = self.provider.derive_key(passphrase.as_bytes(), &salt);
        let plaintext = self.provider.aead_decrypt(&key, &iv, &ciphertext)?;
        Ok(PlainText::new(plaintext.to_vec()))
    }

    /// [`Crypto::passphrase_decrypt`] over the flattened wire form
    pub fn passphrase_decrypt_flat(&self, passphrase: &str, flattened: &str) -> Result<PlainText> {
        self.passphrase_decrypt(passphrase, &PassphraseEnvelope::parse(flattened)?)
    }
}
