// src/crypto/hybrid.rs
//! Hybrid RSA-OAEP + AES-256-GCM envelopes
//!
//! Wire format (bit-for-bit compatible with existing clients):
//!
//! ```text
//! HYBRID|<b64 wrapped AES key>|<b64 nonce>|<b64 ciphertext+tag>
//! ```
//!
//! A payload without the `HYBRID|` prefix is a legacy envelope: the whole
//! string is one base64 RSA-OAEP ciphertext. `|` is outside the base64
//! alphabet, so a legacy payload can never be mistaken for a hybrid one.

use crate::aliases::{PlainText, SymmetricKey32};
use crate::consts::{HYBRID_DELIMITER, HYBRID_PREFIX, NONCE_LEN, SYMMETRIC_KEY_LEN};
use crate::error::CoreError;

use super::{b64_decode, b64_encode, decode_key, Crypto, CryptoProvider, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeFormat {
    Hybrid,
    /// Direct RSA-OAEP over the whole plaintext
    Legacy,
}

/// Which decryption path an envelope string takes
pub fn envelope_format(envelope: &str) -> EnvelopeFormat {
    if envelope.starts_with(HYBRID_PREFIX) {
        EnvelopeFormat::Hybrid
    } else {
        EnvelopeFormat::Legacy
    }
}

/// Decoded hybrid envelope fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HybridEnvelope {
    pub wrapped_key: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl HybridEnvelope {
    pub fn encode(&self) -> String {
        format!(
            "{HYBRID_PREFIX}{}{HYBRID_DELIMITER}{}{HYBRID_DELIMITER}{}",
            b64_encode(&self.wrapped_key),
            b64_encode(&self.nonce),
            b64_encode(&self.ciphertext),
        )
    }

    /// Parse a `HYBRID|…` string; any structural problem is [`CoreError::Decryption`]
    pub fn decode(envelope: &str) -> Result<Self> {
        let body = envelope
            .strip_prefix(HYBRID_PREFIX)
            .ok_or(CoreError::Decryption)?;
        let parts: Vec<&str> = body.split(HYBRID_DELIMITER).collect();
        let [key, nonce, ciphertext] = parts.as_slice() else {
            return Err(CoreError::Decryption);
        };

        let nonce: [u8; NONCE_LEN] = b64_decode(nonce)
            .map_err(|_| CoreError::Decryption)?
            .try_into()
            .map_err(|_| CoreError::Decryption)?;

        Ok(Self {
            wrapped_key: b64_decode(key).map_err(|_| CoreError::Decryption)?,
            nonce,
            ciphertext: b64_decode(ciphertext).map_err(|_| CoreError::Decryption)?,
        })
    }
}

impl<P: CryptoProvider> Crypto<P> {
    /// Encrypt an arbitrary-length payload for the holder of `recipient_public_key`
    pub fn hybrid_encrypt(&self, recipient_public_key: &str, plaintext: &[u8]) -> Result<String> {
        let public_der = decode_key(recipient_public_key)?;

        let ephemeral = SymmetricKey32::new(self.random_array::<SYMMETRIC_KEY_LEN>());
        let nonce = self.random_array::<NONCE_LEN>();
        let ciphertext = self.provider.aead_encrypt(&ephemeral, &nonce, plaintext)?;
        let wrapped_key = self
            .provider
            .rsa_oaep_encrypt(&public_der, ephemeral.expose_secret())?;

        Ok(HybridEnvelope {
            wrapped_key,
            nonce,
            ciphertext,
        }
        .encode())
    }

    /// Decrypt a hybrid or legacy envelope
    ///
    /// Tag mismatch, wrong key and malformed envelopes all surface as the same
    /// [`CoreError::Decryption`]. Only an undecodable private key is reported
    /// as [`CoreError::KeyFormat`].
    pub fn hybrid_decrypt(&self, recipient_private_key: &str, envelope: &str) -> Result<PlainText> {
        let private_der = zeroize::Zeroizing::new(decode_key(recipient_private_key)?);

        match envelope_format(envelope) {
            EnvelopeFormat::Hybrid => {
                let parsed = HybridEnvelope::decode(envelope)?;
                let raw_key = self
                    .provider
                    .rsa_oaep_decrypt(&private_der, &parsed.wrapped_key)?;
                let key_bytes: [u8; SYMMETRIC_KEY_LEN] = raw_key
                    .as_slice()
                    .try_into()
                    .map_err(|_| CoreError::Decryption)?;
                let ephemeral = SymmetricKey32::new(key_bytes);
                let plaintext =
                    self.provider
                        .aead_decrypt(&ephemeral, &parsed.nonce, &parsed.ciphertext)?;
                Ok(PlainText::new(plaintext.to_vec()))
            }
            EnvelopeFormat::Legacy => {
                tracing::warn!("decrypting legacy direct RSA-OAEP envelope");
                let ciphertext = b64_decode(envelope).map_err(|_| CoreError::Decryption)?;
                let plaintext = self.provider.rsa_oaep_decrypt(&private_der, &ciphertext)?;
                Ok(PlainText::new(plaintext.to_vec()))
            }
        }
    }

    /// Produce a legacy direct RSA-OAEP envelope
    ///
    /// Only short payloads fit (446 bytes under a 4096-bit key). New data
    /// should always use [`Crypto::hybrid_encrypt`]; this exists for peers that
    /// still emit the old format.
    pub fn legacy_encrypt(&self, recipient_public_key: &str, plaintext: &[u8]) -> Result<String> {
        let public_der = decode_key(recipient_public_key)?;
        let ciphertext = self.provider.rsa_oaep_encrypt(&public_der, plaintext)?;
        Ok(b64_encode(&ciphertext))
    }
}
