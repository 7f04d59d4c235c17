// src/crypto/signing.rs
//! RSA-PSS (SHA-256, 32-byte salt) signatures over arbitrary data

use crate::error::CoreError;

use super::{b64_decode, b64_encode, decode_key, Crypto, CryptoProvider, Result};

impl<P: CryptoProvider> Crypto<P> {
    pub fn sign(&self, private_key: &str, data: &[u8]) -> Result<String> {
        let private_der = zeroize::Zeroizing::new(decode_key(private_key)?);
        let signature = self.provider.pss_sign(&private_der, data)?;
        Ok(b64_encode(&signature))
    }

    /// `Ok(false)` for a signature that does not match; `Err` only when the
    /// key or signature encoding is malformed
    pub fn verify(&self, public_key: &str, signature: &str, data: &[u8]) -> Result<bool> {
        let public_der = b64_decode(public_key)
            .map_err(|e| CoreError::SignatureVerification(format!("public key: {e}")))?;
        let signature = b64_decode(signature)
            .map_err(|e| CoreError::SignatureVerification(format!("signature: {e}")))?;
        self.provider.pss_verify(&public_der, &signature, data)
    }
}
