// src/crypto/keypair.rs
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::aliases::PlainText;
use crate::error::CoreError;

use super::{b64_encode, Crypto, CryptoProvider, KeyPurpose, Result};

/// Text-encoded keypair: base64 SPKI public key, base64 PKCS#8 private key
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    #[zeroize(skip)]
    pub purpose: KeyPurpose,
    pub public_key: String,
    pub private_key: String,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("purpose", &self.purpose)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

impl KeyPair {
    /// `self`, if it was generated for `purpose`
    pub fn ensure_purpose(&self, purpose: KeyPurpose) -> Result<&Self> {
        if self.purpose == purpose {
            Ok(self)
        } else {
            Err(CoreError::WrongKeyPurpose {
                expected: purpose,
                actual: self.purpose,
            })
        }
    }
}

impl<P: CryptoProvider> Crypto<P> {
    /// Generate an RSA keypair for one purpose (OAEP or PSS, SHA-256)
    pub fn generate_key_pair(&self, purpose: KeyPurpose) -> Result<KeyPair> {
        let raw = self.provider.generate_key_pair(purpose)?;
        Ok(KeyPair {
            purpose,
            public_key: b64_encode(&raw.public_der),
            private_key: b64_encode(&raw.private_der),
        })
    }

    /// [`Crypto::hybrid_encrypt`] to an encryption keypair's public half
    pub fn hybrid_encrypt_to(&self, recipient: &KeyPair, plaintext: &[u8]) -> Result<String> {
        let recipient = recipient.ensure_purpose(KeyPurpose::Encryption)?;
        self.hybrid_encrypt(&recipient.public_key, plaintext)
    }

    /// [`Crypto::hybrid_decrypt`] with an encryption keypair's private half
    pub fn hybrid_decrypt_with(&self, recipient: &KeyPair, envelope: &str) -> Result<PlainText> {
        let recipient = recipient.ensure_purpose(KeyPurpose::Encryption)?;
        self.hybrid_decrypt(&recipient.private_key, envelope)
    }

    /// [`Crypto::sign`] with a signing keypair
    pub fn sign_with(&self, signer: &KeyPair, data: &[u8]) -> Result<String> {
        let signer = signer.ensure_purpose(KeyPurpose::Signing)?;
        self.sign(&signer.private_key, data)
    }

    /// [`Crypto::verify`] against a signing keypair's public half
    pub fn verify_with(&self, signer: &KeyPair, signature: &str, data: &[u8]) -> Result<bool> {
        let signer = signer.ensure_purpose(KeyPurpose::Signing)?;
        self.verify(&signer.public_key, signature, data)
    }
}
