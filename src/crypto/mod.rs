// src/crypto/mod.rs
//! Pure cryptographic operations, no I/O and no storage
//!
//! [`Crypto`] is the stateless primitive layer: keypair generation, hybrid
//! and passphrase envelopes, RSA-PSS signatures. Keys and envelopes cross
//! this boundary text-encoded (base64 of SPKI / PKCS#8 DER), matching what
//! the backend stores. Primitives never retry.
mod hybrid;
mod keypair;
mod passphrase;
mod provider;
mod signing;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub use hybrid::{envelope_format, EnvelopeFormat, HybridEnvelope};
pub use keypair::KeyPair;
pub use passphrase::PassphraseEnvelope;
pub use provider::{CryptoProvider, KeyPurpose, RawKeyPair, RustCryptoProvider};

use crate::aliases::PlainText;
use crate::config::CryptoSettings;
use crate::error::CoreError;

pub type Result<T> = std::result::Result<T, CoreError>;

/// The CryptoPrimitives surface, generic over the platform capability
#[derive(Debug, Clone, Default)]
pub struct Crypto<P = RustCryptoProvider> {
    provider: P,
}

impl Crypto<RustCryptoProvider> {
    /// Software provider configured from `[crypto]` settings
    pub fn from_settings(settings: &CryptoSettings) -> Self {
        Self::new(RustCryptoProvider::new(settings))
    }
}

impl<P: CryptoProvider> Crypto<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub(crate) fn random_array<const N: usize>(&self) -> [u8; N] {
        let mut out = [0u8; N];
        self.provider.fill_random(&mut out);
        out
    }
}

pub(crate) fn b64_encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub(crate) fn b64_decode(text: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text)
}

/// Decode key material, mapping failures to [`CoreError::KeyFormat`]
pub(crate) fn decode_key(text: &str) -> Result<Vec<u8>> {
    b64_decode(text).map_err(|e| CoreError::KeyFormat(e.to_string()))
}

/// Interpret decrypted bytes as UTF-8 text; invalid text is a failed decryption
pub(crate) fn into_text(plaintext: &PlainText) -> Result<String> {
    String::from_utf8(plaintext.expose_secret().clone()).map_err(|_| CoreError::Decryption)
}
