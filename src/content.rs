// src/content.rs
//! Epoch-tagged, signed project content
//!
//! Content is encrypted under the current keyring's passphrase and signed
//! with that epoch's signing key. The epoch tag lets any member holding the
//! matching keyring read it back after later rotations.

use serde::{Deserialize, Serialize};

use crate::aliases::PlainText;
use crate::crypto::{Crypto, CryptoProvider};
use crate::error::CoreError;
use crate::keyring::{find_by_epoch, Epoch, Keyring};

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedContent {
    pub epoch: Epoch,
    /// Flattened passphrase envelope
    pub encrypted: String,
    /// RSA-PSS over the flattened envelope bytes
    pub signature: String,
}

pub fn seal<P: CryptoProvider>(
    crypto: &Crypto<P>,
    keyring: &Keyring,
    plaintext: &[u8],
) -> Result<SealedContent> {
    let encrypted = crypto
        .passphrase_encrypt(keyring.passphrase(), plaintext, None, None)?
        .flatten();
    let signature = crypto.sign(keyring.signing_private_key(), encrypted.as_bytes())?;
    Ok(SealedContent {
        epoch: keyring.epoch().clone(),
        encrypted,
        signature,
    })
}

/// Verify, then decrypt with the keyring of the content's epoch
pub fn open<P: CryptoProvider>(
    crypto: &Crypto<P>,
    keyrings: &[Keyring],
    sealed: &SealedContent,
) -> Result<PlainText> {
    let keyring = find_by_epoch(keyrings, &sealed.epoch)
        .ok_or_else(|| CoreError::UnknownEpoch(sealed.epoch.clone()))?;

    let authentic = crypto.verify(
        keyring.signing_public_key(),
        &sealed.signature,
        sealed.encrypted.as_bytes(),
    )?;
    if !authentic {
        tracing::warn!(epoch = %sealed.epoch, "content signature mismatch");
        return Err(CoreError::SignatureVerification(format!(
            "signature does not match content of epoch {}",
            sealed.epoch
        )));
    }

    crypto.passphrase_decrypt_flat(keyring.passphrase(), &sealed.encrypted)
}
