// src/keyring/bundle.rs
//! Member-side keyring bundles as delivered by the backend
//!
//! At login or invitation acceptance a member receives their own private
//! encryption key, wrapped by their personal passphrase, plus one
//! [`EncryptedKeyring`] per epoch they were granted.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{Epoch, Keyring};
use crate::crypto::{into_text, Crypto, CryptoProvider, PassphraseEnvelope};
use crate::error::CoreError;
use crate::rotation::MemberKeyUpdate;

pub type Result<T> = std::result::Result<T, CoreError>;

/// One epoch's keyring, hybrid-wrapped for a single member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedKeyring {
    pub epoch: Epoch,
    pub encrypted_passphrase: String,
    pub encrypted_signing_key: String,
    pub signing_public_key: String,
}

/// Everything a member needs to reconstruct their keyrings for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberKeyringBundle {
    /// Flattened passphrase envelope around the member's private encryption key
    pub encrypted_private_key: String,
    pub keyrings: Vec<EncryptedKeyring>,
}

impl EncryptedKeyring {
    /// The member's view of a rotation update
    pub fn from_update(epoch: Epoch, update: &MemberKeyUpdate) -> Self {
        Self {
            epoch,
            encrypted_passphrase: update.encrypted_passphrase.clone(),
            encrypted_signing_key: update.encrypted_signing_key.clone(),
            signing_public_key: update.signing_public_key.clone(),
        }
    }

    pub fn decrypt<P: CryptoProvider>(
        &self,
        crypto: &Crypto<P>,
        member_private_key: &str,
    ) -> Result<Keyring> {
        let passphrase =
            into_text(&crypto.hybrid_decrypt(member_private_key, &self.encrypted_passphrase)?)?;
        let signing_private_key =
            into_text(&crypto.hybrid_decrypt(member_private_key, &self.encrypted_signing_key)?)?;
        Ok(Keyring::from_parts(
            self.epoch.clone(),
            passphrase,
            self.signing_public_key.clone(),
            signing_private_key,
        ))
    }
}

impl MemberKeyringBundle {
    /// Recover the member's private encryption key with their personal passphrase
    pub fn unlock_private_key<P: CryptoProvider>(
        &self,
        crypto: &Crypto<P>,
        user_passphrase: &str,
    ) -> Result<Zeroizing<String>> {
        let plaintext = crypto.passphrase_decrypt_flat(user_passphrase, &self.encrypted_private_key)?;
        into_text(&plaintext).map(Zeroizing::new)
    }

    /// Decrypt every granted epoch, ordered oldest first
    ///
    /// Any single failure fails the whole bundle; a partial keyring list would
    /// silently hide content of the missing epochs.
    pub fn decrypt_keyrings<P: CryptoProvider>(
        &self,
        crypto: &Crypto<P>,
        member_private_key: &str,
    ) -> Result<Vec<Keyring>> {
        let mut keyrings = self
            .keyrings
            .iter()
            .map(|encrypted| encrypted.decrypt(crypto, member_private_key))
            .collect::<Result<Vec<_>>>()?;
        keyrings.sort();
        keyrings.dedup();
        Ok(keyrings)
    }
}

/// Wrap a member's private encryption key under their personal passphrase
pub fn wrap_private_key<P: CryptoProvider>(
    crypto: &Crypto<P>,
    user_passphrase: &str,
    private_key: &str,
) -> Result<String> {
    let envelope: PassphraseEnvelope =
        crypto.passphrase_encrypt(user_passphrase, private_key.as_bytes(), None, None)?;
    Ok(envelope.flatten())
}
