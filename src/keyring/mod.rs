// src/keyring/mod.rs
//! Per-project, epoch-versioned keyrings
//!
//! A [`Keyring`] bundles one epoch's symmetric content passphrase with the
//! project's signing identity for that epoch. Keyrings are immutable: a
//! rotation mints a new one and never touches older epochs.
mod bundle;
mod epoch;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use bundle::{wrap_private_key, EncryptedKeyring, MemberKeyringBundle};
pub use epoch::{Epoch, EpochAllocator};

use crate::consts::EPOCH_PASSPHRASE_BYTES;
use crate::crypto::{Crypto, CryptoProvider, KeyPurpose};
use crate::error::CoreError;

#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Keyring {
    #[zeroize(skip)]
    epoch: Epoch,
    passphrase: String,
    signing_public_key: String,
    signing_private_key: String,
}

impl Keyring {
    /// Mint a fresh keyring: 256-bit random passphrase and a new RSA-PSS keypair
    ///
    /// Nothing is derived from earlier epochs.
    pub fn mint<P: CryptoProvider>(crypto: &Crypto<P>, epoch: Epoch) -> Result<Self, CoreError> {
        let mut entropy = crypto.random_array::<EPOCH_PASSPHRASE_BYTES>();
        let passphrase = hex::encode(entropy);
        entropy.zeroize();

        let signing = crypto.generate_key_pair(KeyPurpose::Signing)?;
        Ok(Self {
            epoch,
            passphrase,
            signing_public_key: signing.public_key.clone(),
            signing_private_key: signing.private_key.clone(),
        })
    }

    pub(crate) fn from_parts(
        epoch: Epoch,
        passphrase: String,
        signing_public_key: String,
        signing_private_key: String,
    ) -> Self {
        Self {
            epoch,
            passphrase,
            signing_public_key,
            signing_private_key,
        }
    }

    pub fn epoch(&self) -> &Epoch {
        &self.epoch
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    pub fn signing_public_key(&self) -> &str {
        &self.signing_public_key
    }

    pub fn signing_private_key(&self) -> &str {
        &self.signing_private_key
    }
}

impl std::fmt::Debug for Keyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyring")
            .field("epoch", &self.epoch)
            .field("signing_public_key", &self.signing_public_key)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Keyring {
    fn eq(&self, other: &Self) -> bool {
        self.epoch == other.epoch
    }
}

impl Eq for Keyring {}

impl PartialOrd for Keyring {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keyring {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch.cmp(&other.epoch)
    }
}

/// Find the keyring of one epoch
pub fn find_by_epoch<'a>(keyrings: &'a [Keyring], epoch: &Epoch) -> Option<&'a Keyring> {
    keyrings.iter().find(|keyring| keyring.epoch() == epoch)
}

/// The keyring with the highest epoch
pub fn latest(keyrings: &[Keyring]) -> Option<&Keyring> {
    keyrings.iter().max()
}
