// src/session/loader.rs
//! Cache-first keyring loading
//!
//! On a miss the member's bundle is fetched from the backend, unlocked and
//! decrypted, and everything recovered is written back to the cache.

use zeroize::Zeroizing;

use super::cache::{ProjectKeySlot, SessionKeyCache};
use super::storage::SessionStorage;
use crate::crypto::CryptoProvider;
use crate::error::CoreError;
use crate::keyring::{latest, Keyring};
use crate::rotation::KeyringBackend;

pub type Result<T> = std::result::Result<T, CoreError>;

/// How the calling member proves access to their own private key
#[derive(Clone, Copy)]
pub enum MemberCredential<'a> {
    /// Private encryption key already unlocked for this session
    PrivateKey(&'a str),
    /// Personal passphrase that unwraps the backend-stored private key
    Passphrase(&'a str),
}

impl std::fmt::Debug for MemberCredential<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrivateKey(_) => f.write_str("PrivateKey(<redacted>)"),
            Self::Passphrase(_) => f.write_str("Passphrase(<redacted>)"),
        }
    }
}

pub async fn load_project_keyrings<B, S, P>(
    cache: &mut SessionKeyCache<S, P>,
    backend: &B,
    project_id: &str,
    credential: MemberCredential<'_>,
) -> Result<Vec<Keyring>>
where
    B: KeyringBackend + ?Sized,
    S: SessionStorage,
    P: CryptoProvider,
{
    if let Some(keyrings) = cache.get_keyrings(project_id) {
        tracing::debug!(project_id, "keyrings served from session cache");
        return Ok(keyrings.to_vec());
    }

    tracing::debug!(project_id, "session cache miss, fetching keyrings");
    let bundle = backend
        .fetch_member_keyrings(project_id)
        .await
        .map_err(|e| CoreError::Backend(e.to_string()))?;

    let private_key = match credential {
        MemberCredential::PrivateKey(key) => Zeroizing::new(key.to_owned()),
        MemberCredential::Passphrase(passphrase) => {
            bundle.unlock_private_key(cache.crypto(), passphrase)?
        }
    };
    let keyrings = bundle.decrypt_keyrings(cache.crypto(), &private_key)?;

    cache.set_keyrings(project_id, &keyrings)?;
    if let Some(current) = latest(&keyrings) {
        cache.set_epoch(project_id, current.epoch())?;
    }
    cache.set_project_secret(ProjectKeySlot::EncryptionPrivateKey, project_id, &private_key)?;

    tracing::info!(project_id, epochs = keyrings.len(), "project keyrings loaded");
    Ok(keyrings)
}
