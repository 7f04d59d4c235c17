// src/rotation/coordinator.rs
//! Mint a new epoch and distribute it atomically

use std::collections::HashSet;
use std::sync::Arc;

use super::backend::{KeyringBackend, MemberKeyUpdate, ProjectMember, RotationBatch};
use crate::crypto::{Crypto, CryptoProvider, RustCryptoProvider};
use crate::error::CoreError;
use crate::keyring::{Epoch, EpochAllocator, Keyring};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Runs the rotation protocol against one backend
///
/// Callers serialize rotations per project; the coordinator assumes no other
/// rotation for the same project is in flight.
pub struct KeyRotationCoordinator<B, P = RustCryptoProvider> {
    crypto: Crypto<P>,
    backend: B,
    epochs: Arc<EpochAllocator>,
}

impl<B: KeyringBackend, P: CryptoProvider> KeyRotationCoordinator<B, P> {
    /// Coordinator drawing epochs from the process-wide allocator
    pub fn new(crypto: Crypto<P>, backend: B) -> Self {
        Self::with_allocator(crypto, backend, EpochAllocator::shared())
    }

    pub fn with_allocator(crypto: Crypto<P>, backend: B, epochs: Arc<EpochAllocator>) -> Self {
        Self {
            crypto,
            backend,
            epochs,
        }
    }

    pub fn epoch_allocator(&self) -> &Arc<EpochAllocator> {
        &self.epochs
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn crypto(&self) -> &Crypto<P> {
        &self.crypto
    }

    /// Rotate keys for every member not in `excluded_user_ids`
    ///
    /// Returns the new keyring once the backend has accepted the whole batch.
    pub async fn rotate_keys_for_project<S: AsRef<str>>(
        &self,
        project_id: &str,
        members: &[ProjectMember],
        excluded_user_ids: &[S],
    ) -> Result<Keyring> {
        self.rotate_keys_after(project_id, members, excluded_user_ids, None)
            .await
    }

    /// As [`Self::rotate_keys_for_project`], guaranteeing the new epoch sorts after `previous`
    pub async fn rotate_keys_after<S: AsRef<str>>(
        &self,
        project_id: &str,
        members: &[ProjectMember],
        excluded_user_ids: &[S],
        previous: Option<&Epoch>,
    ) -> Result<Keyring> {
        let (keyring, batch) = self.prepare_batch(members, excluded_user_ids, previous)?;

        tracing::info!(
            project_id,
            epoch = %batch.new_epoch,
            members = batch.updates.len(),
            "submitting key rotation"
        );
        self.backend
            .submit_rotation(project_id, &batch)
            .await
            .map_err(|e| {
                tracing::error!(project_id, error = %e, "key rotation rejected");
                CoreError::RotationSubmission(e.to_string())
            })?;

        tracing::info!(project_id, epoch = %batch.new_epoch, "key rotation committed");
        Ok(keyring)
    }

    /// Read the member list from the backend, then rotate
    pub async fn rotate_with_fetched_members<S: AsRef<str>>(
        &self,
        project_id: &str,
        excluded_user_ids: &[S],
        previous: Option<&Epoch>,
    ) -> Result<Keyring> {
        let members = self
            .backend
            .fetch_members(project_id)
            .await
            .map_err(|e| CoreError::Backend(e.to_string()))?;
        self.rotate_keys_after(project_id, &members, excluded_user_ids, previous)
            .await
    }

    /// Build the complete batch without touching the backend
    ///
    /// Membership is validated before anything secret is generated: an empty
    /// remaining set or a member without a public key aborts with no side
    /// effects. A failure while wrapping for any one member discards the
    /// whole batch.
    pub fn prepare_batch<S: AsRef<str>>(
        &self,
        members: &[ProjectMember],
        excluded_user_ids: &[S],
        previous: Option<&Epoch>,
    ) -> Result<(Keyring, RotationBatch)> {
        let recipients = remaining_recipients(members, excluded_user_ids)?;

        let epoch = self.epochs.next(previous);
        let keyring = Keyring::mint(&self.crypto, epoch.clone())?;

        let updates = recipients
            .iter()
            .map(|(user_id, public_key)| -> Result<MemberKeyUpdate> {
                Ok(MemberKeyUpdate {
                    user_id: (*user_id).to_owned(),
                    encrypted_passphrase: self
                        .crypto
                        .hybrid_encrypt(public_key, keyring.passphrase().as_bytes())?,
                    encrypted_signing_key: self
                        .crypto
                        .hybrid_encrypt(public_key, keyring.signing_private_key().as_bytes())?,
                    signing_public_key: keyring.signing_public_key().to_owned(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((
            keyring,
            RotationBatch {
                new_epoch: epoch,
                updates,
            },
        ))
    }
}

/// Remaining members paired with their public keys, or the reason rotation must not start
fn remaining_recipients<'a, S: AsRef<str>>(
    members: &'a [ProjectMember],
    excluded_user_ids: &[S],
) -> Result<Vec<(&'a str, &'a str)>> {
    let excluded: HashSet<&str> = excluded_user_ids.iter().map(|id| id.as_ref()).collect();
    let mut seen = HashSet::new();

    let remaining: Vec<&ProjectMember> = members
        .iter()
        .filter(|m| !excluded.contains(m.user_id.as_str()))
        .filter(|m| seen.insert(m.user_id.as_str()))
        .collect();

    if remaining.is_empty() {
        return Err(CoreError::NoRemainingMembers);
    }

    remaining
        .into_iter()
        .map(|m| match m.public_key.as_deref() {
            Some(key) if !key.is_empty() => Ok((m.user_id.as_str(), key)),
            _ => Err(CoreError::MissingMemberKey(m.user_id.clone())),
        })
        .collect()
}
