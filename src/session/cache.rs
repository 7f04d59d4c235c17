// src/session/cache.rs
//! Volatile, tab-scoped cache of decrypted keyrings
//!
//! Every value written to [`SessionStorage`] is a flattened passphrase
//! envelope under the session wrapping secret. Slot names are derived by
//! encrypting the project id with a fixed salt and nonce, so repeated
//! access lands on the same slot without writing the id in clear.
//!
//! Getters never fail: a missing, corrupt or foreign slot reads as `None`
//! and the caller re-fetches from the backend.

use std::collections::HashMap;

use zeroize::{Zeroize, Zeroizing};

use super::storage::{MemorySessionStorage, SessionStorage};
use crate::aliases::{Passphrase, PlainText};
use crate::config::{SessionSettings, WrappingKeyMode};
use crate::consts::{
    FIXED_SESSION_WRAPPING_SECRET, SLOT_INDEX_NONCE, SLOT_INDEX_SALT, SYMMETRIC_KEY_LEN,
};
use crate::crypto::{into_text, Crypto, CryptoProvider, RustCryptoProvider};
use crate::error::CoreError;
use crate::keyring::{find_by_epoch, Epoch, Keyring};

pub type Result<T> = std::result::Result<T, CoreError>;

const EPOCH_SLOT: &str = "epoch";

/// Named per-project key material kept next to the keyrings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectKeySlot {
    EncryptionPrivateKey,
    EncryptionPublicKey,
    SigningPrivateKey,
    SigningPublicKey,
}

impl ProjectKeySlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EncryptionPrivateKey => "project_encryption_private_key",
            Self::EncryptionPublicKey => "project_encryption_public_key",
            Self::SigningPrivateKey => "project_signing_private_key",
            Self::SigningPublicKey => "project_signing_public_key",
        }
    }
}

pub struct SessionKeyCache<S = MemorySessionStorage, P = RustCryptoProvider> {
    crypto: Crypto<P>,
    storage: S,
    wrapping_secret: Passphrase,
    slot_prefix: String,
    project_tokens: HashMap<String, String>,
    // in-memory mirror, one page instance only
    keyrings: HashMap<String, Vec<Keyring>>,
    epochs: HashMap<String, Epoch>,
}

impl<S: SessionStorage, P: CryptoProvider> SessionKeyCache<S, P> {
    pub fn new(crypto: Crypto<P>, storage: S, settings: &SessionSettings) -> Self {
        let wrapping_secret = match settings.wrapping_key {
            WrappingKeyMode::Ephemeral => {
                let mut bytes = crypto.random_array::<SYMMETRIC_KEY_LEN>();
                let secret = Passphrase::new(hex::encode(bytes));
                bytes.zeroize();
                secret
            }
            WrappingKeyMode::Fixed => {
                tracing::warn!(
                    "session cache uses the fixed wrapping key: cached keyrings are obfuscated, not protected"
                );
                Passphrase::new(FIXED_SESSION_WRAPPING_SECRET.to_owned())
            }
        };

        Self {
            crypto,
            storage,
            wrapping_secret,
            slot_prefix: settings.slot_prefix.clone(),
            project_tokens: HashMap::new(),
            keyrings: HashMap::new(),
            epochs: HashMap::new(),
        }
    }

    pub fn crypto(&self) -> &Crypto<P> {
        &self.crypto
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    // ── epoch pointer ────────────────────────────────────────────

    pub fn set_epoch(&mut self, project_id: &str, epoch: &Epoch) -> Result<()> {
        let slot = self.slot_name(project_id, Some(EPOCH_SLOT))?;
        let value = self.wrap(epoch.as_str().as_bytes())?;
        self.storage.set_item(&slot, value);
        self.epochs.insert(project_id.to_owned(), epoch.clone());
        Ok(())
    }

    pub fn get_epoch(&mut self, project_id: &str) -> Option<Epoch> {
        if let Some(epoch) = self.epochs.get(project_id) {
            return Some(epoch.clone());
        }
        let slot = self.slot_name(project_id, Some(EPOCH_SLOT)).ok()?;
        let plaintext = self.read_slot(&slot)?;
        let epoch = Epoch::new(into_text(&plaintext).ok()?);
        self.epochs.insert(project_id.to_owned(), epoch.clone());
        Some(epoch)
    }

    // ── keyrings ─────────────────────────────────────────────────

    /// Replace the project's cached keyrings; stored oldest epoch first
    pub fn set_keyrings(&mut self, project_id: &str, keyrings: &[Keyring]) -> Result<()> {
        let mut ordered = keyrings.to_vec();
        ordered.sort();

        let slot = self.slot_name(project_id, None)?;
        let json = Zeroizing::new(serde_json::to_vec(&ordered)?);
        let value = self.wrap(&json)?;
        self.storage.set_item(&slot, value);

        tracing::debug!(project_id, count = ordered.len(), "cached project keyrings");
        self.keyrings.insert(project_id.to_owned(), ordered);
        Ok(())
    }

    pub fn get_keyrings(&mut self, project_id: &str) -> Option<&[Keyring]> {
        if !self.keyrings.contains_key(project_id) {
            let loaded = self.load_keyrings(project_id)?;
            self.keyrings.insert(project_id.to_owned(), loaded);
        }
        self.keyrings.get(project_id).map(Vec::as_slice)
    }

    pub fn get_keyring(&mut self, project_id: &str, epoch: &Epoch) -> Option<&Keyring> {
        find_by_epoch(self.get_keyrings(project_id)?, epoch)
    }

    pub fn remove_keyrings(&mut self, project_id: &str) {
        self.keyrings.remove(project_id);
        if let Ok(slot) = self.slot_name(project_id, None) {
            self.storage.remove_item(&slot);
        }
    }

    // ── named project key slots ──────────────────────────────────

    pub fn set_project_secret(
        &mut self,
        slot: ProjectKeySlot,
        project_id: &str,
        value: &str,
    ) -> Result<()> {
        let name = self.slot_name(project_id, Some(slot.as_str()))?;
        let wrapped = self.wrap(value.as_bytes())?;
        self.storage.set_item(&name, wrapped);
        Ok(())
    }

    pub fn get_project_secret(
        &mut self,
        slot: ProjectKeySlot,
        project_id: &str,
    ) -> Option<Zeroizing<String>> {
        let name = self.slot_name(project_id, Some(slot.as_str())).ok()?;
        let plaintext = self.read_slot(&name)?;
        into_text(&plaintext).ok().map(Zeroizing::new)
    }

    pub fn remove_project_secret(&mut self, slot: ProjectKeySlot, project_id: &str) {
        if let Ok(name) = self.slot_name(project_id, Some(slot.as_str())) {
            self.storage.remove_item(&name);
        }
    }

    // ── erasure ──────────────────────────────────────────────────

    /// Erase every project slot this cache owns (explicit lock)
    pub fn lock_project(&mut self) {
        for key in self.storage.keys() {
            if key.starts_with(&self.slot_prefix) {
                self.storage.remove_item(&key);
            }
        }
        self.keyrings.clear();
        self.epochs.clear();
        tracing::debug!("session cache locked");
    }

    /// Wipe the whole session storage (logout)
    pub fn clear(&mut self) {
        self.storage.clear();
        self.keyrings.clear();
        self.epochs.clear();
        self.project_tokens.clear();
    }

    /// Keep only `project_id`'s entries resident
    pub fn release_other_projects(&mut self, project_id: &str) {
        let Ok(root) = self.slot_name(project_id, None) else {
            self.lock_project();
            return;
        };

        for key in self.storage.keys() {
            if key.starts_with(&self.slot_prefix) && !belongs_to(&key, &root) {
                self.storage.remove_item(&key);
            }
        }
        self.keyrings.retain(|id, _| id == project_id);
        self.epochs.retain(|id, _| id == project_id);
        self.project_tokens.retain(|id, _| id == project_id);
    }

    // ── internals ────────────────────────────────────────────────

    fn secret(&self) -> &str {
        self.wrapping_secret.expose_secret()
    }

    /// Deterministic slot token for a project, memoised per cache
    fn project_token(&mut self, project_id: &str) -> Result<String> {
        if let Some(token) = self.project_tokens.get(project_id) {
            return Ok(token.clone());
        }
        let envelope = self.crypto.passphrase_encrypt(
            self.secret(),
            project_id.as_bytes(),
            Some(&SLOT_INDEX_SALT),
            Some(&SLOT_INDEX_NONCE),
        )?;
        self.project_tokens
            .insert(project_id.to_owned(), envelope.ciphertext.clone());
        Ok(envelope.ciphertext)
    }

    fn slot_name(&mut self, project_id: &str, suffix: Option<&str>) -> Result<String> {
        let token = self.project_token(project_id)?;
        let root = format!("{}{}", self.slot_prefix, token);
        Ok(match suffix {
            Some(suffix) => format!("{root}:{suffix}"),
            None => root,
        })
    }

    fn wrap(&self, plaintext: &[u8]) -> Result<String> {
        let envelope = self
            .crypto
            .passphrase_encrypt(self.secret(), plaintext, None, None)?;
        Ok(envelope.flatten())
    }

    fn read_slot(&self, slot: &str) -> Option<PlainText> {
        let stored = self.storage.get_item(slot)?;
        match self.crypto.passphrase_decrypt_flat(self.secret(), &stored) {
            Ok(plaintext) => Some(plaintext),
            Err(err) => {
                tracing::warn!(error = %err, "unreadable session slot treated as absent");
                None
            }
        }
    }

    fn load_keyrings(&mut self, project_id: &str) -> Option<Vec<Keyring>> {
        let slot = self.slot_name(project_id, None).ok()?;
        let plaintext = self.read_slot(&slot)?;
        match serde_json::from_slice::<Vec<Keyring>>(plaintext.expose_secret()) {
            Ok(keyrings) => Some(keyrings),
            Err(err) => {
                tracing::warn!(project_id, error = %err, "cached keyrings did not parse");
                None
            }
        }
    }
}

/// `key` is the project's root slot or one of its `root:<suffix>` slots
fn belongs_to(key: &str, root: &str) -> bool {
    key.strip_prefix(root)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
}

#[cfg(test)]
mod tests {
    use super::belongs_to;

    #[test]
    fn slot_ownership_requires_separator() {
        assert!(belongs_to("kr_project_abc", "kr_project_abc"));
        assert!(belongs_to("kr_project_abc:epoch", "kr_project_abc"));
        assert!(!belongs_to("kr_project_abcd", "kr_project_abc"));
        assert!(!belongs_to("kr_project_xyz", "kr_project_abc"));
    }
}
