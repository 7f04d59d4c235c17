// tests/support.rs
//! Test utilities: fast crypto and an in-memory backend

#![allow(dead_code)] // each test binary uses a different subset

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use zeroize::Zeroizing;

use keyring_core::aliases::SymmetricKey32;
use keyring_core::config::{CryptoSettings, SessionSettings, WrappingKeyMode};
use keyring_core::consts::{DEFAULT_SLOT_PREFIX, MIN_KDF_ITERATIONS, NONCE_LEN};
use keyring_core::crypto::{Crypto, CryptoProvider, KeyPair, KeyPurpose, RawKeyPair, RustCryptoProvider};
use keyring_core::error::CoreError;
use keyring_core::keyring::{EncryptedKeyring, MemberKeyringBundle};
use keyring_core::rotation::{BackendError, KeyringBackend, ProjectMember, RotationBatch};

pub type Result<T> = std::result::Result<T, CoreError>;

/// 2048-bit keys keep keygen-heavy tests quick; the KDF stays at production strength
pub fn fast_settings() -> CryptoSettings {
    CryptoSettings {
        rsa_modulus_bits: 2048,
        kdf_iterations: MIN_KDF_ITERATIONS,
    }
}

pub fn fast_crypto() -> Crypto {
    Crypto::from_settings(&fast_settings())
}

pub fn session_settings(mode: WrappingKeyMode) -> SessionSettings {
    SessionSettings {
        wrapping_key: mode,
        slot_prefix: DEFAULT_SLOT_PREFIX.to_string(),
    }
}

/// A member with a freshly generated encryption keypair
pub fn member_with_keys<P: CryptoProvider>(crypto: &Crypto<P>, user_id: &str) -> (ProjectMember, KeyPair) {
    let keys = crypto
        .generate_key_pair(KeyPurpose::Encryption)
        .expect("member keypair");
    let member = ProjectMember {
        user_id: user_id.to_string(),
        user_name: format!("{user_id} (test)"),
        public_key: Some(keys.public_key.clone()),
    };
    (member, keys)
}

pub fn member_without_key(user_id: &str) -> ProjectMember {
    ProjectMember {
        user_id: user_id.to_string(),
        user_name: user_id.to_string(),
        public_key: None,
    }
}

// ──────────────────────────────────────────────────────────────
// Backend
// ──────────────────────────────────────────────────────────────

/// Records submitted batches; can be told to reject the next submission
#[derive(Default)]
pub struct InMemoryBackend {
    members: Mutex<HashMap<String, Vec<ProjectMember>>>,
    bundles: Mutex<HashMap<String, MemberKeyringBundle>>,
    submitted: Mutex<Vec<(String, RotationBatch)>>,
    fail_submission: AtomicBool,
    bundle_fetches: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_members(project_id: &str, members: Vec<ProjectMember>) -> Self {
        let backend = Self::new();
        backend
            .members
            .lock()
            .unwrap()
            .insert(project_id.to_string(), members);
        backend
    }

    pub fn put_bundle(&self, project_id: &str, bundle: MemberKeyringBundle) {
        self.bundles
            .lock()
            .unwrap()
            .insert(project_id.to_string(), bundle);
    }

    pub fn fail_submissions(&self, fail: bool) {
        self.fail_submission.store(fail, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<(String, RotationBatch)> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn bundle_fetches(&self) -> usize {
        self.bundle_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyringBackend for InMemoryBackend {
    async fn fetch_members(&self, project_id: &str) -> std::result::Result<Vec<ProjectMember>, BackendError> {
        self.members
            .lock()
            .unwrap()
            .get(project_id)
            .cloned()
            .ok_or_else(|| BackendError::new(format!("unknown project {project_id}")))
    }

    async fn submit_rotation(
        &self,
        project_id: &str,
        batch: &RotationBatch,
    ) -> std::result::Result<(), BackendError> {
        if self.fail_submission.load(Ordering::SeqCst) {
            return Err(BackendError::new("transaction aborted"));
        }
        self.submitted
            .lock()
            .unwrap()
            .push((project_id.to_string(), batch.clone()));
        Ok(())
    }

    async fn fetch_member_keyrings(
        &self,
        project_id: &str,
    ) -> std::result::Result<MemberKeyringBundle, BackendError> {
        self.bundle_fetches.fetch_add(1, Ordering::SeqCst);
        self.bundles
            .lock()
            .unwrap()
            .get(project_id)
            .cloned()
            .ok_or_else(|| BackendError::new(format!("no keyrings for {project_id}")))
    }
}

/// The bundle a member would receive after `batch` was committed
pub fn bundle_for(
    batch: &RotationBatch,
    user_id: &str,
    encrypted_private_key: String,
) -> MemberKeyringBundle {
    let keyrings = batch
        .updates
        .iter()
        .filter(|update| update.user_id == user_id)
        .map(|update| EncryptedKeyring::from_update(batch.new_epoch.clone(), update))
        .collect();
    MemberKeyringBundle {
        encrypted_private_key,
        keyrings,
    }
}

// ──────────────────────────────────────────────────────────────
// Provider
// ──────────────────────────────────────────────────────────────

/// Software provider that counts the operations routed through it
#[derive(Default)]
pub struct CountingProvider {
    inner: RustCryptoProvider,
    pub key_generations: AtomicUsize,
    pub oaep_encryptions: AtomicUsize,
    pub random_fills: AtomicUsize,
}

impl CountingProvider {
    pub fn new() -> Self {
        Self {
            inner: RustCryptoProvider::new(&fast_settings()),
            ..Self::default()
        }
    }

    pub fn key_generations(&self) -> usize {
        self.key_generations.load(Ordering::SeqCst)
    }

    pub fn oaep_encryptions(&self) -> usize {
        self.oaep_encryptions.load(Ordering::SeqCst)
    }

    pub fn random_fills(&self) -> usize {
        self.random_fills.load(Ordering::SeqCst)
    }
}

impl CryptoProvider for CountingProvider {
    fn fill_random(&self, buf: &mut [u8]) {
        self.random_fills.fetch_add(1, Ordering::SeqCst);
        self.inner.fill_random(buf);
    }

    fn generate_key_pair(&self, purpose: KeyPurpose) -> Result<RawKeyPair> {
        self.key_generations.fetch_add(1, Ordering::SeqCst);
        self.inner.generate_key_pair(purpose)
    }

    fn rsa_oaep_encrypt(&self, public_der: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.oaep_encryptions.fetch_add(1, Ordering::SeqCst);
        self.inner.rsa_oaep_encrypt(public_der, plaintext)
    }

    fn rsa_oaep_decrypt(&self, private_der: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        self.inner.rsa_oaep_decrypt(private_der, ciphertext)
    }

    fn aead_encrypt(&self, key: &SymmetricKey32, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.inner.aead_encrypt(key, nonce, plaintext)
    }

    fn aead_decrypt(
        &self,
        key: &SymmetricKey32,
        nonce: &[u8; NONCE_LEN],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.inner.aead_decrypt(key, nonce, ciphertext)
    }

    fn derive_key(&self, passphrase: &[u8], salt: &[u8]) -> SymmetricKey32 {
        self.inner.derive_key(passphrase, salt)
    }

    fn pss_sign(&self, private_der: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        self.inner.pss_sign(private_der, data)
    }

    fn pss_verify(&self, public_der: &[u8], signature: &[u8], data: &[u8]) -> Result<bool> {
        self.inner.pss_verify(public_der, signature, data)
    }
}
