// src/session/mod.rs
//! Session-scoped key state
//!
//! A [`SessionContext`] is the explicit lifetime of one logged-in page: it
//! owns the primitive layer and the keyring cache, hands out rotation
//! coordinators, and wipes everything on [`SessionContext::end`].
mod cache;
mod loader;
mod storage;

pub use cache::{ProjectKeySlot, SessionKeyCache};
pub use loader::{load_project_keyrings, MemberCredential};
pub use storage::{MemorySessionStorage, SessionStorage};

use std::sync::Arc;

use crate::config::Config;
use crate::crypto::{Crypto, CryptoProvider, RustCryptoProvider};
use crate::error::CoreError;
use crate::keyring::{EpochAllocator, Keyring};
use crate::rotation::{KeyRotationCoordinator, KeyringBackend};

pub struct SessionContext<S = MemorySessionStorage, P = RustCryptoProvider> {
    crypto: Crypto<P>,
    cache: SessionKeyCache<S, P>,
    epochs: Arc<EpochAllocator>,
}

impl SessionContext {
    /// Software crypto and in-memory session storage, configured from `config`
    pub fn start(config: &Config) -> Self {
        let crypto = Crypto::from_settings(&config.crypto);
        let cache = SessionKeyCache::new(crypto.clone(), MemorySessionStorage::new(), &config.session);
        tracing::debug!(wrapping_key = ?config.session.wrapping_key, "session started");
        Self::with_parts(crypto, cache)
    }
}

impl<S: SessionStorage, P: CryptoProvider + Clone> SessionContext<S, P> {
    pub fn with_parts(crypto: Crypto<P>, cache: SessionKeyCache<S, P>) -> Self {
        Self {
            crypto,
            cache,
            epochs: EpochAllocator::shared(),
        }
    }

    pub fn crypto(&self) -> &Crypto<P> {
        &self.crypto
    }

    pub fn cache(&self) -> &SessionKeyCache<S, P> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut SessionKeyCache<S, P> {
        &mut self.cache
    }

    /// A rotation coordinator sharing this session's primitives and epoch floor
    pub fn coordinator<B: KeyringBackend>(&self, backend: B) -> KeyRotationCoordinator<B, P> {
        KeyRotationCoordinator::with_allocator(
            self.crypto.clone(),
            backend,
            Arc::clone(&self.epochs),
        )
    }

    /// Keyrings of `project_id`, cache first
    pub async fn load_keyrings<B: KeyringBackend + ?Sized>(
        &mut self,
        backend: &B,
        project_id: &str,
        credential: MemberCredential<'_>,
    ) -> Result<Vec<Keyring>, CoreError> {
        load_project_keyrings(&mut self.cache, backend, project_id, credential).await
    }

    /// Logout: wipe every cached secret
    pub fn end(mut self) {
        self.cache.clear();
        tracing::debug!("session ended");
    }
}
