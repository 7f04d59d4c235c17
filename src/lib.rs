// src/lib.rs
//! keyring-core: end-to-end key management for collaborative projects
//!
//! Features:
//! - RSA-OAEP hybrid envelopes (`HYBRID|`) with legacy read support
//! - PBKDF2 (600k) + AES-256-GCM passphrase envelopes
//! - Epoch-versioned project keyrings with RSA-PSS signing identities
//! - Atomic key rotation against a pluggable backend
//! - Session-scoped, wrapped keyring cache with per-project isolation

pub mod aliases;
pub mod config;
pub mod consts;
pub mod content;
pub mod crypto;
pub mod keyring;
pub mod rotation;
pub mod session;

pub mod error;

// Re-export everything users need at the crate root
pub use aliases::{Passphrase, PlainText, SymmetricKey32};
pub use config::{load as load_config, Config};
pub use content::{open, seal, SealedContent};
pub use crypto::{Crypto, CryptoProvider, KeyPair, KeyPurpose, RustCryptoProvider};
pub use error::CoreError;
pub use keyring::{Epoch, Keyring};
pub use rotation::{KeyRotationCoordinator, KeyringBackend, ProjectMember};
pub use session::{MemberCredential, SessionContext, SessionKeyCache};

pub type Result<T> = std::result::Result<T, CoreError>;
