// src/rotation/backend.rs
//! The persistence boundary, specified only at its interface
//!
//! Transport, authentication and timeouts live behind this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keyring::{Epoch, MemberKeyringBundle};

/// A project member as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    /// Base64 SPKI RSA-OAEP key; absent if the member never registered one
    #[serde(default)]
    pub public_key: Option<String>,
}

/// One member's wrapped copy of a new epoch's secrets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberKeyUpdate {
    pub user_id: String,
    pub encrypted_passphrase: String,
    pub encrypted_signing_key: String,
    /// Same for every member of the epoch; not secret
    pub signing_public_key: String,
}

/// The atomic submission `{new_epoch, updates}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationBatch {
    pub new_epoch: Epoch,
    pub updates: Vec<MemberKeyUpdate>,
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Backend operations consumed by this crate
#[async_trait]
pub trait KeyringBackend: Send + Sync {
    /// Current members of a project, each with an optional public encryption key
    async fn fetch_members(&self, project_id: &str) -> Result<Vec<ProjectMember>, BackendError>;

    /// Persist a whole rotation or nothing
    async fn submit_rotation(
        &self,
        project_id: &str,
        batch: &RotationBatch,
    ) -> Result<(), BackendError>;

    /// The calling member's own wrapped private key and keyrings
    async fn fetch_member_keyrings(
        &self,
        project_id: &str,
    ) -> Result<MemberKeyringBundle, BackendError>;
}
