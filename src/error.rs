// src/error.rs
//! Public error type for the entire crate

use thiserror::Error;

use crate::crypto::KeyPurpose;
use crate::keyring::Epoch;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Key material that cannot be decoded (bad base64, SPKI or PKCS#8)
    #[error("Key format error: {0}")]
    KeyFormat(String),

    /// A keypair handed to an operation of the other purpose
    #[error("Expected a {expected:?} key, got a {actual:?} key")]
    WrongKeyPurpose {
        expected: KeyPurpose,
        actual: KeyPurpose,
    },

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Payload the asymmetric or symmetric cipher refuses to encrypt
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Tag mismatch, wrong key or malformed envelope; callers cannot tell them apart
    #[error("Decryption failed")]
    Decryption,

    /// Malformed signature or key encoding; a genuine mismatch is `Ok(false)`
    #[error("Signature verification error: {0}")]
    SignatureVerification(String),

    #[error("Rotation would leave the project without members")]
    NoRemainingMembers,

    #[error("Member {0} has no public encryption key")]
    MissingMemberKey(String),

    #[error("Backend rejected key rotation: {0}")]
    RotationSubmission(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("No keyring held for epoch {0}")]
    UnknownEpoch(Epoch),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
