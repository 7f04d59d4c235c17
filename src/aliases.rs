// src/aliases.rs
//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical secret containers used throughout keyring-core.

pub use secure_gate::{dynamic_alias, fixed_alias};

// Fixed-size secrets
fixed_alias!(SymmetricKey32, 32); // AES-256-GCM key (ephemeral or PBKDF2-derived)

// Dynamic secrets
dynamic_alias!(Passphrase, String); // session wrapping secret
dynamic_alias!(PlainText, Vec<u8>); // decrypted envelope payload
