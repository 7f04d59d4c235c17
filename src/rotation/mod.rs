// src/rotation/mod.rs
//! Key rotation on membership change
//!
//! The coordinator mints a new epoch and distributes it to every remaining
//! member in one atomic batch. Removed members get nothing for the new epoch,
//! so content written from then on is out of their reach.
mod backend;
mod coordinator;

pub use backend::{BackendError, KeyringBackend, MemberKeyUpdate, ProjectMember, RotationBatch};
pub use coordinator::KeyRotationCoordinator;
