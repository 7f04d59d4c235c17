// src/config/mod.rs
//! Configuration system for keyring-core
//!
//! Central, lazy-loaded config with TOML + env overrides. Session state is
//! never kept here; see [`crate::session::SessionContext`].

pub use app::{load, Config, CryptoSettings, SessionSettings, WrappingKeyMode};

mod app;
mod defaults;
