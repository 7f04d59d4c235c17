// tests/common.rs
//! Shared test utilities: logging setup

#![allow(dead_code)] // not every test binary logs

#[cfg(feature = "logging")]
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(feature = "logging")]
fn init(filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(filter)
        .try_init()
        .ok(); // first caller wins
}

/// Log per `RUST_LOG`; no-op without the `logging` feature
pub fn setup() {
    #[cfg(feature = "logging")]
    init(EnvFilter::from_default_env());
}

/// Rotation and cache events even when `RUST_LOG` is unset
pub fn setup_info() {
    #[cfg(feature = "logging")]
    init(EnvFilter::new("info,keyring_core=debug"));
}
