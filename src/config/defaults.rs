// src/config/defaults.rs
use crate::config::app::{CryptoSettings, SessionSettings, WrappingKeyMode};
use crate::consts::{DEFAULT_SLOT_PREFIX, MIN_KDF_ITERATIONS, RSA_MODULUS_BITS};

pub fn default_crypto() -> CryptoSettings {
    CryptoSettings {
        rsa_modulus_bits: RSA_MODULUS_BITS,
        kdf_iterations: MIN_KDF_ITERATIONS,
    }
}

pub fn default_session() -> SessionSettings {
    SessionSettings {
        wrapping_key: WrappingKeyMode::Ephemeral,
        slot_prefix: DEFAULT_SLOT_PREFIX.into(),
    }
}
