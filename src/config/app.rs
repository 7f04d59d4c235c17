// src/config/app.rs
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

use super::defaults::{default_crypto, default_session};
use crate::consts::{DEFAULT_CONFIG_FILE, MIN_KDF_ITERATIONS, MIN_RSA_MODULUS_BITS};
use crate::error::CoreError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crypto: CryptoSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CryptoSettings {
    pub rsa_modulus_bits: usize,
    pub kdf_iterations: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub wrapping_key: WrappingKeyMode,
    pub slot_prefix: String,
}

/// Where the session cache's wrapping key comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrappingKeyMode {
    /// Random per session context, never leaves memory
    Ephemeral,
    /// Compile-time constant; obfuscation only, readable by any code in the same context
    Fixed,
}

impl Default for CryptoSettings {
    fn default() -> Self {
        default_crypto()
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        default_session()
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, CoreError> {
        let config: Config =
            toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.crypto.kdf_iterations < MIN_KDF_ITERATIONS {
            return Err(CoreError::Config(format!(
                "kdf_iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
                self.crypto.kdf_iterations
            )));
        }
        if self.crypto.rsa_modulus_bits < MIN_RSA_MODULUS_BITS {
            return Err(CoreError::Config(format!(
                "rsa_modulus_bits must be at least {MIN_RSA_MODULUS_BITS}, got {}",
                self.crypto.rsa_modulus_bits
            )));
        }
        if self.session.slot_prefix.is_empty() {
            return Err(CoreError::Config("slot_prefix must not be empty".into()));
        }
        Ok(())
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load config once: `$KEYRING_CORE_CONFIG`, else `keyring-config.toml`, else defaults
pub fn load() -> &'static Config {
    CONFIG.get_or_init(|| {
        let config_path = std::env::var("KEYRING_CORE_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        if !Path::new(&config_path).exists() {
            tracing::debug!(path = %config_path, "no config file, using built-in defaults");
            return Config::default();
        }

        match Config::from_path(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path, error = %err, "invalid config, using built-in defaults");
                Config::default()
            }
        }
    })
}
