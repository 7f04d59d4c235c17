// src/crypto/provider.rs
//! Platform cryptography as an injected capability
//!
//! Everything above this module works on text-encoded keys and envelopes and
//! only reaches raw algorithms through [`CryptoProvider`]. The default
//! [`RustCryptoProvider`] is a pure-Rust software implementation; tests wrap
//! it to observe which operations a higher-level routine performs.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit};
use rand::RngCore;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::pss::{BlindedSigningKey, Signature, VerifyingKey};
use rsa::rand_core::OsRng;
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::aliases::SymmetricKey32;
use crate::config::CryptoSettings;
use crate::consts::{NONCE_LEN, PSS_SALT_LEN, SYMMETRIC_KEY_LEN};
use crate::error::CoreError;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Purpose of an asymmetric keypair; encryption and signing keys are never interchangeable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPurpose {
    /// RSA-OAEP with SHA-256
    Encryption,
    /// RSA-PSS with SHA-256, salt length = hash length
    Signing,
}

/// DER-encoded keypair straight out of the provider
pub struct RawKeyPair {
    /// SubjectPublicKeyInfo
    pub public_der: Vec<u8>,
    /// PKCS#8 PrivateKeyInfo
    pub private_der: Zeroizing<Vec<u8>>,
}

pub trait CryptoProvider {
    /// Fill `buf` from a cryptographically secure RNG
    fn fill_random(&self, buf: &mut [u8]);

    fn generate_key_pair(&self, purpose: KeyPurpose) -> Result<RawKeyPair>;

    fn rsa_oaep_encrypt(&self, public_der: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>;

    fn rsa_oaep_decrypt(&self, private_der: &[u8], ciphertext: &[u8])
        -> Result<Zeroizing<Vec<u8>>>;

    fn aead_encrypt(
        &self,
        key: &SymmetricKey32,
        nonce: &[u8; NONCE_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>>;

    fn aead_decrypt(
        &self,
        key: &SymmetricKey32,
        nonce: &[u8; NONCE_LEN],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>>;

    /// PBKDF2-HMAC-SHA256 → 256-bit key
    fn derive_key(&self, passphrase: &[u8], salt: &[u8]) -> SymmetricKey32;

    fn pss_sign(&self, private_der: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    /// `Ok(false)` on a genuine mismatch, `Err` only for undecodable keys
    fn pss_verify(&self, public_der: &[u8], signature: &[u8], data: &[u8]) -> Result<bool>;
}

/// Pure-Rust provider: `rsa`, `aes-gcm` and `pbkdf2`
#[derive(Debug, Clone)]
pub struct RustCryptoProvider {
    modulus_bits: usize,
    kdf_iterations: u32,
}

impl Default for RustCryptoProvider {
    fn default() -> Self {
        Self::new(&CryptoSettings::default())
    }
}

impl RustCryptoProvider {
    pub fn new(settings: &CryptoSettings) -> Self {
        Self {
            modulus_bits: settings.rsa_modulus_bits,
            kdf_iterations: settings.kdf_iterations,
        }
    }

    pub fn modulus_bits(&self) -> usize {
        self.modulus_bits
    }

    pub fn kdf_iterations(&self) -> u32 {
        self.kdf_iterations
    }
}

fn decode_public(der: &[u8]) -> Result<RsaPublicKey> {
    RsaPublicKey::from_public_key_der(der).map_err(|e| CoreError::KeyFormat(e.to_string()))
}

fn decode_private(der: &[u8]) -> Result<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_der(der).map_err(|e| CoreError::KeyFormat(e.to_string()))
}

impl CryptoProvider for RustCryptoProvider {
    fn fill_random(&self, buf: &mut [u8]) {
        rand::rng().fill_bytes(buf);
    }

    fn generate_key_pair(&self, purpose: KeyPurpose) -> Result<RawKeyPair> {
        tracing::debug!(?purpose, bits = self.modulus_bits, "generating RSA keypair");
        let private = RsaPrivateKey::new(&mut OsRng, self.modulus_bits)
            .map_err(|e| CoreError::KeyGeneration(e.to_string()))?;
        let public_der = private
            .to_public_key()
            .to_public_key_der()
            .map_err(|e| CoreError::KeyGeneration(e.to_string()))?
            .as_bytes()
            .to_vec();
        let private_der = Zeroizing::new(
            private
                .to_pkcs8_der()
                .map_err(|e| CoreError::KeyGeneration(e.to_string()))?
                .as_bytes()
                .to_vec(),
        );
        Ok(RawKeyPair {
            public_der,
            private_der,
        })
    }

    fn rsa_oaep_encrypt(&self, public_der: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        let public = decode_public(public_der)?;
        public
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
            .map_err(|e| CoreError::Encryption(e.to_string()))
    }

    fn rsa_oaep_decrypt(
        &self,
        private_der: &[u8],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        let private = decode_private(private_der)?;
        private
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| CoreError::Decryption)
    }

    fn aead_encrypt(
        &self,
        key: &SymmetricKey32,
        nonce: &[u8; NONCE_LEN],
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(key.expose_secret())
            .map_err(|e| CoreError::Encryption(e.to_string()))?;
        let nonce_array = (*nonce).into();
        cipher
            .encrypt(&nonce_array, plaintext)
            .map_err(|e| CoreError::Encryption(e.to_string()))
    }

    fn aead_decrypt(
        &self,
        key: &SymmetricKey32,
        nonce: &[u8; NONCE_LEN],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        let cipher =
            Aes256Gcm::new_from_slice(key.expose_secret()).map_err(|_| CoreError::Decryption)?;
        let nonce_array = (*nonce).into();
        cipher
            .decrypt(&nonce_array, ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| CoreError::Decryption)
    }

    fn derive_key(&self, passphrase: &[u8], salt: &[u8]) -> SymmetricKey32 {
        let mut out = [0u8; SYMMETRIC_KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, salt, self.kdf_iterations, &mut out);
        let key = SymmetricKey32::new(out);
        out.zeroize();
        key
    }

    fn pss_sign(&self, private_der: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let signing_key =
            BlindedSigningKey::<Sha256>::new_with_salt_len(decode_private(private_der)?, PSS_SALT_LEN);
        let signature = signing_key
            .try_sign_with_rng(&mut OsRng, data)
            .map_err(|e| CoreError::SignatureVerification(e.to_string()))?;
        Ok(signature.to_vec())
    }

    fn pss_verify(&self, public_der: &[u8], signature: &[u8], data: &[u8]) -> Result<bool> {
        let public = RsaPublicKey::from_public_key_der(public_der)
            .map_err(|e| CoreError::SignatureVerification(e.to_string()))?;
        let verifying_key = VerifyingKey::<Sha256>::new_with_salt_len(public, PSS_SALT_LEN);
        let signature = Signature::try_from(signature)
            .map_err(|e| CoreError::SignatureVerification(e.to_string()))?;
        Ok(verifying_key.verify(data, &signature).is_ok())
    }
}
