// src/consts.rs
//! Shared constants: security parameters and wire-format literals

/// Minimum PBKDF2-HMAC-SHA256 iterations for passphrase envelopes
pub const MIN_KDF_ITERATIONS: u32 = 600_000;

/// RSA modulus size for both encryption (OAEP) and signing (PSS) keys
pub const RSA_MODULUS_BITS: usize = 4096;

/// Smallest modulus a configuration may ask for
pub const MIN_RSA_MODULUS_BITS: usize = 2048;

/// AES-256-GCM key length in bytes
pub const SYMMETRIC_KEY_LEN: usize = 32;

/// AES-GCM nonce length in bytes (96 bits)
pub const NONCE_LEN: usize = 12;

/// PBKDF2 salt length in bytes
pub const SALT_LEN: usize = 16;

/// Random bytes behind a freshly minted epoch passphrase (256 bits)
pub const EPOCH_PASSPHRASE_BYTES: usize = 32;

/// RSA-PSS salt length, equal to the SHA-256 output
pub const PSS_SALT_LEN: usize = 32;

/// Marks a hybrid envelope; anything else is a legacy direct RSA-OAEP payload
pub const HYBRID_PREFIX: &str = "HYBRID|";

/// Separator between the three base64 fields of a hybrid envelope
pub const HYBRID_DELIMITER: char = '|';

/// Separator of a flattened passphrase envelope
pub const ENVELOPE_DELIMITER: &str = "<delimiter>";

/// Fixed salt for deterministic session slot names
pub const SLOT_INDEX_SALT: [u8; SALT_LEN] = [
    0x18, 0x01, 0x6b, 0x72, 0x2d, 0x73, 0x6c, 0x6f, 0x74, 0x2d, 0x69, 0x6e, 0x64, 0x65, 0x78, 0x01,
];

/// Fixed nonce for deterministic session slot names
pub const SLOT_INDEX_NONCE: [u8; NONCE_LEN] = [
    0x18, 0x01, 0x6b, 0x72, 0x2d, 0x6e, 0x6f, 0x6e, 0x63, 0x65, 0x00, 0x01,
];

/// Passphrase of the fixed (compatibility) session wrapping key
pub const FIXED_SESSION_WRAPPING_SECRET: &str = "keyring-core/session-wrap/v1";

/// Default prefix of every session storage slot owned by the cache
pub const DEFAULT_SLOT_PREFIX: &str = "kr_project_";

/// Default config file name when `KEYRING_CORE_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "keyring-config.toml";

const fn in_base64_alphabet(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='
}

const fn has_non_base64_byte(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !in_base64_alphabet(bytes[i]) {
            return true;
        }
        i += 1;
    }
    false
}

// Format disambiguation depends on these never occurring in base64 output
const _: () = assert!(has_non_base64_byte(HYBRID_PREFIX));
const _: () = assert!(has_non_base64_byte(ENVELOPE_DELIMITER));
const _: () = assert!(!in_base64_alphabet(HYBRID_DELIMITER as u8));

/// True if `s` contains a byte outside the standard base64 alphabet
pub fn lies_outside_base64(s: &str) -> bool {
    has_non_base64_byte(s)
}
