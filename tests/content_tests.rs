// tests/content_tests.rs
use keyring_core::content::{open, seal};
use keyring_core::error::CoreError;
use keyring_core::keyring::{Epoch, Keyring};

mod support;
use support::fast_crypto;

#[test]
fn test_seal_and_open_across_epochs() {
    let crypto = fast_crypto();
    let old = Keyring::mint(&crypto, Epoch::from_millis(100)).unwrap();
    let new = Keyring::mint(&crypto, Epoch::from_millis(200)).unwrap();

    let sealed_old = seal(&crypto, &old, b"written before rotation").unwrap();
    let sealed_new = seal(&crypto, &new, b"written after rotation").unwrap();
    assert_eq!(sealed_old.epoch, Epoch::from_millis(100));

    let keyrings = vec![old, new];
    let plain = open(&crypto, &keyrings, &sealed_old).unwrap();
    assert_eq!(plain.expose_secret(), b"written before rotation");
    let plain = open(&crypto, &keyrings, &sealed_new).unwrap();
    assert_eq!(plain.expose_secret(), b"written after rotation");
}

#[test]
fn test_open_unknown_epoch() {
    let crypto = fast_crypto();
    let keyring = Keyring::mint(&crypto, Epoch::from_millis(100)).unwrap();
    let mut sealed = seal(&crypto, &keyring, b"x").unwrap();
    sealed.epoch = Epoch::from_millis(101);

    let result = open(&crypto, &[keyring], &sealed);
    assert!(matches!(result, Err(CoreError::UnknownEpoch(epoch)) if epoch.as_str() == "101"));
}

#[test]
fn test_open_rejects_swapped_ciphertext() {
    let crypto = fast_crypto();
    let keyring = Keyring::mint(&crypto, Epoch::from_millis(100)).unwrap();
    let genuine = seal(&crypto, &keyring, b"genuine").unwrap();
    let forged = seal(&crypto, &keyring, b"forged").unwrap();

    let mut spliced = genuine.clone();
    spliced.encrypted = forged.encrypted;

    let result = open(&crypto, &[keyring], &spliced);
    assert!(matches!(result, Err(CoreError::SignatureVerification(_))));
}

#[test]
fn test_sealed_content_serializes() {
    let crypto = fast_crypto();
    let keyring = Keyring::mint(&crypto, Epoch::from_millis(100)).unwrap();
    let sealed = seal(&crypto, &keyring, b"x").unwrap();

    let json = serde_json::to_value(&sealed).unwrap();
    assert_eq!(json["epoch"], "100");
    assert!(json["encrypted"].as_str().unwrap().contains("<delimiter>"));
}
