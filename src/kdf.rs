//! Passphrase key derivation: PBKDF2-HMAC-SHA256 → AES-256-GCM key
//!
//! The salt is the blob's 12-byte IV. Reusing the IV as the salt is
//! non-standard: most constructions carry a separate random salt. It keeps
//! the container at a single random value, and both roles only require a
//! fresh, never-repeated random value per encryption, which the IV already
//! is. Readers auditing this format should be aware of the double use.
//!
//! Each derivation yields a key that can work in one direction only:
//! [`EncryptKey`] can seal and [`DecryptKey`] can open.

use aes_gcm::Aes256Gcm;
use aes_gcm::aead::{Aead, KeyInit};
use hmac::Hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::container::IV_LEN;
use crate::error::{ErrorCategory, ErrorKind, Result, ZkeError};

/// Length of the derived AES-256 key in bytes
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Raw 256-bit key material. Zeroized on drop.
struct KeyBytes(Zeroizing<[u8; KEY_LEN]>);

impl KeyBytes {
    /// Run PBKDF2-HMAC-SHA256 over the passphrase and salt.
    fn derive(passphrase: &[u8], salt: &[u8; IV_LEN]) -> Result<Self> {
        if passphrase.is_empty() {
            return Err(ZkeError::with_kind(
                ErrorCategory::User,
                ErrorKind::KeyDerivation,
                "passphrase must not be empty",
            ));
        }

        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        pbkdf2::pbkdf2::<Hmac<Sha256>>(passphrase, salt, PBKDF2_ITERATIONS, &mut key[..])
            .map_err(|e| {
                ZkeError::with_kind(
                    ErrorCategory::Internal,
                    ErrorKind::KeyDerivation,
                    format!("PBKDF2 rejected derivation parameters: {}", e),
                )
            })?;

        Ok(Self(key))
    }

    /// AES-256-GCM keyed with these bytes. `None` only if the length is wrong,
    /// which the array type already rules out.
    fn cipher(&self) -> Option<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.0[..]).ok()
    }
}

impl std::fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Derive a key that can only encrypt.
pub fn derive_encrypt_key(passphrase: &[u8], salt: &[u8; IV_LEN]) -> Result<EncryptKey> {
    KeyBytes::derive(passphrase, salt).map(EncryptKey)
}

/// Derive a key that can only decrypt.
pub fn derive_decrypt_key(passphrase: &[u8], salt: &[u8; IV_LEN]) -> Result<DecryptKey> {
    KeyBytes::derive(passphrase, salt).map(DecryptKey)
}

/// Encrypt-only AES-256-GCM key.
#[derive(Debug)]
pub struct EncryptKey(KeyBytes);

impl EncryptKey {
    /// AES-GCM encrypt `plaintext` under `iv`, returning ciphertext followed by the tag.
    pub fn seal(&self, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = self.0.cipher().ok_or_else(|| {
            ZkeError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::Encryption,
                "AES-GCM rejected the derived key",
            )
        })?;
        cipher
            .encrypt(aes_gcm::Nonce::from_slice(iv), plaintext)
            .map_err(|_| {
                ZkeError::with_kind(
                    ErrorCategory::Internal,
                    ErrorKind::Encryption,
                    "could not encrypt file",
                )
            })
    }
}

/// Decrypt-only AES-256-GCM key.
#[derive(Debug)]
pub struct DecryptKey(KeyBytes);

impl DecryptKey {
    /// AES-GCM decrypt `sealed` (ciphertext followed by the tag) under `iv`.
    ///
    /// Tag verification is part of the primitive; on mismatch nothing is
    /// returned. The error never says why opening failed.
    pub fn open(&self, iv: &[u8; IV_LEN], sealed: &[u8]) -> Result<Vec<u8>> {
        let cipher = self.0.cipher().ok_or_else(ZkeError::decryption)?;
        cipher
            .decrypt(aes_gcm::Nonce::from_slice(iv), sealed)
            .map_err(|_| ZkeError::decryption())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl EncryptKey {
        fn as_bytes(&self) -> &[u8; KEY_LEN] {
            &(self.0).0
        }
    }

    impl DecryptKey {
        fn as_bytes(&self) -> &[u8; KEY_LEN] {
            &(self.0).0
        }
    }

    fn salt() -> [u8; IV_LEN] {
        let mut salt = [0u8; IV_LEN];
        for (i, b) in salt.iter_mut().enumerate() {
            *b = i as u8;
        }
        salt
    }

    #[test]
    fn test_known_pbkdf2_output() {
        let key = derive_encrypt_key(b"correct-horse", &salt()).unwrap();

        #[rustfmt::skip]
        let expected: [u8; KEY_LEN] = [
            0xaf, 0x67, 0x44, 0xf1, 0xf9, 0xd7, 0x5d, 0x82,
            0x32, 0xe9, 0x23, 0x6a, 0x6e, 0x00, 0x2d, 0xbf,
            0x72, 0x44, 0x45, 0xe5, 0xd4, 0xf6, 0x51, 0xc8,
            0x08, 0xcf, 0xe2, 0xb0, 0xeb, 0x39, 0x48, 0xe3,
        ];
        assert_eq!(key.as_bytes(), &expected);
    }

    #[test]
    fn test_encrypt_and_decrypt_keys_agree() {
        let enc = derive_encrypt_key(b"correct-horse", &salt()).unwrap();
        let dec = derive_decrypt_key(b"correct-horse", &salt()).unwrap();
        assert_eq!(enc.as_bytes(), dec.as_bytes(), "KDF must be deterministic");
    }

    #[test]
    fn test_different_salt_different_key() {
        let mut other = salt();
        other[0] ^= 1;
        let k1 = derive_encrypt_key(b"correct-horse", &salt()).unwrap();
        let k2 = derive_encrypt_key(b"correct-horse", &other).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_different_passphrase_different_key() {
        let k1 = derive_encrypt_key(b"correct-horse", &salt()).unwrap();
        let k2 = derive_encrypt_key(b"wrong-pass", &salt()).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        let err = derive_encrypt_key(b"", &salt()).expect_err("empty passphrase must fail");
        assert_eq!(err.kind, Some(ErrorKind::KeyDerivation));

        let err = derive_decrypt_key(b"", &salt()).expect_err("empty passphrase must fail");
        assert_eq!(err.kind, Some(ErrorKind::KeyDerivation));
    }

    #[test]
    fn test_seal_then_open() {
        let iv = salt();
        let enc = derive_encrypt_key(b"pw", &iv).unwrap();
        let dec = derive_decrypt_key(b"pw", &iv).unwrap();

        let sealed = enc.seal(&iv, b"payload").unwrap();
        assert_eq!(sealed.len(), b"payload".len() + crate::container::TAG_LEN);
        assert_eq!(dec.open(&iv, &sealed).unwrap(), b"payload");
    }

    #[test]
    fn test_open_with_wrong_iv_fails() {
        let iv = salt();
        let mut other_iv = iv;
        other_iv[11] ^= 0x80;
        let enc = derive_encrypt_key(b"pw", &iv).unwrap();
        let dec = derive_decrypt_key(b"pw", &iv).unwrap();

        let sealed = enc.seal(&iv, b"payload").unwrap();
        let err = dec.open(&other_iv, &sealed).expect_err("nonce mismatch must fail");
        assert_eq!(err.kind, Some(ErrorKind::Decryption));
    }

    #[test]
    fn test_debug_redacts_key() {
        let enc = derive_encrypt_key(b"pw", &salt()).unwrap();
        let dec = derive_decrypt_key(b"pw", &salt()).unwrap();
        let hex: String = enc.as_bytes().iter().map(|b| format!("{:02x}", b)).collect();

        for rendered in [format!("{:?}", enc), format!("{:?}", dec)] {
            assert!(rendered.contains("[REDACTED]"), "{}", rendered);
            assert!(!rendered.contains(&hex[..8]), "{}", rendered);
        }
        assert_eq!(format!("{:?}", enc), "EncryptKey([REDACTED])");
    }
}
