//! Encryption/decryption of whole files using PBKDF2 + AES-256-GCM
//!
//! The binary format is described in [`crate::container`]:
//! - iv: 12 bytes (also the PBKDF2 salt)
//! - sealed: ciphertext followed by the 16-byte GCM tag
//!
//! Every call derives its own key from its own salt and touches only its own
//! buffers, so calls may run concurrently on any number of threads.

use rand::RngCore;
use rand::rngs::OsRng;
use tracing::debug;

use crate::container::{self, Frame, IV_LEN};
use crate::error::{ErrorCategory, ErrorKind, Result, ZkeError};
use crate::kdf;

/// Encrypt plaintext with a passphrase using a fresh random IV
///
/// Returns the blob: iv(12) + ciphertext(len(plaintext)) + tag(16)
pub fn encrypt(plaintext: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    let mut iv = [0u8; IV_LEN];
    OsRng.try_fill_bytes(&mut iv).map_err(|e| {
        ZkeError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Encryption,
            "random source unavailable",
            e,
        )
    })?;

    encrypt_with_iv(plaintext, passphrase, &iv)
}

/// Encrypt plaintext with a passphrase using the provided IV
///
/// This function is ONLY for known-answer tests that need deterministic output.
/// NEVER use this in production: reusing an IV under the same passphrase
/// breaks AES-GCM. Always use `encrypt()`, which generates a random IV.
pub fn encrypt_with_iv(plaintext: &[u8], passphrase: &[u8], iv: &[u8; IV_LEN]) -> Result<Vec<u8>> {
    let key = kdf::derive_encrypt_key(passphrase, iv)?;
    let sealed = key.seal(iv, plaintext)?;
    let blob = container::join(iv, &sealed);

    debug!(
        plaintext_len = plaintext.len(),
        blob_len = blob.len(),
        "encrypted payload"
    );
    Ok(blob)
}

/// Decrypt a blob with a passphrase
///
/// Blobs shorter than the minimum frame are rejected before any key is derived.
pub fn decrypt(blob: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    let frame = Frame::split(blob).inspect_err(|_| {
        debug!(blob_len = blob.len(), "blob shorter than minimum frame");
    })?;
    decrypt_parts(frame.iv(), frame.sealed(), passphrase)
}

/// Decrypt an already-split blob
///
/// `iv` is the blob's first 12 bytes and `sealed` everything after them.
/// Wrong passphrase, tampering, and truncation all produce the same error.
pub fn decrypt_parts(iv: &[u8; IV_LEN], sealed: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    let key = kdf::derive_decrypt_key(passphrase, iv)?;
    let plaintext = key.open(iv, sealed)?;

    debug!(plaintext_len = plaintext.len(), "decrypted payload");
    Ok(plaintext)
}
