//! Container format for encrypted blobs
//!
//! A blob is self-describing: everything needed to decrypt it, apart from the
//! passphrase, travels inside it. The layout is:
//!
//! ```text
//! offset 0       : 12 bytes  IV (also the PBKDF2 salt)
//! offset 12      : N bytes   AES-GCM ciphertext
//! offset 12+N    : 16 bytes  AES-GCM authentication tag
//! total length   : 12 + N + 16
//! ```
//!
//! There is no magic number, version field, or length prefix. The tag is
//! produced by the AEAD primitive as part of its output, so this module only
//! deals with the IV prefix and treats the rest as one opaque sealed region.

use crate::error::{Result, ZkeError};

/// Length of the IV in bytes. The same bytes serve as the PBKDF2 salt.
pub const IV_LEN: usize = 12;

/// Length of the AES-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Smallest structurally valid blob: an IV and a tag around empty ciphertext.
pub const MIN_BLOB_LEN: usize = IV_LEN + TAG_LEN;

/// Borrowed view of a blob split into its IV and its sealed region
/// (ciphertext followed by the tag).
///
/// Only [`Frame::split`] builds one, so `sealed` always holds at least a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    iv: &'a [u8; IV_LEN],
    sealed: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Split a blob without copying.
    ///
    /// Blobs shorter than [`MIN_BLOB_LEN`] are rejected here, before any key
    /// derivation or decryption is attempted.
    pub fn split(blob: &'a [u8]) -> Result<Self> {
        if blob.len() < MIN_BLOB_LEN {
            return Err(ZkeError::decryption());
        }
        let (iv, sealed) = blob.split_at(IV_LEN);
        let iv: &[u8; IV_LEN] = iv.try_into().map_err(|_| ZkeError::decryption())?;
        Ok(Self { iv, sealed })
    }

    /// The 12-byte IV, which is also the PBKDF2 salt.
    pub fn iv(&self) -> &'a [u8; IV_LEN] {
        self.iv
    }

    /// Ciphertext followed by the tag.
    pub fn sealed(&self) -> &'a [u8] {
        self.sealed
    }

    /// Length of the plaintext this frame should decrypt to.
    pub fn plaintext_len(&self) -> usize {
        self.sealed.len().saturating_sub(TAG_LEN)
    }
}

/// Concatenate an IV and a sealed region into a blob.
pub fn join(iv: &[u8; IV_LEN], sealed: &[u8]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(IV_LEN + sealed.len());
    blob.extend_from_slice(iv);
    blob.extend_from_slice(sealed);
    blob
}

/// Size of the blob produced for a plaintext of `plaintext_len` bytes.
pub const fn blob_len(plaintext_len: usize) -> usize {
    plaintext_len + MIN_BLOB_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_min_blob_len() {
        assert_eq!(MIN_BLOB_LEN, 28);
        assert_eq!(blob_len(0), 28);
        assert_eq!(blob_len(5), 33);
    }

    #[test]
    fn test_split_minimum_frame() {
        let mut blob = vec![0x11u8; IV_LEN];
        blob.extend_from_slice(&[0x22u8; TAG_LEN]);

        let frame = Frame::split(&blob).unwrap();
        assert_eq!(frame.iv(), &[0x11u8; IV_LEN]);
        assert_eq!(frame.sealed(), &[0x22u8; TAG_LEN][..]);
        assert_eq!(frame.plaintext_len(), 0);
    }

    #[test]
    fn test_split_keeps_everything_after_iv() {
        let blob: Vec<u8> = (0..40).collect();
        let frame = Frame::split(&blob).unwrap();

        assert_eq!(frame.iv()[..], blob[..IV_LEN]);
        assert_eq!(frame.sealed(), &blob[IV_LEN..]);
        assert_eq!(frame.plaintext_len(), 40 - MIN_BLOB_LEN);
    }

    #[test]
    fn test_split_rejects_short_blobs() {
        for len in [0, 1, IV_LEN, IV_LEN + TAG_LEN - 1] {
            let blob = vec![0u8; len];
            let err = Frame::split(&blob).expect_err("short blob must be rejected");
            assert_eq!(err.kind, Some(ErrorKind::Decryption), "len {}", len);
        }
    }

    #[test]
    fn test_join_then_split() {
        let iv = [7u8; IV_LEN];
        let sealed = b"ciphertext-and-a-16-byte-tag....";
        let blob = join(&iv, sealed);

        assert_eq!(blob.len(), IV_LEN + sealed.len());
        let frame = Frame::split(&blob).unwrap();
        assert_eq!(frame.iv(), &iv);
        assert_eq!(frame.sealed(), &sealed[..]);
    }

    #[test]
    fn test_plaintext_len_never_underflows() {
        let iv = [0u8; IV_LEN];
        let frame = Frame {
            iv: &iv,
            sealed: &[],
        };
        assert_eq!(frame.plaintext_len(), 0);
    }
}
