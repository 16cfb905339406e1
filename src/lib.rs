//! zkeshare - client-side zero-knowledge file encryption
//!
//! Files are encrypted before upload with a key derived from a passphrase the
//! server never sees (PBKDF2-HMAC-SHA256, 100,000 iterations) and sealed with
//! AES-256-GCM. The resulting blob is `iv(12) || ciphertext || tag(16)`.
//!
//! The entry points are [`encrypt`] and [`decrypt`].

#![forbid(unsafe_code)]

pub mod container;
pub mod error;
pub mod file_ops;
pub mod kdf;
pub mod marker;
pub mod passphrase;
pub mod zkecrypt;

pub use error::{ErrorCategory, ErrorKind, Result, ZkeError};
pub use zkecrypt::{decrypt, encrypt};
