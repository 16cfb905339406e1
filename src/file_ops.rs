//! File encryption/decryption operations
//!
//! Local-filesystem stand-in for the upload/download layer: it reads a whole
//! file, runs it through [`crate::zkecrypt`], and writes the result. Blobs are
//! written verbatim, with no armoring, so they can be uploaded as-is.

use crate::error::{ErrorCategory, ErrorKind, Result, ZkeError};
use crate::marker;
use crate::passphrase::PassphraseSource;
use crate::zkecrypt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Which direction a file is being transformed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

/// Output path used when the caller does not name one.
///
/// Encryption appends the `.enc` marker; decryption strips it. Decrypting a
/// file whose name lacks the marker requires an explicit output path.
pub fn default_output(op: Operation, input: &Path) -> Result<PathBuf> {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            ZkeError::with_kind(
                ErrorCategory::User,
                ErrorKind::Io,
                format!("{} has no usable file name", input.display()),
            )
        })?;

    let output_name = match op {
        Operation::Encrypt => marker::mark(name),
        Operation::Decrypt => marker::unmark(name)
            .ok_or_else(|| {
                ZkeError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::MarkerMissing,
                    format!(
                        "{} does not end in .{}; pass an explicit output path",
                        input.display(),
                        marker::EXTENSION
                    ),
                )
            })?
            .to_owned(),
    };

    Ok(input.with_file_name(output_name))
}

/// Encrypt a file with a passphrase
///
/// Reads plaintext from `input_path`, encrypts it using a passphrase from
/// `passphrase_source`, and writes the blob to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_source: &mut dyn PassphraseSource,
) -> Result<()> {
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let passphrase = passphrase_source.read_passphrase()?;
    let blob = zkecrypt::encrypt(&plaintext, &passphrase)
        .map_err(|e| e.with_context("could not encrypt file"))?;
    drop(passphrase);

    write_file_atomic(output_path, &blob)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        bytes = blob.len(),
        "encrypted file"
    );
    Ok(())
}

/// Decrypt a file with a passphrase
///
/// Reads a blob from `input_path`, decrypts it using a passphrase from
/// `passphrase_source`, and writes the plaintext to `output_path`. Nothing is
/// written unless decryption succeeds in full.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_source: &mut dyn PassphraseSource,
) -> Result<()> {
    let blob = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let passphrase = passphrase_source.read_passphrase()?;
    let plaintext = zkecrypt::decrypt(&blob, &passphrase)
        .map_err(|e| e.with_context(format!("failed to decrypt {}", input_path.display())))?;
    drop(passphrase);

    write_file_atomic(output_path, &plaintext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        bytes = plaintext.len(),
        "decrypted file"
    );
    Ok(())
}

/// Write a file atomically (tempfile + fsync + rename) with owner-only permissions
///
/// Either the previous file or the complete new one exists afterwards, never
/// a partial write.
fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        ZkeError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to create tempfile in {}", dir.display()),
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| io_error("failed to set tempfile permissions", e))?;
    }

    temp_file
        .write_all(contents)
        .map_err(|e| io_error("failed to write to tempfile", e))?;
    // Flush and fsync() such that the rename, if it succeeds, always points
    // to a complete file.
    temp_file
        .flush()
        .map_err(|e| io_error("failed to flush tempfile", e))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| io_error("failed to sync file prior to rename", e))?;

    temp_file.persist(path).map_err(|e| {
        ZkeError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn io_error(msg: &str, err: io::Error) -> ZkeError {
    ZkeError::with_kind_and_source(ErrorCategory::Internal, ErrorKind::Io, msg, err)
}

fn read_error(path: &Path, err: io::Error) -> ZkeError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    ZkeError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
