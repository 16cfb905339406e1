//! Passphrase sources for the command-line collaborator
//!
//! A passphrase is the UTF-8 text the user typed, as bytes. Sources hand
//! back raw input; [`PassphraseSource::read_passphrase`] turns it into a
//! passphrase by dropping the line terminator that typing or `echo` adds,
//! and refuses input that is blank. Nothing is cached: each call reads again
//! and the returned buffer is wiped on drop.

use crate::error::{ErrorCategory, ErrorKind, Result, ZkeError};
use std::io::{self, IsTerminal, Read, Write};
use zeroize::Zeroizing;

/// Somewhere a passphrase can be obtained from.
pub trait PassphraseSource {
    /// Raw bytes as supplied, line terminator included.
    fn read_raw(&mut self) -> Result<Zeroizing<Vec<u8>>>;

    /// Read and normalize a passphrase.
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut passphrase = self.read_raw()?;
        strip_line_ending(&mut passphrase);
        if is_blank(&passphrase) {
            return Err(ZkeError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "passphrase must not be blank",
            ));
        }
        Ok(passphrase)
    }
}

/// Drop exactly one trailing `\n` or `\r\n`.
fn strip_line_ending(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
}

/// Empty or whitespace-only text. Bytes that are not UTF-8 are never blank.
fn is_blank(buf: &[u8]) -> bool {
    std::str::from_utf8(buf).is_ok_and(|s| s.trim().is_empty())
}

/// A passphrase fixed up front, e.g. supplied by an embedding program or a test.
pub struct FixedPassphrase(Zeroizing<Vec<u8>>);

impl FixedPassphrase {
    pub fn new(passphrase: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(passphrase.into()))
    }
}

impl PassphraseSource for FixedPassphrase {
    fn read_raw(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(self.0.clone())
    }
}

/// Everything a stream yields up to EOF, typically piped stdin.
pub struct StreamPassphrase<R> {
    stream: R,
}

impl<R: Read> StreamPassphrase<R> {
    pub fn new(stream: R) -> Self {
        Self { stream }
    }
}

impl<R: Read> PassphraseSource for StreamPassphrase<R> {
    fn read_raw(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut data = Zeroizing::new(Vec::new());
        self.stream.read_to_end(&mut data).map_err(|e| {
            ZkeError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PassphraseUnavailable,
                "could not read passphrase from input stream",
                e,
            )
        })?;
        Ok(data)
    }
}

/// Interactive no-echo prompt on the controlling terminal.
pub struct TerminalPassphrase;

impl PassphraseSource for TerminalPassphrase {
    fn read_raw(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if !io::stdin().is_terminal() {
            return Err(ZkeError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "stdin is not a terminal; use --passphrase-stdin to pipe a passphrase",
            ));
        }

        let mut stderr = io::stderr().lock();
        stderr
            .write_all(b"Passphrase (zkeshare): ")
            .and_then(|_| stderr.flush())
            .map_err(|e| {
                ZkeError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to write passphrase prompt",
                    e,
                )
            })?;
        drop(stderr);

        let typed = rpassword::read_password().map_err(|e| {
            ZkeError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::PassphraseUnavailable,
                "could not read passphrase from terminal",
                e,
            )
        })?;
        Ok(Zeroizing::new(typed.into_bytes()))
    }
}
