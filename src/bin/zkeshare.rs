//! zkeshare CLI - zero-knowledge file encryption
//!
//! Encrypts files before they are shared and decrypts them after download,
//! using PBKDF2-HMAC-SHA256 key derivation and AES-256-GCM.

use clap::{Parser, Subcommand};
use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::process;

use zkeshare::ZkeError;
use zkeshare::file_ops::{self, Operation};
use zkeshare::passphrase::{PassphraseSource, StreamPassphrase, TerminalPassphrase};

#[derive(Parser)]
#[command(name = "zkeshare")]
#[command(version)]
#[command(about = "Zero-knowledge file encryption for sharing.", long_about = None)]
struct Cli {
    /// Read passphrase from stdin instead of from terminal
    #[arg(long, global = true, env = "ZKESHARE_PASSPHRASE_STDIN")]
    passphrase_stdin: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to write the encrypted blob to [default: input with .enc appended]
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Decrypt a file
    #[command(alias = "d")]
    Decrypt {
        /// Path to the encrypted blob
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to write the plaintext to [default: input with .enc removed]
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zkeshare=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encrypt { input, output } => run(
            Operation::Encrypt,
            &input,
            output,
            cli.passphrase_stdin,
        ),
        Commands::Decrypt { input, output } => run(
            Operation::Decrypt,
            &input,
            output,
            cli.passphrase_stdin,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", render_chain(&e));
        process::exit(1);
    }
}

fn run(
    op: Operation,
    input: &Path,
    output: Option<PathBuf>,
    passphrase_stdin: bool,
) -> Result<(), ZkeError> {
    let output = match output {
        Some(path) => path,
        None => file_ops::default_output(op, input)?,
    };
    let mut source = passphrase_source(passphrase_stdin);
    match op {
        Operation::Encrypt => file_ops::encrypt_file(input, &output, &mut *source),
        Operation::Decrypt => file_ops::decrypt_file(input, &output, &mut *source),
    }
}

fn passphrase_source(use_stdin: bool) -> Box<dyn PassphraseSource> {
    if use_stdin {
        Box::new(StreamPassphrase::new(std::io::stdin()))
    } else {
        Box::new(TerminalPassphrase)
    }
}

/// Joins an error and its sources as "outer: inner: innermost".
fn render_chain(err: &ZkeError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        rendered.push_str(": ");
        rendered.push_str(&inner.to_string());
        source = inner.source();
    }
    rendered
}
