//! Cachekeep CLI - poke at a cache directory from the terminal
//!
//! Usage:
//!   cachekeep put <name> [--file F] [--encrypt]     - Store text (stdin by default)
//!   cachekeep get <name> [--decrypt]                - Print text
//!   cachekeep put-json / get-json <name>            - Structured records
//!   cachekeep put-image / get-image <name> <file>   - Images
//!   cachekeep put-bin / get-bin <name>              - Raw bytes
//!   cachekeep rm <name> | exists <name>             - Management

mod commands;

use std::path::PathBuf;

use anyhow::Context;
use cachekeep_store::ImageFormat;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable consulted when `--passphrase` is not given
const PASSPHRASE_ENV: &str = "CACHEKEEP_PASSPHRASE";

#[derive(Parser)]
#[command(name = "cachekeep")]
#[command(author = "HeyBattle1")]
#[command(version)]
#[command(about = "Typed local cache store with optional encryption", long_about = None)]
struct Cli {
    /// Cache directory (default: the platform cache dir + /cachekeep)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Write through a temp file and rename
    #[arg(long, global = true)]
    atomic: bool,

    /// Passphrase for encrypted entries (falls back to $CACHEKEEP_PASSPHRASE)
    #[arg(long, global = true)]
    passphrase: Option<String>,

    /// Log every cache operation to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store text read from a file or stdin
    Put {
        name: String,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        encrypt: bool,
    },

    /// Print a text entry
    Get {
        name: String,
        #[arg(long)]
        decrypt: bool,
    },

    /// Store a JSON record read from a file or stdin
    PutJson {
        name: String,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        encrypt: bool,
    },

    /// Pretty-print a JSON record
    GetJson {
        name: String,
        #[arg(long)]
        decrypt: bool,
    },

    /// Store an image file
    PutImage {
        name: String,
        file: PathBuf,
        /// png, jpeg or bmp (default: from the file extension)
        #[arg(long)]
        format: Option<ImageFormat>,
        /// 0-100, lossy formats only
        #[arg(long)]
        quality: Option<u8>,
    },

    /// Export an image entry to a file
    GetImage {
        name: String,
        out: PathBuf,
        /// png, jpeg or bmp (default: from the output extension)
        #[arg(long)]
        format: Option<ImageFormat>,
    },

    /// Store a file's raw bytes
    PutBin { name: String, file: PathBuf },

    /// Write raw bytes to a file, or stdout
    GetBin {
        name: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Delete an entry (succeeds if already absent)
    Rm { name: String },

    /// Exit 0 if the entry exists, 1 otherwise
    Exists { name: String },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let root = commands::resolve_root(cli.root.clone())?;
    std::fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create cache directory {}", root.display()))?;
    tracing::debug!(root = %root.display(), atomic = cli.atomic, "using cache root");

    let store = commands::open_store(root, cli.atomic);
    let passphrase =
        commands::resolve_passphrase(cli.passphrase.clone(), std::env::var(PASSPHRASE_ENV).ok());

    let found = commands::run(&store, cli.command, passphrase.as_ref())?;
    if !found {
        std::process::exit(1);
    }
    Ok(())
}
