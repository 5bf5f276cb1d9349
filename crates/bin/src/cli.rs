//! CLI argument definitions for the keysync binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Where the served values live
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Storage {
    /// One file per key in the data directory (default)
    File,
    /// Process memory; everything is lost on shutdown
    Memory,
}

/// Encrypted credential storage and sync
#[derive(Parser, Debug)]
#[command(name = "keysync")]
#[command(about = "keysync: encrypted credential storage with last-write-wins sync")]
#[command(version)]
pub struct Cli {
    /// Emit machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a key/value server that remote clients sync against
    Serve(ServeArgs),
    /// Pull, commit and push one collection
    Sync(SyncArgs),
    /// Decrypt a local collection and print its records
    List(ListArgs),
    /// Check health of a running keysync server
    Health(HealthArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "KEYSYNC_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "KEYSYNC_HOST")]
    pub host: String,

    /// Storage for served values
    #[arg(short, long, default_value = "file", env = "KEYSYNC_STORAGE")]
    pub storage: Storage,

    /// Data directory for stored blobs
    #[arg(short = 'D', long, env = "KEYSYNC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Local collection selection and unlock, shared by sync and list
#[derive(clap::Args, Debug)]
pub struct LocalArgs {
    /// Collection name
    #[arg(short, long, default_value = "default", env = "KEYSYNC_COLLECTION")]
    pub collection: String,

    /// Data directory of the local copy
    #[arg(short = 'D', long, env = "KEYSYNC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Password that encrypts the collection
    #[arg(long, env = "KEYSYNC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for the sync command
#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub local: LocalArgs,

    /// Base URL of the remote server
    #[arg(short, long, env = "KEYSYNC_REMOTE")]
    pub remote: String,

    /// Per-request timeout in seconds
    #[arg(short, long, default_value_t = 30)]
    pub timeout: u64,
}

/// Arguments for the list command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub local: LocalArgs,

    /// Include removed records
    #[arg(short, long)]
    pub all: bool,

    /// Print field values that are masked by default
    #[arg(long)]
    pub reveal: bool,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// URL of the server to check
    #[arg(default_value = "http://127.0.0.1:3000", env = "KEYSYNC_REMOTE")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}
