//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Snapmaker CLI - discover, pair with and monitor Snapmaker devices
#[derive(Parser, Debug)]
#[command(name = "snapmaker-cli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// HTTP request timeout in milliseconds
    #[arg(long, global = true, default_value = "5000", env = "SNAPMAKER_TIMEOUT")]
    pub timeout: u64,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding paired devices (defaults to the platform data dir)
    #[arg(long, global = true, env = "SNAPMAKER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover devices on the local network
    Discover,

    /// Poll a device once and print its telemetry
    Status(HostArgs),

    /// Poll a device periodically
    Watch(WatchArgs),

    /// Authorize this machine on a device (accept on the touchscreen)
    Pair(HostArgs),

    /// Remove a paired device and its token
    Forget(HostArgs),

    /// List paired devices
    List,
}

#[derive(Args, Debug)]
pub struct HostArgs {
    /// Device IP address or hostname
    #[arg(env = "SNAPMAKER_HOST")]
    pub host: String,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Device IP address or hostname
    #[arg(env = "SNAPMAKER_HOST")]
    pub host: String,

    /// Seconds between polls
    #[arg(short, long, default_value = "30")]
    pub interval: u64,

    /// Stop after this many polls
    #[arg(short, long)]
    pub count: Option<u64>,
}
