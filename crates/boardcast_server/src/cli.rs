//! Command-line interface for boardcast.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Boardcast - shared tic-tac-toe board synchronized across viewers
#[derive(Parser, Debug)]
#[command(name = "boardcast")]
#[command(about = "Authoritative tic-tac-toe server for browser viewers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve(ServeArgs),

    /// Print the resolved configuration as TOML
    Config(ServeArgs),
}

/// Options shared by `serve` and `config`.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory of static client assets
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Tell a peer when its move is rejected
    #[arg(long)]
    pub notify_rejections: bool,
}
