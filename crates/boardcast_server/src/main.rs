//! Boardcast - unified CLI
//!
//! Serves the shared board and the browser client.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use boardcast_server::{ServerConfig, start_server};
use clap::Parser;
use cli::{Cli, Command, ServeArgs};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => run_server(args).await,
        Command::Config(args) => print_config(args),
    }
}

/// Run the game server
async fn run_server(args: ServeArgs) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,boardcast_server=debug")),
        )
        .init();

    let config = resolve_config(args)?;
    info!(addr = %config.bind_addr(), "Starting boardcast server");

    start_server(&config).await?;
    Ok(())
}

/// Print the resolved configuration
fn print_config(args: ServeArgs) -> Result<()> {
    let config = resolve_config(args)?;
    print!("{}", config.to_toml()?);
    Ok(())
}

#[instrument]
fn resolve_config(args: ServeArgs) -> Result<ServerConfig> {
    let mut config = ServerConfig::load(args.config.as_deref())?;

    if let Some(host) = args.host {
        config = config.with_host(host);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if let Some(dir) = args.static_dir {
        config = config.with_static_dir(dir);
    }
    if args.notify_rejections {
        config = config.with_notify_rejections(true);
    }

    Ok(config)
}
