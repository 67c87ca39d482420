//! Boardcast server library.
//!
//! One process holds the shared tic-tac-toe game and pushes every change
//! to all connected viewers over WebSocket.
//!
//! # Architecture
//!
//! - **Engine**: applies move and reset intents to the game and fans out events
//! - **Actor**: one task owns the engine; connections talk to it through a handle
//! - **Protocol**: JSON events exchanged with peers
//! - **Server**: axum router for the WebSocket, state API, and static assets
//!
//! # Example
//!
//! ```no_run
//! use boardcast_server::{ServerConfig, start_server};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::load(None)?.with_port(8080);
//! start_server(&config).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod actor;
mod config;
mod engine;
mod error;
mod peers;
mod protocol;
mod server;
mod ws;

pub use actor::{EngineHandle, spawn_engine};
pub use config::{ConfigError, ServerConfig};
pub use engine::GameEngine;
pub use error::ServerError;
pub use peers::{PEER_QUEUE_CAPACITY, PeerId, PeerReceiver, PeerSender, Peers, peer_channel};
pub use protocol::{
    BoardUpdate, ClientEvent, GameOver, MALFORMED_INDEX, MoveIntent, Rejection, ServerEvent,
    Winner,
};
pub use server::{AppState, build_router, start_server};
