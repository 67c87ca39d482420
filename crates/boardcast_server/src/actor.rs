//! Single-owner task that serializes all access to the [`GameEngine`].
//!
//! Connection tasks talk to the engine only through an [`EngineHandle`].
//! Commands are processed one at a time in arrival order, so every peer
//! observes state transitions in the same order.

use crate::engine::GameEngine;
use crate::error::ServerError;
use crate::peers::{PeerId, PeerReceiver, peer_channel};
use crate::protocol::ClientEvent;
use boardcast_tictactoe::Snapshot;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument};

#[derive(Debug)]
enum Command {
    Connect {
        reply: oneshot::Sender<(PeerId, PeerReceiver)>,
    },
    Disconnect {
        peer: PeerId,
    },
    Intent {
        peer: PeerId,
        event: ClientEvent,
    },
    Snapshot {
        reply: oneshot::Sender<Snapshot>,
    },
}

/// Cloneable handle to the engine task.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<Command>,
}

/// Spawns the engine task on the current tokio runtime.
///
/// The task stops once every handle has been dropped.
#[instrument(skip(engine))]
pub fn spawn_engine(engine: GameEngine, capacity: usize) -> EngineHandle {
    let (commands, rx) = mpsc::channel(capacity);
    tokio::spawn(run(engine, rx));
    EngineHandle { commands }
}

async fn run(mut engine: GameEngine, mut rx: mpsc::Receiver<Command>) {
    info!("Engine task started");
    while let Some(command) = rx.recv().await {
        match command {
            Command::Connect { reply } => {
                let (tx, events) = peer_channel();
                let peer = engine.on_peer_connected(tx);
                if reply.send((peer, events)).is_err() {
                    debug!(%peer, "Connection gone before registration completed");
                    engine.on_peer_disconnected(peer);
                }
            }
            Command::Disconnect { peer } => engine.on_peer_disconnected(peer),
            Command::Intent { peer, event } => engine.on_client_event(peer, event),
            Command::Snapshot { reply } => {
                let _ = reply.send(engine.snapshot());
            }
        }
    }
    info!("Engine task stopped");
}

impl EngineHandle {
    async fn send(&self, command: Command) -> Result<(), ServerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ServerError::new("Engine task is not running"))
    }

    /// Registers a new peer.
    ///
    /// The returned receiver yields the live board first, then every
    /// broadcast from then on.
    pub async fn connect(&self) -> Result<(PeerId, PeerReceiver), ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Connect { reply }).await?;
        rx.await
            .map_err(|_| ServerError::new("Engine dropped connect request"))
    }

    /// Unregisters a peer.
    pub async fn disconnect(&self, peer: PeerId) -> Result<(), ServerError> {
        self.send(Command::Disconnect { peer }).await
    }

    /// Queues an intent from a peer.
    pub async fn submit(&self, peer: PeerId, event: ClientEvent) -> Result<(), ServerError> {
        self.send(Command::Intent { peer, event }).await
    }

    /// Reads the current snapshot.
    ///
    /// Ordered after every command submitted before it.
    pub async fn snapshot(&self) -> Result<Snapshot, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await
            .map_err(|_| ServerError::new("Engine dropped snapshot request"))
    }
}
