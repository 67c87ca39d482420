//! Session coordinator between peer intents and the shared game.

use crate::peers::{PeerId, PeerSender, Peers};
use crate::protocol::{BoardUpdate, ClientEvent, GameOver, Rejection, ServerEvent, Winner};
use boardcast_tictactoe::{GameState, MoveError, Snapshot};
use tracing::{debug, info, instrument, warn};

/// Owns the one game in flight and the set of connected peers.
///
/// Every entry point runs to completion before the next one starts;
/// the actor in [`crate::actor`] guarantees that ordering.
#[derive(Debug)]
pub struct GameEngine {
    game: GameState,
    peers: Peers,
    notify_rejections: bool,
}

impl GameEngine {
    /// Creates an engine with a fresh game and no peers.
    ///
    /// With `notify_rejections` set, a rejected mover receives a
    /// `moveRejected` event; otherwise rejections are silent.
    #[instrument]
    pub fn new(notify_rejections: bool) -> Self {
        info!("Creating game engine");
        Self {
            game: GameState::new(),
            peers: Peers::new(),
            notify_rejections,
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.game.snapshot()
    }

    /// Number of connected peers.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Registers a peer and sends it the live board.
    #[instrument(skip(self, sender))]
    pub fn on_peer_connected(&mut self, sender: PeerSender) -> PeerId {
        let peer = self.peers.register(sender);
        info!(%peer, connected = self.peers.len(), "New peer connected");
        let update = ServerEvent::UpdateBoard(BoardUpdate::from(&self.game.snapshot()));
        self.peers.send_to(peer, update);
        peer
    }

    /// Forgets a peer. Nothing is broadcast.
    #[instrument(skip(self))]
    pub fn on_peer_disconnected(&mut self, peer: PeerId) {
        if self.peers.remove(peer) {
            info!(%peer, connected = self.peers.len(), "Peer disconnected");
        }
    }

    /// Applies a move for whichever mark holds the turn.
    ///
    /// An accepted move is broadcast to every peer as `updateBoard`,
    /// followed by `gameOver` if the game ended. A rejected move is not
    /// broadcast.
    ///
    /// # Errors
    ///
    /// Returns the [`MoveError`] that caused the rejection.
    #[instrument(skip(self))]
    pub fn on_move_intent(&mut self, peer: PeerId, index: usize) -> Result<Snapshot, MoveError> {
        let snapshot = match self.game.apply_move(index) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                debug!(%peer, index, reason = err.reason(), "Move rejected");
                if self.notify_rejections {
                    self.peers
                        .send_to(peer, ServerEvent::MoveRejected(Rejection::from(&err)));
                }
                return Err(err);
            }
        };

        self.peers
            .broadcast(&ServerEvent::UpdateBoard(BoardUpdate::from(&snapshot)));

        if let Some(winner) = Winner::from_status(&snapshot.status) {
            info!(%peer, ?winner, "Game over");
            self.peers
                .broadcast(&ServerEvent::GameOver(GameOver { winner }));
        }

        Ok(snapshot)
    }

    /// Resets the game and tells every peer. Always accepted.
    #[instrument(skip(self))]
    pub fn on_reset_intent(&mut self, peer: PeerId) -> Snapshot {
        info!(%peer, "Reset requested");
        let snapshot = self.game.reset();
        self.peers.broadcast(&ServerEvent::ResetGame);
        snapshot
    }

    /// Dispatches a parsed client event.
    #[instrument(skip(self, event))]
    pub fn on_client_event(&mut self, peer: PeerId, event: ClientEvent) {
        match event {
            ClientEvent::Move(intent) => {
                let index = intent.cell_index();
                if let Err(err) = self.on_move_intent(peer, index) {
                    if matches!(err, MoveError::InvalidIndex(_)) {
                        warn!(%peer, index = ?intent.index, "Move with unusable index ignored");
                    }
                }
            }
            ClientEvent::ResetGame => {
                self.on_reset_intent(peer);
            }
        }
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(false)
    }
}
