//! Registry of connected peers and event fan-out.

use crate::protocol::ServerEvent;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, instrument, trace, warn};

/// Identifier assigned to a peer when it connects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display,
)]
#[display("peer-{_0}")]
pub struct PeerId(u64);

/// Events a peer may have queued before it counts as stalled.
pub const PEER_QUEUE_CAPACITY: usize = 64;

/// Sending half of a peer's outbound event queue.
pub type PeerSender = mpsc::Sender<ServerEvent>;

/// Receiving half of a peer's outbound event queue.
pub type PeerReceiver = mpsc::Receiver<ServerEvent>;

/// Creates an outbound queue holding up to [`PEER_QUEUE_CAPACITY`] events.
pub fn peer_channel() -> (PeerSender, PeerReceiver) {
    mpsc::channel(PEER_QUEUE_CAPACITY)
}

/// Connected peers keyed by id.
///
/// Sends never wait for delivery. A peer whose queue is closed has gone
/// away, and a peer whose queue is full has stopped reading; either is
/// dropped from the registry on the next send.
#[derive(Debug, Default)]
pub struct Peers {
    next_id: u64,
    senders: BTreeMap<PeerId, PeerSender>,
}

impl Peers {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a peer and returns its new id.
    #[instrument(skip(self, sender))]
    pub fn register(&mut self, sender: PeerSender) -> PeerId {
        let id = PeerId(self.next_id);
        self.next_id += 1;
        self.senders.insert(id, sender);
        debug!(peer = %id, connected = self.senders.len(), "Peer registered");
        id
    }

    /// Removes a peer. Returns false if it was not registered.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: PeerId) -> bool {
        let removed = self.senders.remove(&id).is_some();
        debug!(peer = %id, removed, connected = self.senders.len(), "Peer removed");
        removed
    }

    /// Number of connected peers.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// True if no peer is connected.
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// True if the peer is registered.
    pub fn contains(&self, id: PeerId) -> bool {
        self.senders.contains_key(&id)
    }

    /// Sends an event to one peer.
    #[instrument(skip(self, event), fields(event = event.name()))]
    pub fn send_to(&mut self, id: PeerId, event: ServerEvent) {
        let Some(sender) = self.senders.get(&id) else {
            debug!(peer = %id, "Send to unknown peer skipped");
            return;
        };
        if let Err(err) = sender.try_send(event) {
            log_dropped(id, &err);
            self.senders.remove(&id);
        }
    }

    /// Sends an event to every connected peer.
    #[instrument(skip(self, event), fields(event = event.name(), peers = self.senders.len()))]
    pub fn broadcast(&mut self, event: &ServerEvent) {
        self.senders.retain(|id, sender| match sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(err) => {
                log_dropped(*id, &err);
                false
            }
        });
        trace!(delivered = self.senders.len(), "Broadcast complete");
    }
}

fn log_dropped(id: PeerId, err: &TrySendError<ServerEvent>) {
    match err {
        TrySendError::Full(_) => {
            warn!(peer = %id, capacity = PEER_QUEUE_CAPACITY, "Peer queue full, dropping peer")
        }
        TrySendError::Closed(_) => debug!(peer = %id, "Peer queue closed, dropping peer"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_displayed() {
        let mut peers = Peers::new();
        let (tx, _rx) = peer_channel();
        let a = peers.register(tx.clone());
        let b = peers.register(tx);
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "peer-0");
        assert_eq!(b.to_string(), "peer-1");
        assert_eq!(peers.len(), 2);
    }

    #[test]
    fn test_broadcast_prunes_closed_peers() {
        let mut peers = Peers::new();
        let (live_tx, mut live_rx) = peer_channel();
        let (dead_tx, dead_rx) = peer_channel();
        let live = peers.register(live_tx);
        let dead = peers.register(dead_tx);
        drop(dead_rx);

        peers.broadcast(&ServerEvent::ResetGame);

        assert_eq!(live_rx.try_recv().unwrap(), ServerEvent::ResetGame);
        assert!(peers.contains(live));
        assert!(!peers.contains(dead));
    }

    #[test]
    fn test_send_to_targets_one_peer() {
        let mut peers = Peers::new();
        let (a_tx, mut a_rx) = peer_channel();
        let (b_tx, mut b_rx) = peer_channel();
        let a = peers.register(a_tx);
        peers.register(b_tx);

        peers.send_to(a, ServerEvent::ResetGame);

        assert_eq!(a_rx.try_recv().unwrap(), ServerEvent::ResetGame);
        assert!(b_rx.try_recv().is_err());
    }

    #[test]
    fn test_stalled_peer_is_dropped_when_queue_fills() {
        let mut peers = Peers::new();
        let (stalled_tx, _stalled_rx) = mpsc::channel(1);
        let (live_tx, mut live_rx) = peer_channel();
        let stalled = peers.register(stalled_tx);
        let live = peers.register(live_tx);

        peers.broadcast(&ServerEvent::ResetGame);
        assert!(peers.contains(stalled));

        peers.broadcast(&ServerEvent::ResetGame);
        assert!(!peers.contains(stalled));
        assert!(peers.contains(live));
        assert_eq!(live_rx.try_recv().unwrap(), ServerEvent::ResetGame);
        assert_eq!(live_rx.try_recv().unwrap(), ServerEvent::ResetGame);

        // Later broadcasts no longer queue anything for the stalled peer.
        peers.send_to(stalled, ServerEvent::ResetGame);
        assert_eq!(peers.len(), 1);
    }
}
