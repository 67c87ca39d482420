//! WebSocket transport between peers and the engine.
//!
//! Each connection runs a writer that drains the peer's event queue into
//! the socket and a reader that parses inbound frames into intents. When
//! either side stops, the other is aborted and the peer is unregistered.

use crate::actor::EngineHandle;
use crate::peers::{PeerId, PeerReceiver};
use crate::protocol::ClientEvent;
use crate::server::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tracing::{debug, instrument, warn};

/// Upgrades `GET /ws` to a peer connection.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.engine))
}

#[instrument(skip_all)]
async fn handle_socket(socket: WebSocket, engine: EngineHandle) {
    let (peer, events) = match engine.connect().await {
        Ok(registered) => registered,
        Err(e) => {
            warn!(error = %e, "Could not register peer");
            return;
        }
    };

    let (sink, stream) = socket.split();
    let mut writer = tokio::spawn(write_events(peer, sink, events));
    let mut reader = tokio::spawn(read_intents(peer, stream, engine.clone()));

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    if let Err(e) = engine.disconnect(peer).await {
        debug!(%peer, error = %e, "Disconnect after engine shutdown");
    }
}

async fn write_events(peer: PeerId, mut sink: SplitSink<WebSocket, Message>, mut events: PeerReceiver) {
    while let Some(event) = events.recv().await {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                warn!(%peer, event = event.name(), "Failed to serialize event: {e}");
                continue;
            }
        };
        if sink.send(Message::Text(json.into())).await.is_err() {
            debug!(%peer, "WebSocket send failed, closing writer");
            return;
        }
    }
    let _ = sink.close().await;
}

async fn read_intents(peer: PeerId, mut stream: SplitStream<WebSocket>, engine: EngineHandle) {
    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => match ClientEvent::from_json(text.as_str()) {
                Ok(event) => {
                    if engine.submit(peer, event).await.is_err() {
                        debug!(%peer, "Engine stopped, closing reader");
                        return;
                    }
                }
                Err(e) => debug!(%peer, error = %e, "Ignoring malformed frame"),
            },
            Ok(Message::Close(_)) => {
                debug!(%peer, "WebSocket client closed");
                return;
            }
            Err(e) => {
                debug!(%peer, "WebSocket error: {e}");
                return;
            }
            // Ping/pong are answered by the transport; binary frames are not part of the protocol.
            Ok(_) => {}
        }
    }
}
