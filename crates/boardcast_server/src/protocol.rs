//! Wire protocol between peers and the server.
//!
//! Every WebSocket text frame carries one JSON object of the form
//! `{"event": <name>, "data": <payload>}`. Payload-less events omit `data`.

use boardcast_tictactoe::{GameStatus, Mark, MoveError, Snapshot};
use serde::{Deserialize, Deserializer, Serialize};

/// Board state pushed to peers on connect and after every accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardUpdate {
    /// Row-major cells, `null` for empty.
    pub board: [Option<Mark>; 9],
    /// Mark entitled to move next.
    pub current_player: Mark,
    /// True once the game is won or drawn.
    pub game_over: bool,
}

impl From<&Snapshot> for BoardUpdate {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            board: snapshot.board,
            current_player: snapshot.current_player,
            game_over: snapshot.game_over(),
        }
    }
}

/// Final result carried by the `gameOver` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// X completed a line.
    X,
    /// O completed a line.
    O,
    /// Full board, no line.
    Draw,
}

impl Winner {
    /// The outcome for a status, `None` while the game is in progress.
    pub fn from_status(status: &GameStatus) -> Option<Self> {
        match status {
            GameStatus::InProgress => None,
            GameStatus::Won(Mark::X) => Some(Winner::X),
            GameStatus::Won(Mark::O) => Some(Winner::O),
            GameStatus::Draw => Some(Winner::Draw),
        }
    }
}

/// Payload of the `gameOver` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    /// Winning mark or draw.
    pub winner: Winner,
}

/// Payload of the `moveRejected` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Short reason: `already-over`, `out-of-range` or `occupied`.
    pub reason: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&MoveError> for Rejection {
    fn from(err: &MoveError) -> Self {
        Self {
            reason: err.reason().to_string(),
            message: err.to_string(),
        }
    }
}

/// Events sent from the server to peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Current board, turn, and terminal flag.
    UpdateBoard(BoardUpdate),
    /// Sent right after `updateBoard` when a move ends the game.
    GameOver(GameOver),
    /// The game was reset; peers restore a fresh board with X to move.
    ResetGame,
    /// Sent only to the mover, and only when rejection notices are enabled.
    MoveRejected(Rejection),
}

impl ServerEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::UpdateBoard(_) => "updateBoard",
            ServerEvent::GameOver(_) => "gameOver",
            ServerEvent::ResetGame => "resetGame",
            ServerEvent::MoveRejected(_) => "moveRejected",
        }
    }
}

/// Index used for move payloads that carry no usable cell index.
pub const MALFORMED_INDEX: usize = usize::MAX;

/// Payload of the `move` event.
///
/// Browsers often send the index as a string read from a DOM attribute,
/// so both `4` and `"4"` are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveIntent {
    /// Requested cell, as sent.
    #[serde(default)]
    pub index: serde_json::Value,
}

impl MoveIntent {
    /// Creates an intent for a numeric index.
    pub fn new(index: usize) -> Self {
        Self {
            index: serde_json::Value::from(index),
        }
    }

    /// Resolves the requested cell index.
    ///
    /// Anything that is not a non-negative integer maps to
    /// [`MALFORMED_INDEX`], which the game rejects as out of range.
    /// Floats with no fractional part, such as `4.0`, count as integers.
    pub fn cell_index(&self) -> usize {
        match &self.index {
            serde_json::Value::Number(n) => n
                .as_u64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(f))
                        .map(|f| f as u64)
                })
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(MALFORMED_INDEX),
            serde_json::Value::String(s) => s.trim().parse().unwrap_or(MALFORMED_INDEX),
            _ => MALFORMED_INDEX,
        }
    }
}

/// Events sent from peers to the server.
///
/// `resetGame` ignores whatever payload accompanies it, so `{}` or `[]`
/// from an emitter that always attaches data still resets the game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Attempt a move for the mark whose turn it is.
    Move(MoveIntent),
    /// Unconditional reset.
    ResetGame,
}

#[derive(Deserialize)]
struct RawClientEvent {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl<'de> Deserialize<'de> for ClientEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawClientEvent::deserialize(deserializer)?;
        match raw.event.as_str() {
            "move" if raw.data.is_null() => Ok(ClientEvent::Move(MoveIntent {
                index: serde_json::Value::Null,
            })),
            "move" => serde_json::from_value(raw.data)
                .map(ClientEvent::Move)
                .map_err(serde::de::Error::custom),
            "resetGame" => Ok(ClientEvent::ResetGame),
            other => Err(serde::de::Error::unknown_variant(other, &["move", "resetGame"])),
        }
    }
}

impl ClientEvent {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for frames that are not a known event.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_board_wire_shape() {
        let mut board = [None; 9];
        board[4] = Some(Mark::X);
        let event = ServerEvent::UpdateBoard(BoardUpdate {
            board,
            current_player: Mark::O,
            game_over: false,
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "updateBoard",
                "data": {
                    "board": [null, null, null, null, "X", null, null, null, null],
                    "currentPlayer": "O",
                    "gameOver": false
                }
            })
        );
    }

    #[test]
    fn test_game_over_and_reset_wire_shape() {
        let draw = ServerEvent::GameOver(GameOver {
            winner: Winner::Draw,
        });
        assert_eq!(
            serde_json::to_value(&draw).unwrap(),
            json!({"event": "gameOver", "data": {"winner": "Draw"}})
        );
        assert_eq!(
            serde_json::to_value(ServerEvent::ResetGame).unwrap(),
            json!({"event": "resetGame"})
        );
    }

    #[test]
    fn test_client_move_accepts_number_and_string() {
        let numeric = ClientEvent::from_json(r#"{"event":"move","data":{"index":4}}"#).unwrap();
        let text = ClientEvent::from_json(r#"{"event":"move","data":{"index":"4"}}"#).unwrap();
        for event in [numeric, text] {
            match event {
                ClientEvent::Move(intent) => assert_eq!(intent.cell_index(), 4),
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[test]
    fn test_malformed_index_maps_out_of_range() {
        for index in [
            json!(-1),
            json!(2.5),
            json!(-3.0),
            json!(1e300),
            json!("four"),
            json!(null),
            json!([1]),
        ] {
            let intent = MoveIntent { index };
            assert_eq!(intent.cell_index(), MALFORMED_INDEX);
        }
        let missing = ClientEvent::from_json(r#"{"event":"move","data":{}}"#).unwrap();
        assert_eq!(missing, ClientEvent::Move(MoveIntent { index: serde_json::Value::Null }));
    }

    #[test]
    fn test_whole_float_index_accepted() {
        let event = ClientEvent::from_json(r#"{"event":"move","data":{"index":4.0}}"#).unwrap();
        match event {
            ClientEvent::Move(intent) => assert_eq!(intent.cell_index(), 4),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_client_reset_ignores_payload() {
        for frame in [
            r#"{"event":"resetGame"}"#,
            r#"{"event":"resetGame","data":null}"#,
            r#"{"event":"resetGame","data":{}}"#,
            r#"{"event":"resetGame","data":[]}"#,
            r#"{"event":"resetGame","data":"now"}"#,
        ] {
            assert_eq!(ClientEvent::from_json(frame).unwrap(), ClientEvent::ResetGame, "{frame}");
        }
    }

    #[test]
    fn test_client_events_serialize_to_wire_names() {
        assert_eq!(
            serde_json::to_value(ClientEvent::ResetGame).unwrap(),
            json!({"event": "resetGame"})
        );
        let value = serde_json::to_value(ClientEvent::Move(MoveIntent::new(3))).unwrap();
        assert_eq!(value, json!({"event": "move", "data": {"index": 3}}));
        assert_eq!(
            ClientEvent::from_json(&value.to_string()).unwrap(),
            ClientEvent::Move(MoveIntent::new(3))
        );
    }

    #[test]
    fn test_client_reset_and_unknown_events() {
        assert!(ClientEvent::from_json(r#"{"event":"shuffle"}"#).is_err());
        assert!(ClientEvent::from_json("not json").is_err());
    }
}
