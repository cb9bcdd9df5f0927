use serde::{Deserialize, Serialize};

use crate::Move;

/// An event received from the game server (through the bridge).
///
/// On the wire, each event is a JSON object tagged by its `"event"` field,
/// e.g. `{"event": "game_start", "player_index": 0, "replay_id": "abc"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// The connection to the server has been established.
    Connect,
    /// The connection to the server is gone. This is terminal.
    Disconnect,
    /// Answer to a [`ClientCommand::SetUsername`].
    ///
    /// An absent or empty message means the username was set successfully.
    ErrorSetUsername {
        #[serde(default)]
        message: Option<String>,
    },
    /// The game has started.
    GameStart {
        /// Index of the local player, as used in terrain values.
        #[serde(alias = "playerIndex")]
        player_index: usize,
        replay_id: String,
    },
    /// Incremental update of the game state.
    GameUpdate(GameUpdate),
    GameLost,
    GameWon,
    /// Any other event (chat messages, queue updates, ...). These are ignored.
    #[serde(other)]
    Other,
}

/// The payload of a `game_update` event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameUpdate {
    /// Diff against the previously known list of visible city tiles.
    pub cities_diff: Vec<i32>,
    /// Diff against the previously known map buffer.
    pub map_diff: Vec<i32>,
    /// The general tile of every player, sent in full every time.
    ///
    /// Generals that are not visible are sent as `-1` (or `null`).
    pub generals: Vec<Option<i32>>,
}

/// A command sent to the game server (through the bridge).
///
/// Serialized as a JSON object tagged by its `"command"` field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Registers a username for the user id. Should only ever be done once.
    SetUsername { user_id: String, username: String },
    JoinPrivate { game_id: String, user_id: String },
    /// Signals readiness to start the custom game.
    SetForceStart { game_id: String, force: bool },
    /// Moves the army from one tile to an adjacent one.
    Attack { from: usize, to: usize },
    LeaveGame,
}

impl From<Move> for ClientCommand {
    fn from(mv: Move) -> Self {
        ClientCommand::Attack {
            from: mv.from,
            to: mv.to,
        }
    }
}
