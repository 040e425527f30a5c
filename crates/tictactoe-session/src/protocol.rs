//! Messages delivered to session subscribers.

use serde::{Deserialize, Serialize};
use tictactoe_core::{GameEvent, GameStateJson, MoveError, Opponent, Player, WinningLine};
use uuid::Uuid;

/// Messages sent from a session to its renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum SessionUpdate {
    /// A move was applied; render this state
    State {
        session_id: Uuid,
        state: GameStateJson,
        events: Vec<GameEvent>,
    },

    /// A move was ignored; the state is unchanged
    Rejected { session_id: Uuid, error: MoveError },

    /// The game reached a terminal state
    GameOver {
        session_id: Uuid,
        winner: Option<Player>,
        line: Option<WinningLine>,
    },

    /// The game was replaced by a fresh one
    Reset {
        session_id: Uuid,
        state: GameStateJson,
    },
}

/// Session information for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub opponent: Opponent,
    pub move_count: u32,
    pub finished: bool,
    pub status_text: String,
}
