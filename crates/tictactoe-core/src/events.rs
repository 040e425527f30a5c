//! Events produced by the engine.
//!
//! Adapters use these to drive animations and status text without
//! diffing successive states.

use crate::board::WinningLine;
use crate::player::Player;
use serde::{Deserialize, Serialize};

/// Something that happened as a result of an engine operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A mark was placed
    MovePlayed { player: Player, index: usize },

    /// The turn passed to the other player
    TurnChanged { next: Player },

    /// A player completed a line
    GameWon { winner: Player, line: WinningLine },

    /// The board filled with no completed line
    GameDrawn,

    /// The game was replaced by a fresh one
    GameReset,
}
