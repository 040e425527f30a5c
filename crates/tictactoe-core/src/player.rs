//! Players and opponents.

use crate::board::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two seats at the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Plays X and always opens the game
    First,
    /// Plays O; this is the seat the bot takes
    Second,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::First, Player::Second];

    /// The symbol this player places
    pub fn symbol(self) -> Symbol {
        match self {
            Player::First => Symbol::X,
            Player::Second => Symbol::O,
        }
    }

    /// The player placing a given symbol
    pub fn for_symbol(symbol: Symbol) -> Player {
        match symbol {
            Symbol::X => Player::First,
            Symbol::O => Player::Second,
        }
    }

    pub fn opponent(self) -> Player {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }

    /// Who places the n-th mark of a game (1-based): First on odd, Second on even
    pub fn for_move_number(n: u32) -> Player {
        if n % 2 == 1 {
            Player::First
        } else {
            Player::Second
        }
    }

    /// Label shown in the turn indicator
    pub fn label(self) -> &'static str {
        match self {
            Player::First => "Player 1",
            Player::Second => "Player 2",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who sits in the Second seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Opponent {
    /// Two humans sharing the board
    Human,
    /// Second is played by the computer
    #[default]
    Bot,
}

impl Opponent {
    /// Check if a given player's moves come from the bot
    pub fn is_bot(self, player: Player) -> bool {
        self == Opponent::Bot && player == Player::Second
    }
}
