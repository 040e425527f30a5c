//! Computer opponent.
//!
//! The bot plays a greedy one-ply heuristic, in priority order:
//! 1. Complete one of its own lines
//! 2. Block a line the opponent is about to complete
//! 3. Otherwise pick a random empty cell
//!
//! It does not look further ahead, so a double threat beats it.

use crate::board::{Board, Cell, Symbol, WINNING_LINES};
use crate::game::GameState;
use crate::player::Player;
use rand::prelude::*;

/// Choose a cell for `bot` to mark, or None if the board is full
pub fn choose_move<R: Rng + ?Sized>(
    board: &Board,
    bot: Symbol,
    opponent: Symbol,
    rng: &mut R,
) -> Option<usize> {
    completing_cell(board, bot)
        .or_else(|| completing_cell(board, opponent))
        .or_else(|| board.empty_cells().choose(rng).copied())
}

/// The empty cell of the first line holding exactly two `symbol` marks and one gap
pub fn completing_cell(board: &Board, symbol: Symbol) -> Option<usize> {
    WINNING_LINES.iter().find_map(|line| {
        let mut marks = 0;
        let mut gap = None;
        for &index in line {
            match board.get(index)? {
                Cell::Occupied(s) if s == symbol => marks += 1,
                Cell::Empty => gap = Some(index),
                Cell::Occupied(_) => return None,
            }
        }
        if marks == 2 {
            gap
        } else {
            None
        }
    })
}

/// A bot player bound to one seat
pub struct Bot {
    pub player: Player,
    rng: StdRng,
}

impl Bot {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player: Player, seed: u64) -> Self {
        Self {
            player,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Choose a move if it is this bot's turn in a live game
    pub fn choose_move(&mut self, game: &GameState) -> Option<usize> {
        if game.is_finished() || game.current_player() != self.player {
            return None;
        }
        let symbol = self.player.symbol();
        choose_move(game.board(), symbol, symbol.opponent(), &mut self.rng)
    }
}
