//! Core game state machine.
//!
//! `GameState` is an immutable snapshot: `apply_move` returns a new state
//! and leaves the old one untouched. `GameEngine` owns the live state for
//! one game and drives the bot.

use crate::board::{Board, Cell, Symbol, WinningLine, CELL_COUNT};
use crate::bot::Bot;
use crate::events::GameEvent;
use crate::player::{Opponent, Player};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the game stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    /// Terminal: `winner` completed `line`
    Won { winner: Player, line: WinningLine },
    /// Terminal: board full, no line completed
    Draw,
}

/// Errors that can occur when applying a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MoveError {
    #[error("Cell {0} is off the board")]
    OutOfRange(usize),

    #[error("Cell {0} is already taken")]
    CellOccupied(usize),

    #[error("Game is over")]
    GameAlreadyOver,

    #[error("Not your turn")]
    NotYourTurn,
}

/// A complete game position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    current_player: Player,
    status: GameStatus,
    /// Marks placed so far; always equals the occupied cell count
    move_count: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Fresh game: empty board, First to move
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Player::First,
            status: GameStatus::InProgress,
            move_count: 0,
        }
    }

    /// Build a position from an arbitrary board.
    ///
    /// The move count is taken from the board and the status is evaluated,
    /// so hand-built positions obey the same invariants as played ones.
    /// A completed line is credited to the player owning its symbol, who
    /// then stays current the same way a played winning move leaves them.
    pub fn from_board(board: Board, to_move: Player) -> Self {
        let status = match board.completed_line() {
            Some((symbol, line)) => GameStatus::Won {
                winner: Player::for_symbol(symbol),
                line,
            },
            None if board.is_full() => GameStatus::Draw,
            None => GameStatus::InProgress,
        };
        let current_player = match status {
            GameStatus::Won { winner, .. } => winner,
            _ => to_move,
        };

        Self {
            board,
            current_player,
            status,
            move_count: board.occupied_count() as u32,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Player to move, or the player who made the last move once terminal
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == GameStatus::InProgress
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        !self.is_in_progress()
    }

    /// Get the winner if the game was won
    pub fn winner(&self) -> Option<Player> {
        match self.status {
            GameStatus::Won { winner, .. } => Some(winner),
            _ => None,
        }
    }

    pub fn winning_line(&self) -> Option<WinningLine> {
        match self.status {
            GameStatus::Won { line, .. } => Some(line),
            _ => None,
        }
    }

    /// Cells the current player may mark; empty once the game is over
    pub fn valid_moves(&self) -> Vec<usize> {
        if self.is_finished() {
            return Vec::new();
        }
        self.board.empty_cells()
    }

    /// Apply a move for the current player, returning the resulting state
    pub fn apply_move(&self, index: usize) -> Result<GameState, MoveError> {
        if self.is_finished() {
            return Err(MoveError::GameAlreadyOver);
        }
        if index >= CELL_COUNT {
            return Err(MoveError::OutOfRange(index));
        }
        if !self.board.is_empty_at(index) {
            return Err(MoveError::CellOccupied(index));
        }

        let mut next = self.clone();
        next.board.place(index, self.current_player.symbol());
        next.move_count += 1;
        next.status = next.evaluate();

        // The winner stays as current player so the adapter can highlight them
        if next.is_in_progress() {
            next.current_player = self.current_player.opponent();
        }

        Ok(next)
    }

    /// Terminal check after the current player has just moved
    fn evaluate(&self) -> GameStatus {
        if let Some((_, line)) = self.board.completed_line() {
            return GameStatus::Won {
                winner: self.current_player,
                line,
            };
        }
        if self.board.is_full() {
            return GameStatus::Draw;
        }
        GameStatus::InProgress
    }

    /// One-line description for the status element
    pub fn status_text(&self) -> String {
        match self.status {
            GameStatus::Won { winner, .. } => format!("{} wins!", winner),
            GameStatus::Draw => "Draw!".to_string(),
            GameStatus::InProgress => format!("{} to move", self.current_player),
        }
    }

    /// Flat view for rendering
    pub fn to_json_friendly(&self) -> GameStateJson {
        let cells = self
            .board
            .cells()
            .iter()
            .map(|cell| match cell {
                Cell::Empty => String::new(),
                Cell::Occupied(symbol) => symbol.to_string(),
            })
            .collect();

        let status = match self.status {
            GameStatus::InProgress => "InProgress",
            GameStatus::Won { .. } => "Won",
            GameStatus::Draw => "Draw",
        };

        GameStateJson {
            cells,
            current_player: self.current_player,
            current_symbol: self.current_player.symbol(),
            status: status.to_string(),
            winner: self.winner(),
            winning_line: self.winning_line(),
            move_count: self.move_count,
            status_text: self.status_text(),
        }
    }
}

/// JSON-friendly game state for the rendering adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateJson {
    /// `"X"`, `"O"` or `""` per cell
    pub cells: Vec<String>,
    pub current_player: Player,
    pub current_symbol: Symbol,
    /// `"InProgress"`, `"Won"` or `"Draw"`
    pub status: String,
    pub winner: Option<Player>,
    pub winning_line: Option<WinningLine>,
    pub move_count: u32,
    pub status_text: String,
}

/// A claim on the bot's next move.
///
/// Issued by [`GameEngine::pending_bot_turn`] and redeemed with
/// [`GameEngine::play_bot_turn`]. A ticket goes stale once the game is
/// reset or any move is played after it was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotTurn {
    pub generation: u64,
    pub move_count: u32,
}

/// Owns the live state of one game
pub struct GameEngine {
    state: GameState,
    opponent: Opponent,
    bot: Bot,
    /// Bumped on every reset
    generation: u64,
}

impl GameEngine {
    pub fn new(opponent: Opponent) -> Self {
        Self::with_bot(opponent, Bot::new(Player::Second))
    }

    /// Engine whose bot replays the same choices for the same seed
    pub fn with_seed(opponent: Opponent, seed: u64) -> Self {
        Self::with_bot(opponent, Bot::with_seed(Player::Second, seed))
    }

    fn with_bot(opponent: Opponent, bot: Bot) -> Self {
        Self {
            state: GameState::new(),
            opponent,
            bot,
            generation: 0,
        }
    }

    /// Read-only snapshot of the current game
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn opponent(&self) -> Opponent {
        self.opponent
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bot_to_move(&self) -> bool {
        self.state.is_in_progress() && self.opponent.is_bot(self.state.current_player)
    }

    /// Human input: mark a cell for whoever is to move.
    ///
    /// Does not run the bot; see [`GameEngine::pending_bot_turn`].
    pub fn select_cell(&mut self, index: usize) -> Result<Vec<GameEvent>, MoveError> {
        if self.bot_to_move() {
            return Err(MoveError::NotYourTurn);
        }
        self.commit(index)
    }

    /// Ticket for the bot's move, if the bot is to move
    pub fn pending_bot_turn(&self) -> Option<BotTurn> {
        self.bot_to_move().then_some(BotTurn {
            generation: self.generation,
            move_count: self.state.move_count,
        })
    }

    /// Play the bot's move for a ticket. Stale tickets are a no-op.
    pub fn play_bot_turn(&mut self, turn: BotTurn) -> Vec<GameEvent> {
        if self.pending_bot_turn() != Some(turn) {
            return Vec::new();
        }
        let Some(index) = self.bot.choose_move(&self.state) else {
            return Vec::new();
        };
        // The bot only picks empty cells of a live game
        self.commit(index).unwrap_or_default()
    }

    /// Human move followed at once by the bot's reply, if one is due
    pub fn play(&mut self, index: usize) -> Result<Vec<GameEvent>, MoveError> {
        let mut events = self.select_cell(index)?;
        if let Some(turn) = self.pending_bot_turn() {
            events.extend(self.play_bot_turn(turn));
        }
        Ok(events)
    }

    /// Start over with the same opponent
    pub fn reset(&mut self) -> Vec<GameEvent> {
        self.reset_with(self.opponent)
    }

    /// Start over, possibly switching between human and bot opponent
    pub fn reset_with(&mut self, opponent: Opponent) -> Vec<GameEvent> {
        self.state = GameState::new();
        self.opponent = opponent;
        self.generation = self.generation.wrapping_add(1);
        vec![GameEvent::GameReset]
    }

    fn commit(&mut self, index: usize) -> Result<Vec<GameEvent>, MoveError> {
        let player = self.state.current_player;
        let next = self.state.apply_move(index)?;

        let mut events = vec![GameEvent::MovePlayed { player, index }];
        match next.status {
            GameStatus::InProgress => events.push(GameEvent::TurnChanged {
                next: next.current_player,
            }),
            GameStatus::Won { winner, line } => events.push(GameEvent::GameWon { winner, line }),
            GameStatus::Draw => events.push(GameEvent::GameDrawn),
        }

        self.state = next;
        Ok(events)
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(Opponent::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state(board: &str, to_move: Player) -> GameState {
        GameState::from_board(board.parse().unwrap(), to_move)
    }

    #[test]
    fn test_new_game() {
        let game = GameState::new();
        assert_eq!(game.current_player(), Player::First);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.move_count(), 0);
        assert_eq!(game.valid_moves().len(), 9);
    }

    #[test]
    fn test_center_opening() {
        let game = GameState::new();
        let next = game.apply_move(4).unwrap();

        assert_eq!(next.board().get(4), Some(Cell::Occupied(Symbol::X)));
        assert_eq!(next.status(), GameStatus::InProgress);
        assert_eq!(next.current_player(), Player::Second);
        assert_eq!(next.move_count(), 1);

        // Input state is untouched
        assert_eq!(game, GameState::new());
    }

    #[test]
    fn test_winning_move_keeps_player() {
        let game = state("XX_OO____", Player::First);
        let next = game.apply_move(2).unwrap();

        assert_eq!(
            next.status(),
            GameStatus::Won {
                winner: Player::First,
                line: [0, 1, 2]
            }
        );
        assert_eq!(next.current_player(), Player::First);
        assert_eq!(next.status_text(), "Player 1 wins!");
    }

    #[test]
    fn test_full_board_is_draw() {
        let game = state("XOXXOOOX_", Player::First);
        let next = game.apply_move(8).unwrap();
        assert_eq!(next.status(), GameStatus::Draw);
        assert_eq!(next.status_text(), "Draw!");
        assert!(next.valid_moves().is_empty());
    }

    #[test]
    fn test_win_on_last_cell_is_not_draw() {
        let game = state("XXOOXXOO_", Player::First);
        let next = game.apply_move(8).unwrap();
        assert_eq!(next.winner(), Some(Player::First));
        assert_eq!(next.winning_line(), Some([0, 4, 8]));
    }

    #[test]
    fn test_move_errors_leave_state_unchanged() {
        let game = GameState::new().apply_move(0).unwrap();

        assert_eq!(game.apply_move(0), Err(MoveError::CellOccupied(0)));
        assert_eq!(game.apply_move(9), Err(MoveError::OutOfRange(9)));
        assert_eq!(game.apply_move(usize::MAX), Err(MoveError::OutOfRange(usize::MAX)));
        assert_eq!(game.move_count(), 1);
        assert_eq!(game.current_player(), Player::Second);
    }

    #[test]
    fn test_no_moves_after_game_over() {
        let game = state("XX_OO____", Player::First).apply_move(2).unwrap();
        assert_eq!(game.apply_move(5), Err(MoveError::GameAlreadyOver));
        assert_eq!(game.apply_move(42), Err(MoveError::GameAlreadyOver));
    }

    #[test]
    fn test_from_board_evaluates_status() {
        assert_eq!(state("XOXXOOOXX", Player::First).status(), GameStatus::Draw);
        assert_eq!(state("XOXXOOOXX", Player::First).move_count(), 9);
        assert_eq!(
            state("OOOXX_X__", Player::First).winner(),
            Some(Player::Second)
        );
    }

    #[test]
    fn test_from_board_won_keeps_winner_current() {
        let won = state("OOOXX_X__", Player::First);
        assert_eq!(won.current_player(), Player::Second);
        assert_eq!(won.to_json_friendly().current_symbol, Symbol::O);
        assert_eq!(won.status_text(), "Player 2 wins!");

        // Same as reaching the position by play
        let played = state("OO_XX_X__", Player::Second).apply_move(2).unwrap();
        assert_eq!(played.current_player(), won.current_player());
    }

    #[test]
    fn test_json_friendly_view() {
        let json = state("XX_OO____", Player::First).to_json_friendly();
        assert_eq!(json.cells, vec!["X", "X", "", "O", "O", "", "", "", ""]);
        assert_eq!(json.status, "InProgress");
        assert_eq!(json.current_symbol, Symbol::X);
        assert_eq!(json.winning_line, None);
        assert_eq!(json.status_text, "Player 1 to move");
    }

    #[test]
    fn test_engine_rejects_human_on_bot_turn() {
        let mut engine = GameEngine::with_seed(Opponent::Bot, 7);
        engine.select_cell(4).unwrap();

        assert_eq!(engine.select_cell(0), Err(MoveError::NotYourTurn));
        assert!(engine.pending_bot_turn().is_some());
    }

    #[test]
    fn test_engine_hot_seat_has_no_bot() {
        let mut engine = GameEngine::new(Opponent::Human);
        engine.select_cell(4).unwrap();
        assert_eq!(engine.pending_bot_turn(), None);

        let events = engine.select_cell(0).unwrap();
        assert_eq!(
            events,
            vec![
                GameEvent::MovePlayed {
                    player: Player::Second,
                    index: 0
                },
                GameEvent::TurnChanged {
                    next: Player::First
                },
            ]
        );
    }

    #[test]
    fn test_engine_play_includes_bot_reply() {
        let mut engine = GameEngine::with_seed(Opponent::Bot, 1);
        let events = engine.play(4).unwrap();

        assert_eq!(engine.state().move_count(), 2);
        assert_eq!(engine.state().current_player(), Player::First);
        assert_eq!(events.len(), 4);
        assert!(matches!(
            events[2],
            GameEvent::MovePlayed {
                player: Player::Second,
                ..
            }
        ));
    }

    #[test]
    fn test_stale_ticket_after_reset() {
        let mut engine = GameEngine::with_seed(Opponent::Bot, 3);
        engine.select_cell(4).unwrap();
        let ticket = engine.pending_bot_turn().unwrap();

        assert_eq!(engine.reset(), vec![GameEvent::GameReset]);
        assert!(engine.play_bot_turn(ticket).is_empty());
        assert_eq!(engine.state(), &GameState::new());
    }

    #[test]
    fn test_ticket_redeems_once() {
        let mut engine = GameEngine::with_seed(Opponent::Bot, 3);
        engine.select_cell(4).unwrap();
        let ticket = engine.pending_bot_turn().unwrap();

        assert!(!engine.play_bot_turn(ticket).is_empty());
        assert!(engine.play_bot_turn(ticket).is_empty());
        assert_eq!(engine.state().move_count(), 2);
    }

    #[test]
    fn test_reset_with_switches_opponent() {
        let mut engine = GameEngine::new(Opponent::Bot);
        engine.reset_with(Opponent::Human);
        assert_eq!(engine.opponent(), Opponent::Human);
        assert_eq!(engine.generation(), 1);
    }
}
