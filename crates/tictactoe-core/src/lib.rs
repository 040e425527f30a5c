//! Tic-tac-toe rules engine and computer opponent.
//!
//! This crate provides the core game logic, with no rendering dependency:
//! - Board representation and the fixed winning lines
//! - Players, symbols, and the human/bot opponent choice
//! - Game state machine with move validation and win/draw detection
//! - A one-ply heuristic bot
//!
//! # Architecture
//!
//! `GameState` values are immutable snapshots; `GameEngine` owns the live
//! one for a single game. Rendering, input, and the cosmetic delay before
//! the bot replies belong to adapters. The crate can be compiled to:
//! - Native Rust for hosting sessions (see `tictactoe-session`)
//! - WebAssembly for the browser (feature `wasm`)
//!
//! # Modules
//!
//! - [`board`]: Cells, symbols, and winning lines
//! - [`player`]: Seats and opponent kind
//! - [`game`]: Game state machine and engine
//! - [`bot`]: Computer opponent
//! - [`events`]: Events emitted by the engine

pub mod board;
pub mod bot;
pub mod events;
pub mod game;
pub mod player;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use board::{Board, BoardParseError, Cell, Symbol, WinningLine, CELL_COUNT, WINNING_LINES};
pub use bot::Bot;
pub use events::GameEvent;
pub use game::{BotTurn, GameEngine, GameState, GameStateJson, GameStatus, MoveError};
pub use player::{Opponent, Player};
