//! Board representation.
//!
//! This module contains:
//! - Symbol and Cell types
//! - The 3x3 board indexed 0-8 (row-major)
//! - The fixed set of winning lines

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of cells on the board
pub const CELL_COUNT: usize = 9;

/// Three cell indices that win the game when uniformly filled
pub type WinningLine = [usize; 3];

/// All winning lines: rows, then columns, then diagonals.
///
/// Scans always walk this array front to back, so the first match wins.
pub const WINNING_LINES: [WinningLine; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A mark placed in a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// The other symbol
    pub fn opponent(self) -> Symbol {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }

    /// Single-character form, as shown in the cell
    pub fn as_char(self) -> char {
        match self {
            Symbol::X => 'X',
            Symbol::O => 'O',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Contents of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Symbol),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The symbol in this cell, if any
    pub fn symbol(self) -> Option<Symbol> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(symbol) => Some(symbol),
        }
    }
}

impl From<Symbol> for Cell {
    fn from(symbol: Symbol) -> Self {
        Cell::Occupied(symbol)
    }
}

/// Errors from parsing a board string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardParseError {
    #[error("Expected 9 cells, found {0}")]
    WrongLength(usize),

    #[error("Invalid cell character '{0}'")]
    InvalidCell(char),
}

/// The 3x3 game board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a board from explicit cell contents
    pub fn from_cells(cells: [Cell; CELL_COUNT]) -> Self {
        Self { cells }
    }

    /// All cells in index order
    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// Get a cell, or None if the index is off the board
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Check if a cell exists and is empty
    pub fn is_empty_at(&self, index: usize) -> bool {
        self.get(index).is_some_and(Cell::is_empty)
    }

    /// Place a symbol. Callers validate the index and occupancy first.
    pub(crate) fn place(&mut self, index: usize, symbol: Symbol) {
        self.cells[index] = Cell::Occupied(symbol);
    }

    /// Indices of all empty cells, ascending
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(index, _)| index)
            .collect()
    }

    /// Number of non-empty cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// First winning line (in declaration order) holding three equal symbols
    pub fn completed_line(&self) -> Option<(Symbol, WinningLine)> {
        WINNING_LINES.iter().find_map(|&line| {
            let [a, b, c] = line.map(|i| self.cells[i]);
            match a {
                Cell::Occupied(symbol) if a == b && a == c => Some((symbol, line)),
                _ => None,
            }
        })
    }
}

impl FromStr for Board {
    type Err = BoardParseError;

    /// Parse nine cells from `X`, `O` and `_`/`.`/`-`/space for empty.
    /// Whitespace other than a literal space, and `|`/`,` separators, are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = Vec::with_capacity(CELL_COUNT);
        for c in s.chars() {
            let cell = match c {
                'X' | 'x' => Cell::Occupied(Symbol::X),
                'O' | 'o' => Cell::Occupied(Symbol::O),
                '_' | '.' | '-' | ' ' => Cell::Empty,
                '|' | ',' | '\n' | '\r' | '\t' => continue,
                other => return Err(BoardParseError::InvalidCell(other)),
            };
            cells.push(cell);
        }

        let cells: [Cell; CELL_COUNT] = cells
            .try_into()
            .map_err(|v: Vec<Cell>| BoardParseError::WrongLength(v.len()))?;
        Ok(Self { cells })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for cell in chunk {
                let c = cell.symbol().map_or('_', Symbol::as_char);
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}
