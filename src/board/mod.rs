//! The 10x10 grid: coordinates, the plaintext setup grid, the encrypted board
//! and the opponent-visible view of it.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

mod encrypted;
mod view;

pub use encrypted::{Aggregate, EncryptedBoard};
pub use view::{BoardView, Mark};

pub const GRID_SIZE: usize = 10;
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// A cell address checked to lie inside the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct Coordinate {
    row: u8,
    col: u8,
}

impl Coordinate {
    pub fn new(row: usize, col: usize) -> Result<Self> {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return Err(GameError::InvalidCoordinate { row, col });
        }
        Ok(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    pub fn row(&self) -> usize {
        self.row as usize
    }

    pub fn col(&self) -> usize {
        self.col as usize
    }

    /// Row-major position in `0..CELL_COUNT`.
    pub fn index(&self) -> usize {
        self.row() * GRID_SIZE + self.col()
    }

    /// Every cell, row by row.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..GRID_SIZE as u8).flat_map(|row| (0..GRID_SIZE as u8).map(move |col| Self { row, col }))
    }
}

impl TryFrom<(usize, usize)> for Coordinate {
    type Error = GameError;

    fn try_from(value: (usize, usize)) -> Result<Self> {
        Self::new(value.0, value.1)
    }
}

impl From<Coordinate> for (usize, usize) {
    fn from(at: Coordinate) -> Self {
        (at.row(), at.col())
    }
}

/// Letter row then 1-based column, e.g. `A5` is row 0, column 4.
impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'A' + self.row) as char, self.col + 1)
    }
}

impl FromStr for Coordinate {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_uppercase();
        let mut chars = s.chars();
        let row_char = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => c,
            _ => return Err(GameError::ParseCoordinate(format!("{s:?} must start with a row letter"))),
        };
        let col_str = chars.as_str();
        if col_str.is_empty() || !col_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(GameError::ParseCoordinate(format!("{s:?} must end with a column number")));
        }
        let col: usize = col_str
            .parse()
            .map_err(|_| GameError::ParseCoordinate(format!("{s:?} has an oversized column")))?;
        if col == 0 {
            return Err(GameError::ParseCoordinate("columns are numbered from 1".into()));
        }
        let row = (row_char as u8 - b'A') as usize;
        Self::new(row, col - 1)
    }
}

/// Plaintext fleet layout: 1 marks a ship segment, 0 water.
///
/// Only setup sees this; once encrypted into an [`EncryptedBoard`] it is dropped.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PlainGrid {
    cells: [[u8; GRID_SIZE]; GRID_SIZE],
}

impl PlainGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: &[[u8; GRID_SIZE]; GRID_SIZE]) -> Result<Self> {
        for (r, row) in rows.iter().enumerate() {
            if let Some(c) = row.iter().position(|&v| v > 1) {
                return Err(GameError::InvalidGrid(format!(
                    "cell ({r}, {c}) holds {}, expected 0 or 1",
                    row[c]
                )));
            }
        }
        Ok(Self { cells: *rows })
    }

    pub fn from_segments(segments: &[Coordinate]) -> Self {
        let mut grid = Self::new();
        for &at in segments {
            grid.set(at, 1);
        }
        grid
    }

    pub fn get(&self, at: Coordinate) -> u8 {
        self.cells[at.row()][at.col()]
    }

    pub(crate) fn set(&mut self, at: Coordinate, value: u8) {
        self.cells[at.row()][at.col()] = value;
    }

    pub fn segment_count(&self) -> u64 {
        self.cells.iter().flatten().map(|&v| v as u64).sum()
    }
}
