use std::fmt::Display;

use super::{Coordinate, GRID_SIZE};

/// What an attacker knows about one cell of the opposing board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Mark {
    #[default]
    Unknown,
    Hit,
    Miss,
}

impl Mark {
    fn symbol(self) -> char {
        match self {
            Mark::Unknown => '.',
            Mark::Hit => 'X',
            Mark::Miss => 'O',
        }
    }
}

/// Opponent-visible picture of a board, built only from reported outcomes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoardView {
    marks: [[Mark; GRID_SIZE]; GRID_SIZE],
}

impl BoardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, at: Coordinate) -> Mark {
        self.marks[at.row()][at.col()]
    }

    pub(crate) fn mark(&mut self, at: Coordinate, mark: Mark) {
        self.marks[at.row()][at.col()] = mark;
    }

    pub fn unknown_cells(&self) -> impl Iterator<Item = Coordinate> + '_ {
        Coordinate::all().filter(|&at| self.get(at) == Mark::Unknown)
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.marks.iter().flatten().filter(|&&m| m == mark).count()
    }
}

impl Display for BoardView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header: Vec<String> = (1..=GRID_SIZE).map(|c| c.to_string()).collect();
        writeln!(f, "   {}", header.join(" "))?;
        for (r, row) in self.marks.iter().enumerate() {
            let cells: Vec<String> = row.iter().map(|m| m.symbol().to_string()).collect();
            writeln!(f, "{} |{}|", (b'A' + r as u8) as char, cells.join("|"))?;
        }
        Ok(())
    }
}
