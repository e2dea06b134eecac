//! Ship placement onto a [`PlainGrid`] during setup.

use rand::{
    distributions::{Distribution, Standard},
    Rng,
};

use crate::board::{Coordinate, PlainGrid, GRID_SIZE};
use crate::error::{GameError, Result};

/// Carrier, battleship, cruiser and two destroyers.
pub const STANDARD_FLEET: [usize; 5] = [5, 4, 3, 2, 2];

/// Random placements tried per ship before giving up.
const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Distribution<Orientation> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Orientation {
        if rng.gen::<bool>() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

/// The cells a ship of `length` would occupy from `origin`, or `None` if it
/// runs off the grid.
fn ship_cells(origin: Coordinate, length: usize, orientation: Orientation) -> Option<Vec<Coordinate>> {
    (0..length)
        .map(|offset| match orientation {
            Orientation::Horizontal => Coordinate::new(origin.row(), origin.col() + offset),
            Orientation::Vertical => Coordinate::new(origin.row() + offset, origin.col()),
        })
        .collect::<Result<Vec<_>>>()
        .ok()
}

impl PlainGrid {
    /// Writes a ship, rejecting one that leaves the grid or overlaps another.
    pub fn place_ship(&mut self, origin: Coordinate, length: usize, orientation: Orientation) -> Result<()> {
        if length == 0 || length > GRID_SIZE {
            return Err(GameError::InvalidFleet(format!("ship length {length} does not fit the grid")));
        }
        let cells = ship_cells(origin, length, orientation).ok_or_else(|| {
            GameError::InvalidFleet(format!("a {length}-cell ship at {origin} leaves the grid"))
        })?;
        if let Some(&taken) = cells.iter().find(|&&at| self.get(at) == 1) {
            return Err(GameError::InvalidFleet(format!("ship at {origin} overlaps {taken}")));
        }
        for at in cells {
            self.set(at, 1);
        }
        Ok(())
    }
}

/// Checks that a fleet is non-empty and could fit on the grid.
pub fn validate_fleet(sizes: &[usize]) -> Result<()> {
    if sizes.is_empty() {
        return Err(GameError::InvalidFleet("the fleet has no ships".into()));
    }
    if let Some(&bad) = sizes.iter().find(|&&len| len == 0 || len > GRID_SIZE) {
        return Err(GameError::InvalidFleet(format!("ship length {bad} does not fit the grid")));
    }
    let segments: usize = sizes.iter().sum();
    if segments > GRID_SIZE * GRID_SIZE {
        return Err(GameError::InvalidFleet(format!("{segments} segments exceed the grid")));
    }
    Ok(())
}

/// Places each ship of `sizes` at a random origin and orientation.
pub fn random_grid<R: Rng + ?Sized>(sizes: &[usize], rng: &mut R) -> Result<PlainGrid> {
    validate_fleet(sizes)?;
    let mut grid = PlainGrid::new();
    'ships: for &length in sizes {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let origin = Coordinate::new(rng.gen_range(0..GRID_SIZE), rng.gen_range(0..GRID_SIZE))?;
            if grid.place_ship(origin, length, rng.gen()).is_ok() {
                continue 'ships;
            }
        }
        return Err(GameError::InvalidFleet(format!("could not place a ship of length {length}")));
    }
    Ok(grid)
}
