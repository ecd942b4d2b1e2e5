//! Attack-state grid for one player's defended side.
//!
//! The grid is kept as bit layers rather than a cell array: the player's
//! ship occupancy plus one layer per non-empty [`CellState`]. A cell is in at
//! most one of the `shot`, `miss` and `killed` layers.

use core::fmt;

use crate::core::common::{GameError, Position};
use crate::core::ship::{Fleet, Ship};
use crate::core::Grid;

/// State of one cell as seen by the attacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Empty,
    /// Ship cell hit, ship still afloat.
    Shot,
    Miss,
    /// Cell of a sunk ship.
    Killed,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    ships: Grid,
    shot: Grid,
    miss: Grid,
    killed: Grid,
}

impl Board {
    /// A fresh board defending `fleet`; every cell starts `Empty`.
    pub fn for_fleet(fleet: &Fleet) -> Self {
        Board {
            ships: fleet.occupancy(),
            shot: Grid::new(),
            miss: Grid::new(),
            killed: Grid::new(),
        }
    }

    pub fn cell_state(&self, pos: Position) -> Result<CellState, GameError> {
        if self.killed.get(pos)? {
            Ok(CellState::Killed)
        } else if self.shot.get(pos)? {
            Ok(CellState::Shot)
        } else if self.miss.get(pos)? {
            Ok(CellState::Miss)
        } else {
            Ok(CellState::Empty)
        }
    }

    /// Cells never attacked nor swept.
    pub fn empty_mask(&self) -> Grid {
        !(self.shot | self.miss | self.killed)
    }

    /// Still-`Empty` cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Position> {
        self.empty_mask().iter_set_bits().collect()
    }

    /// Record an attack at `pos`. Returns `true` on a ship hit.
    pub fn mark_attack(&mut self, pos: Position) -> Result<bool, GameError> {
        if self.cell_state(pos)? != CellState::Empty {
            return Err(GameError::CellAlreadyTargeted { x: pos.x, y: pos.y });
        }
        if self.ships.get(pos)? {
            self.shot.set(pos)?;
            Ok(true)
        } else {
            self.miss.set(pos)?;
            Ok(false)
        }
    }

    /// Turn every cell of `ship` into `Killed`.
    pub fn mark_killed(&mut self, ship: &Ship) {
        let mask = ship.mask();
        self.shot &= !mask;
        self.killed |= mask;
    }

    /// Mark the still-empty ring around `ship` as misses and return those
    /// cells in row-major order.
    pub fn sweep_around(&mut self, ship: &Ship) -> Vec<Position> {
        let swept = ship.mask().halo() & self.empty_mask();
        self.miss |= swept;
        swept.iter_set_bits().collect()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Board {{\n  ships: {:?},\n  shot: {:?},\n  miss: {:?},\n  killed: {:?}\n}}",
            self.ships, self.shot, self.miss, self.killed
        )
    }
}
