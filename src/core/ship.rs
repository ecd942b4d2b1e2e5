//! Ship geometry and fleet validation.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::board::{Board, CellState};
use crate::core::common::{GameError, Position};
use crate::core::config::{BOARD_SIZE, MAX_SHIP_LENGTH, STANDARD_FLEET};
use crate::core::Grid;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Cells extend along `x`.
    Horizontal,
    /// Cells extend along `y`.
    Vertical,
}

impl Orientation {
    /// Wire flag: `true` means vertical.
    pub fn from_direction(vertical: bool) -> Self {
        if vertical {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    pub fn is_vertical(self) -> bool {
        self == Orientation::Vertical
    }
}

/// Ship class as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipClass {
    Small,
    Medium,
    Large,
    Huge,
}

impl ShipClass {
    pub const fn length(self) -> usize {
        match self {
            ShipClass::Small => 1,
            ShipClass::Medium => 2,
            ShipClass::Large => 3,
            ShipClass::Huge => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShipClass::Small => "small",
            ShipClass::Medium => "medium",
            ShipClass::Large => "large",
            ShipClass::Huge => "huge",
        }
    }
}

/// A ship placed on the board. Immutable once constructed.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ship {
    origin: Position,
    orientation: Orientation,
    length: usize,
    class: ShipClass,
    mask: Grid,
}

impl Ship {
    /// Place a ship of `class` at `origin`. `length` must match the class and
    /// every cell must lie on the board.
    pub fn new(
        class: ShipClass,
        orientation: Orientation,
        origin: Position,
        length: usize,
    ) -> Result<Self, GameError> {
        if length == 0 || length > MAX_SHIP_LENGTH {
            return Err(GameError::Validation(format!(
                "ship length {} is outside 1..={}",
                length, MAX_SHIP_LENGTH
            )));
        }
        if length != class.length() {
            return Err(GameError::Validation(format!(
                "a {} ship must have length {}, got {}",
                class.name(),
                class.length(),
                length
            )));
        }
        let (end_x, end_y) = match orientation {
            Orientation::Horizontal => (origin.x + length - 1, origin.y),
            Orientation::Vertical => (origin.x, origin.y + length - 1),
        };
        if end_x >= BOARD_SIZE || end_y >= BOARD_SIZE {
            return Err(GameError::OutOfBounds {
                x: end_x as i64,
                y: end_y as i64,
            });
        }

        let cells = (0..length).map(|i| step(origin, orientation, i));
        let mask = Grid::from_positions(cells)?;
        Ok(Ship {
            origin,
            orientation,
            length,
            class,
            mask,
        })
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn class(&self) -> ShipClass {
        self.class
    }

    /// Occupancy mask of the ship on the board.
    pub fn mask(&self) -> Grid {
        self.mask
    }

    /// `true` iff `pos` is one of the ship's cells.
    pub fn occupies_cell(&self, pos: Position) -> bool {
        self.mask.get(pos).unwrap_or(false)
    }

    /// Occupied cells, origin to end.
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.length).map(move |i| step(self.origin, self.orientation, i))
    }

    /// States of the occupied cells on `board`, origin to end.
    pub fn cell_states(&self, board: &Board) -> Vec<CellState> {
        self.cells()
            .filter_map(|pos| board.cell_state(pos).ok())
            .collect()
    }

    /// Every cell hit, not yet converted to `killed`.
    pub fn is_fully_shot(&self, board: &Board) -> bool {
        self.cell_states(board).iter().all(|s| *s == CellState::Shot)
    }

    pub fn is_killed(&self, board: &Board) -> bool {
        self.cell_states(board).iter().all(|s| *s == CellState::Killed)
    }
}

fn step(origin: Position, orientation: Orientation, i: usize) -> Position {
    match orientation {
        Orientation::Horizontal => Position::new(origin.x + i, origin.y),
        Orientation::Vertical => Position::new(origin.x, origin.y + i),
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ class: {}, origin: {}, orientation: {:?}, length: {} }}",
            self.class.name(),
            self.origin,
            self.orientation,
            self.length,
        )
    }
}

/// The validated set of ships one player placed before the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fleet {
    ships: Vec<Ship>,
    occupancy: Grid,
}

impl Fleet {
    /// Validate a fleet: non-empty, no two ships overlapping or touching.
    pub fn new(ships: Vec<Ship>) -> Result<Self, GameError> {
        if ships.is_empty() {
            return Err(GameError::Validation("fleet is empty".into()));
        }
        let mut occupancy = Grid::new();
        let mut blocked = Grid::new();
        for ship in &ships {
            if !(blocked & ship.mask()).is_empty() {
                return Err(GameError::Validation(format!(
                    "ship at {} overlaps or touches another ship",
                    ship.origin()
                )));
            }
            occupancy |= ship.mask();
            blocked |= ship.mask() | ship.mask().halo();
        }
        Ok(Fleet { ships, occupancy })
    }

    /// A standard fleet placed at random, ships never touching.
    pub fn random<R: Rng>(rng: &mut R) -> Result<Self, GameError> {
        for _ in 0..20 {
            if let Some(ships) = random_layout(rng) {
                return Fleet::new(ships);
            }
        }
        Err(GameError::UnableToPlaceFleet)
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Cells covered by any ship.
    pub fn occupancy(&self) -> Grid {
        self.occupancy
    }

    /// Ship covering `pos`, if any.
    pub fn ship_at(&self, pos: Position) -> Option<&Ship> {
        self.ships.iter().find(|ship| ship.occupies_cell(pos))
    }
}

fn random_layout<R: Rng>(rng: &mut R) -> Option<Vec<Ship>> {
    let mut ships = Vec::new();
    let mut blocked = Grid::new();
    for (class, count) in STANDARD_FLEET {
        for _ in 0..count {
            let ship = random_placement(rng, class, blocked)?;
            blocked |= ship.mask() | ship.mask().halo();
            ships.push(ship);
        }
    }
    Some(ships)
}

/// A random placement of `class` that avoids `blocked`, or `None` after 100 tries.
fn random_placement<R: Rng>(rng: &mut R, class: ShipClass, blocked: Grid) -> Option<Ship> {
    let len = class.length();
    for _ in 0..100 {
        let orientation = Orientation::from_direction(rng.random());
        let (max_x, max_y) = match orientation {
            Orientation::Horizontal => (BOARD_SIZE - len, BOARD_SIZE - 1),
            Orientation::Vertical => (BOARD_SIZE - 1, BOARD_SIZE - len),
        };
        let origin = Position::new(rng.random_range(0..=max_x), rng.random_range(0..=max_y));
        let ship = Ship::new(class, orientation, origin, len).ok()?;
        if (blocked & ship.mask()).is_empty() {
            return Some(ship);
        }
    }
    None
}
