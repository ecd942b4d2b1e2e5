//! Common types for the battleship server: coordinates, ids and game errors.

use core::fmt;

use crate::core::bitboard::BitBoardError;

/// Player identity index assigned by the player directory.
pub type PlayerIndex = u32;

/// Match identifier; equal to the id of the room that created it.
pub type MatchId = u32;

/// A grid coordinate. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Convert signed client coordinates, rejecting negatives.
    /// Upper bounds are checked by the board.
    pub fn from_signed(x: i32, y: i32) -> Result<Self, GameError> {
        if x < 0 || y < 0 {
            return Err(GameError::OutOfBounds {
                x: x as i64,
                y: y as i64,
            });
        }
        Ok(Self::new(x as usize, y as usize))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Errors returned by rules-engine, registry, lobby and dispatcher operations.
///
/// Every variant rejects a single command without touching match state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Malformed or inconsistent command payload.
    Validation(String),
    /// Coordinate outside the 10×10 grid.
    OutOfBounds { x: i64, y: i64 },
    /// The targeted cell was already attacked.
    CellAlreadyTargeted { x: usize, y: usize },
    /// Attack sent by the player who does not hold the turn.
    NotYourTurn { current: PlayerIndex },
    /// Match has not started (fleets missing or turn order not set).
    NotReady,
    /// Match already has a winner.
    MatchFinished,
    /// This player already submitted a fleet for the match.
    DuplicateSubmission { player: PlayerIndex },
    /// Both seats already hold other players.
    MatchFull,
    /// Player is not seated in the match.
    NoSuchPlayer { player: PlayerIndex },
    NoSuchMatch { id: MatchId },
    NoSuchRoom { id: u32 },
    RoomFull,
    /// Connection has not logged in.
    Unauthenticated,
    /// Random fleet generation gave up.
    UnableToPlaceFleet,
}

impl From<BitBoardError> for GameError {
    fn from(err: BitBoardError) -> Self {
        match err {
            BitBoardError::IndexOutOfBounds { x, y } => GameError::OutOfBounds {
                x: x as i64,
                y: y as i64,
            },
            BitBoardError::SizeTooLarge { .. } => GameError::Validation(err.to_string()),
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Validation(reason) => write!(f, "Invalid command: {}", reason),
            GameError::OutOfBounds { x, y } => write!(f, "Cell ({}, {}) is outside the board", x, y),
            GameError::CellAlreadyTargeted { x, y } => {
                write!(f, "Cell ({}, {}) was already attacked", x, y)
            }
            GameError::NotYourTurn { current } => {
                write!(f, "It is player {}'s turn", current)
            }
            GameError::NotReady => write!(f, "Game is not ready"),
            GameError::MatchFinished => write!(f, "Game is already finished"),
            GameError::DuplicateSubmission { player } => {
                write!(f, "Player {} already placed ships", player)
            }
            GameError::MatchFull => write!(f, "Game already has two players"),
            GameError::NoSuchPlayer { player } => {
                write!(f, "Player {} is not part of this game", player)
            }
            GameError::NoSuchMatch { id } => write!(f, "Game {} does not exist", id),
            GameError::NoSuchRoom { id } => write!(f, "Room {} does not exist", id),
            GameError::RoomFull => write!(f, "Room is full"),
            GameError::Unauthenticated => write!(f, "Connection is not logged in"),
            GameError::UnableToPlaceFleet => write!(f, "Unable to place fleet"),
        }
    }
}

impl std::error::Error for GameError {}
