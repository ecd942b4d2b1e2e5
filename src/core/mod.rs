//! Battleship rules engine
//!
//! Pure game logic with no I/O: the grid bitsets, ship geometry, the
//! per-player attack board and the per-match state machine. Everything here
//! is synchronous; callers serialize access per match.

pub mod bitboard;
pub mod board;
pub mod common;
pub mod config;
pub mod game;
pub mod ship;

/// Bitboard covering one 10×10 playing grid.
pub type Grid = bitboard::BitBoard<u128, { config::BOARD_SIZE }>;

pub use bitboard::{BitBoard, BitBoardError};
pub use board::{Board, CellState};
pub use common::{GameError, MatchId, PlayerIndex, Position};
pub use config::*;
pub use game::{AttackOutcome, AttackReport, BattleEngine, GamePlayer, MatchPhase, MatchStart};
pub use ship::{Fleet, Orientation, Ship, ShipClass};
