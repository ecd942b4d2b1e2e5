use super::ship::ShipClass;

pub const BOARD_SIZE: usize = 10;

/// Seats per match.
pub const MAX_PLAYERS: usize = 2;

/// Longest ship accepted in a fleet.
pub const MAX_SHIP_LENGTH: usize = 4;

/// Standard fleet composition: class and how many of it.
pub const STANDARD_FLEET: [(ShipClass, usize); 4] = [
    (ShipClass::Huge, 1),
    (ShipClass::Large, 2),
    (ShipClass::Medium, 3),
    (ShipClass::Small, 4),
];

/// Total number of ship segments in the standard fleet.
pub const STANDARD_FLEET_CELLS: usize = 4 + 2 * 3 + 3 * 2 + 4;

/// Minimum length of a player name and of a password.
pub const MIN_CREDENTIAL_LEN: usize = 5;
