//! Wire envelope: commands sent by clients and messages sent by the server.
//!
//! Payload DTOs mirror what clients send and are converted into validated
//! domain types exactly once, here, before they reach the dispatcher.

use serde::{Deserialize, Serialize};

use crate::core::{
    Fleet, GameError, MatchId, Orientation, PlayerIndex, Position, Ship, ShipClass,
};
use crate::identity::{PlayerProfile, WinnerEntry};
use crate::lobby::RoomSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionDto {
    pub x: i32,
    pub y: i32,
}

impl From<Position> for PositionDto {
    fn from(pos: Position) -> Self {
        PositionDto {
            x: pos.x as i32,
            y: pos.y as i32,
        }
    }
}

impl TryFrom<PositionDto> for Position {
    type Error = GameError;

    fn try_from(dto: PositionDto) -> Result<Self, Self::Error> {
        Position::from_signed(dto.x, dto.y)
    }
}

/// A ship as placed by a client. `direction == true` means vertical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipDto {
    pub position: PositionDto,
    pub direction: bool,
    pub length: i32,
    #[serde(rename = "type")]
    pub class: ShipClass,
}

impl TryFrom<&ShipDto> for Ship {
    type Error = GameError;

    fn try_from(dto: &ShipDto) -> Result<Self, Self::Error> {
        let origin = Position::try_from(dto.position)?;
        let length = usize::try_from(dto.length)
            .map_err(|_| GameError::Validation(format!("negative ship length {}", dto.length)))?;
        Ship::new(
            dto.class,
            Orientation::from_direction(dto.direction),
            origin,
            length,
        )
    }
}

impl From<&Ship> for ShipDto {
    fn from(ship: &Ship) -> Self {
        ShipDto {
            position: ship.origin().into(),
            direction: ship.orientation().is_vertical(),
            length: ship.length() as i32,
            class: ship.class(),
        }
    }
}

/// Validate a client fleet into a domain [`Fleet`].
pub fn fleet_from_dtos(ships: &[ShipDto]) -> Result<Fleet, GameError> {
    let ships = ships
        .iter()
        .map(Ship::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Fleet::new(ships)
}

pub fn fleet_to_dtos(fleet: &Fleet) -> Vec<ShipDto> {
    fleet.ships().iter().map(ShipDto::from).collect()
}

/// Status carried by an `attack` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackStatus {
    Miss,
    Shot,
    Killed,
}

/// Commands accepted from clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientCommand {
    /// Log in, registering the name on first use.
    Reg { name: String, password: String },
    CreateRoom,
    AddUserToRoom { index_room: u32 },
    AddShips {
        game_id: MatchId,
        index_player: PlayerIndex,
        ships: Vec<ShipDto>,
    },
    Attack {
        game_id: MatchId,
        index_player: PlayerIndex,
        x: i32,
        y: i32,
    },
    RandomAttack {
        game_id: MatchId,
        index_player: PlayerIndex,
    },
}

impl ClientCommand {
    /// Wire name of the command kind, for logs and error replies.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientCommand::Reg { .. } => "reg",
            ClientCommand::CreateRoom => "create_room",
            ClientCommand::AddUserToRoom { .. } => "add_user_to_room",
            ClientCommand::AddShips { .. } => "add_ships",
            ClientCommand::Attack { .. } => "attack",
            ClientCommand::RandomAttack { .. } => "random_attack",
        }
    }
}

/// Messages pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerMessage {
    /// Login reply. On failure `error` is set and `index` is meaningless.
    Reg {
        name: String,
        index: PlayerIndex,
        error: bool,
        error_text: String,
    },
    /// Rooms waiting for a second player.
    UpdateRoom(Vec<RoomSummary>),
    CreateGame {
        id_game: MatchId,
        id_player: PlayerIndex,
    },
    /// Personalized: `ships` is the receiver's own fleet.
    StartGame {
        ships: Vec<ShipDto>,
        current_player_index: PlayerIndex,
    },
    Turn { current_player: PlayerIndex },
    Attack {
        position: PositionDto,
        current_player: PlayerIndex,
        status: AttackStatus,
    },
    Finish { win_player: PlayerIndex },
    UpdateWinners(Vec<WinnerEntry>),
    /// Rejection of the receiver's last command.
    Error { reason: String },
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Reg { .. } => "reg",
            ServerMessage::UpdateRoom(_) => "update_room",
            ServerMessage::CreateGame { .. } => "create_game",
            ServerMessage::StartGame { .. } => "start_game",
            ServerMessage::Turn { .. } => "turn",
            ServerMessage::Attack { .. } => "attack",
            ServerMessage::Finish { .. } => "finish",
            ServerMessage::UpdateWinners(_) => "update_winners",
            ServerMessage::Error { .. } => "error",
        }
    }

    pub fn reg_ok(profile: &PlayerProfile) -> Self {
        ServerMessage::Reg {
            name: profile.name.clone(),
            index: profile.index,
            error: false,
            error_text: String::new(),
        }
    }

    pub fn reg_failed(name: &str, reason: &str) -> Self {
        ServerMessage::Reg {
            name: name.to_string(),
            index: 0,
            error: true,
            error_text: reason.to_string(),
        }
    }
}
