//! In-memory player directory: credentials, indices and win counts.

use std::sync::Mutex;

use log::info;
use serde::{Deserialize, Serialize};

use crate::core::{GameError, PlayerIndex, MIN_CREDENTIAL_LEN};

/// Public identity of a logged-in player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub index: PlayerIndex,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerEntry {
    pub name: String,
    pub wins: u32,
}

/// Reasons a login is refused. Reported inside the `reg` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// Name or password shorter than the minimum.
    InvalidCredentials,
    WrongPassword,
}

impl core::fmt::Display for LoginError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LoginError::InvalidCredentials => write!(f, "invalid user data"),
            LoginError::WrongPassword => write!(f, "invalid user data"),
        }
    }
}

impl std::error::Error for LoginError {}

#[derive(Debug)]
struct PlayerRecord {
    name: String,
    password: String,
    wins: u32,
}

/// Player records indexed by registration order.
#[derive(Debug, Default)]
pub struct PlayerDirectory {
    players: Mutex<Vec<PlayerRecord>>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log in as `name`, registering it if unknown.
    pub fn login(&self, name: &str, password: &str) -> Result<PlayerProfile, LoginError> {
        if name.chars().count() < MIN_CREDENTIAL_LEN
            || password.chars().count() < MIN_CREDENTIAL_LEN
        {
            return Err(LoginError::InvalidCredentials);
        }
        let mut players = self.players.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(index) = players.iter().position(|p| p.name == name) {
            if players[index].password != password {
                return Err(LoginError::WrongPassword);
            }
            return Ok(PlayerProfile {
                name: name.to_string(),
                index: index as PlayerIndex,
            });
        }

        let index = players.len() as PlayerIndex;
        players.push(PlayerRecord {
            name: name.to_string(),
            password: password.to_string(),
            wins: 0,
        });
        info!("registered player {} as {}", name, index);
        Ok(PlayerProfile {
            name: name.to_string(),
            index,
        })
    }

    /// Add a win for `player`, returning the new total.
    pub fn record_win(&self, player: PlayerIndex) -> Result<u32, GameError> {
        let mut players = self.players.lock().unwrap_or_else(|e| e.into_inner());
        let record = players
            .get_mut(player as usize)
            .ok_or(GameError::NoSuchPlayer { player })?;
        record.wins += 1;
        Ok(record.wins)
    }

    /// Every known player with their win count, in registration order.
    pub fn list_winners(&self) -> Vec<WinnerEntry> {
        let players = self.players.lock().unwrap_or_else(|e| e.into_inner());
        players
            .iter()
            .map(|p| WinnerEntry {
                name: p.name.clone(),
                wins: p.wins,
            })
            .collect()
    }
}
