//! Rooms where players wait for an opponent.
//!
//! A room's id doubles as the id of the match it creates once its second
//! seat is filled. Rooms are never renumbered; a room that lost its only
//! player simply stops being listed.

use std::collections::HashSet;
use std::sync::Mutex;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::{GameError, PlayerIndex, MAX_PLAYERS};
use crate::identity::PlayerProfile;

/// A room as listed in `update_room`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: u32,
    pub room_users: Vec<PlayerProfile>,
}

#[derive(Debug)]
struct Room {
    users: Vec<PlayerProfile>,
    started: bool,
}

#[derive(Debug, Default)]
struct LobbyState {
    rooms: Vec<Room>,
    seated: HashSet<PlayerIndex>,
}

#[derive(Debug, Default)]
pub struct RoomLobby {
    state: Mutex<LobbyState>,
}

impl RoomLobby {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a room for `player`. Ignored when the player already sits in one.
    /// Returns the new room id.
    pub fn create_room(&self, player: &PlayerProfile) -> Option<u32> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.seated.insert(player.index) {
            debug!("player {} already sits in a room", player.index);
            return None;
        }
        let room_id = state.rooms.len() as u32;
        state.rooms.push(Room {
            users: vec![player.clone()],
            started: false,
        });
        Some(room_id)
    }

    /// Seat `player` in `room_id`. Returns both seats when this fills the room.
    /// Ignored when the player already sits in a room.
    pub fn add_user_to_room(
        &self,
        player: &PlayerProfile,
        room_id: u32,
    ) -> Result<Option<[PlayerIndex; MAX_PLAYERS]>, GameError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let room = state
            .rooms
            .get(room_id as usize)
            .ok_or(GameError::NoSuchRoom { id: room_id })?;
        if room.started || room.users.len() >= MAX_PLAYERS {
            return Err(GameError::RoomFull);
        }
        if room.users.is_empty() {
            return Err(GameError::NoSuchRoom { id: room_id });
        }
        if !state.seated.insert(player.index) {
            debug!("player {} already sits in a room", player.index);
            return Ok(None);
        }

        let room = &mut state.rooms[room_id as usize];
        room.users.push(player.clone());
        if room.users.len() < MAX_PLAYERS {
            return Ok(None);
        }
        room.started = true;
        Ok(Some([room.users[0].index, room.users[1].index]))
    }

    /// Rooms with exactly one player.
    pub fn open_rooms(&self) -> Vec<RoomSummary> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .rooms
            .iter()
            .enumerate()
            .filter(|(_, room)| !room.started && room.users.len() == 1)
            .map(|(id, room)| RoomSummary {
                room_id: id as u32,
                room_users: room.users.clone(),
            })
            .collect()
    }

    /// Free `player`'s seat and close their room if its game never started.
    pub fn release(&self, player: PlayerIndex) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.seated.remove(&player);
        for room in state.rooms.iter_mut().filter(|r| !r.started) {
            room.users.retain(|u| u.index != player);
        }
    }
}
