//! Match id → battle engine map.
//!
//! Each engine sits behind its own async mutex: commands for one match are
//! serialized while unrelated matches proceed concurrently. The map lock is
//! only held long enough to clone the `Arc`. Finished matches are kept.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::info;
use tokio::sync::Mutex as AsyncMutex;

use crate::core::{BattleEngine, GameError, MatchId, PlayerIndex, MAX_PLAYERS};

/// Handle to one match; lock it to read or mutate the engine.
pub type SharedMatch = Arc<AsyncMutex<BattleEngine>>;

#[derive(Default)]
pub struct MatchRegistry {
    matches: Mutex<HashMap<MatchId, SharedMatch>>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The match for `match_id`, created empty if unknown.
    pub fn get_or_create(&self, match_id: MatchId) -> SharedMatch {
        let mut matches = self.lock();
        matches
            .entry(match_id)
            .or_insert_with(|| {
                info!("match {} created", match_id);
                Arc::new(AsyncMutex::new(BattleEngine::new(match_id)))
            })
            .clone()
    }

    pub fn get(&self, match_id: MatchId) -> Result<SharedMatch, GameError> {
        self.lock()
            .get(&match_id)
            .cloned()
            .ok_or(GameError::NoSuchMatch { id: match_id })
    }

    /// Create `match_id` with both seats reserved for `players`. An existing
    /// match under the same id is left untouched.
    pub fn reserve(&self, match_id: MatchId, players: [PlayerIndex; MAX_PLAYERS]) -> SharedMatch {
        let mut matches = self.lock();
        matches
            .entry(match_id)
            .or_insert_with(|| {
                info!(
                    "match {} created for players {} and {}",
                    match_id, players[0], players[1]
                );
                Arc::new(AsyncMutex::new(BattleEngine::with_reserved_seats(
                    match_id, players,
                )))
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<MatchId, SharedMatch>> {
        self.matches.lock().unwrap_or_else(|e| e.into_inner())
    }
}
