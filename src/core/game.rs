//! Rules engine for one match: two seats, turn order, attack resolution and
//! win detection.

use log::{debug, info};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::core::board::Board;
use crate::core::common::{GameError, MatchId, PlayerIndex, Position};
use crate::core::config::MAX_PLAYERS;
use crate::core::ship::{Fleet, Ship};

/// Lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    AwaitingPlayers,
    /// Both fleets placed, turn order not fixed yet.
    Ready,
    InProgress,
    Finished,
}

/// One seat: the player, their fleet, and the attacks they received.
#[derive(Debug, Clone)]
pub struct GamePlayer {
    index: PlayerIndex,
    fleet: Fleet,
    board: Board,
}

impl GamePlayer {
    fn new(index: PlayerIndex, fleet: Fleet) -> Self {
        let board = Board::for_fleet(&fleet);
        Self {
            index,
            fleet,
            board,
        }
    }

    pub fn index(&self) -> PlayerIndex {
        self.index
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Every ship of this player is fully `Killed` on their own board.
    pub fn fleet_destroyed(&self) -> bool {
        self.fleet
            .ships()
            .iter()
            .all(|ship| ship.is_killed(&self.board))
    }
}

/// Returned by [`BattleEngine::begin`].
#[derive(Debug, Clone)]
pub struct MatchStart {
    pub match_id: MatchId,
    /// Seats in submission order with their own fleets.
    pub seats: Vec<(PlayerIndex, Fleet)>,
    pub first_turn: PlayerIndex,
}

/// Result of one attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackOutcome {
    /// Turn passed to the defender.
    Miss { next_turn: PlayerIndex },
    Hit,
    /// The attack completed `ship`; `missed_cells` are the swept ring cells.
    Killed {
        ship: Ship,
        missed_cells: Vec<Position>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
    pub attacker: PlayerIndex,
    pub target: Position,
    pub outcome: AttackOutcome,
}

/// State machine for a single match.
#[derive(Debug)]
pub struct BattleEngine {
    match_id: MatchId,
    seats: Vec<GamePlayer>,
    reserved: Option<[PlayerIndex; MAX_PLAYERS]>,
    phase: MatchPhase,
    first_turn: Option<PlayerIndex>,
    current_turn: Option<PlayerIndex>,
    winner: Option<PlayerIndex>,
}

impl BattleEngine {
    /// An empty match accepting any two players.
    pub fn new(match_id: MatchId) -> Self {
        Self {
            match_id,
            seats: Vec::with_capacity(MAX_PLAYERS),
            reserved: None,
            phase: MatchPhase::AwaitingPlayers,
            first_turn: None,
            current_turn: None,
            winner: None,
        }
    }

    /// An empty match that only seats the two given players.
    pub fn with_reserved_seats(match_id: MatchId, players: [PlayerIndex; MAX_PLAYERS]) -> Self {
        Self {
            reserved: Some(players),
            ..Self::new(match_id)
        }
    }

    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn current_turn(&self) -> Option<PlayerIndex> {
        self.current_turn
    }

    pub fn winner(&self) -> Option<PlayerIndex> {
        self.winner
    }

    /// Seated player indices in submission order.
    pub fn seat_indices(&self) -> Vec<PlayerIndex> {
        self.seats.iter().map(|p| p.index).collect()
    }

    pub fn player(&self, index: PlayerIndex) -> Option<&GamePlayer> {
        self.seats.iter().find(|p| p.index == index)
    }

    fn seat_of(&self, index: PlayerIndex) -> Result<usize, GameError> {
        self.seats
            .iter()
            .position(|p| p.index == index)
            .ok_or(GameError::NoSuchPlayer { player: index })
    }

    /// Seat position of `index`'s opponent.
    fn defender_seat(&self, attacker: PlayerIndex) -> Result<usize, GameError> {
        let attacker_seat = self.seat_of(attacker)?;
        if self.seats.len() < MAX_PLAYERS {
            return Err(GameError::NoSuchPlayer { player: attacker });
        }
        Ok(1 - attacker_seat)
    }

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        match self.phase {
            MatchPhase::InProgress => Ok(()),
            MatchPhase::Finished => Err(GameError::MatchFinished),
            MatchPhase::AwaitingPlayers | MatchPhase::Ready => Err(GameError::NotReady),
        }
    }

    /// Seat a player's fleet. Returns `true` once both fleets are present.
    pub fn submit_fleet(&mut self, player: PlayerIndex, fleet: Fleet) -> Result<bool, GameError> {
        if self.player(player).is_some() {
            return Err(GameError::DuplicateSubmission { player });
        }
        if let Some(reserved) = self.reserved {
            if !reserved.contains(&player) {
                return Err(GameError::NoSuchPlayer { player });
            }
        }
        if self.seats.len() >= MAX_PLAYERS {
            return Err(GameError::MatchFull);
        }

        if self.seats.is_empty() {
            self.first_turn = Some(player);
        }
        self.seats.push(GamePlayer::new(player, fleet));
        debug!(
            "match {}: player {} placed {} ships",
            self.match_id,
            player,
            self.seats.last().map(|p| p.fleet.ships().len()).unwrap_or(0)
        );

        let ready = self.seats.len() == MAX_PLAYERS;
        if ready {
            self.phase = MatchPhase::Ready;
        }
        Ok(ready)
    }

    /// Fix the turn order and start the match. Only valid from `Ready`.
    pub fn begin(&mut self) -> Result<MatchStart, GameError> {
        if self.phase != MatchPhase::Ready {
            return Err(GameError::NotReady);
        }
        let first_turn = self.first_turn.ok_or(GameError::NotReady)?;
        self.current_turn = Some(first_turn);
        self.phase = MatchPhase::InProgress;
        info!(
            "match {} started, player {} moves first",
            self.match_id, first_turn
        );
        Ok(MatchStart {
            match_id: self.match_id,
            seats: self
                .seats
                .iter()
                .map(|p| (p.index, p.fleet.clone()))
                .collect(),
            first_turn,
        })
    }

    /// Resolve `attacker`'s shot at `target` on the opponent's board.
    pub fn attack(
        &mut self,
        attacker: PlayerIndex,
        target: Position,
    ) -> Result<AttackReport, GameError> {
        self.ensure_in_progress()?;
        let defender_seat = self.defender_seat(attacker)?;
        let current = self.current_turn.ok_or(GameError::NotReady)?;
        if attacker != current {
            return Err(GameError::NotYourTurn { current });
        }

        let defender = &mut self.seats[defender_seat];
        let was_hit = defender.board.mark_attack(target)?;

        let outcome = if !was_hit {
            let next_turn = self.switch_turn()?;
            AttackOutcome::Miss { next_turn }
        } else {
            let ship = *defender.fleet.ship_at(target).ok_or_else(|| {
                GameError::Validation(format!("no ship recorded at {}", target))
            })?;
            if ship.is_fully_shot(&defender.board) {
                defender.board.mark_killed(&ship);
                let missed_cells = defender.board.sweep_around(&ship);
                AttackOutcome::Killed { ship, missed_cells }
            } else {
                AttackOutcome::Hit
            }
        };

        debug!(
            "match {}: player {} attacked {} -> {:?}",
            self.match_id, attacker, target, outcome
        );
        Ok(AttackReport {
            attacker,
            target,
            outcome,
        })
    }

    /// Hand the turn to the other seat.
    pub fn switch_turn(&mut self) -> Result<PlayerIndex, GameError> {
        let current = self.current_turn.ok_or(GameError::NotReady)?;
        let next = self.seats[self.defender_seat(current)?].index;
        self.current_turn = Some(next);
        Ok(next)
    }

    /// The winner, if one seat's fleet is fully destroyed.
    ///
    /// Seats are checked in order, so if both fleets were somehow destroyed
    /// the first seat wins. Once a winner is recorded it never changes.
    pub fn check_winner(&mut self) -> Option<PlayerIndex> {
        if self.winner.is_some() {
            return self.winner;
        }
        if self.seats.len() < MAX_PLAYERS {
            return None;
        }
        let winner = self
            .seats
            .iter()
            .enumerate()
            .find(|(seat, _)| self.seats[1 - seat].fleet_destroyed())
            .map(|(_, player)| player.index)?;

        self.winner = Some(winner);
        self.phase = MatchPhase::Finished;
        info!("match {} finished, player {} wins", self.match_id, winner);
        Some(winner)
    }

    /// A uniformly random still-empty cell on `attacker`'s opponent's board.
    pub fn random_target<R: Rng>(
        &self,
        attacker: PlayerIndex,
        rng: &mut R,
    ) -> Result<Position, GameError> {
        self.ensure_in_progress()?;
        let defender = &self.seats[self.defender_seat(attacker)?];
        defender
            .board
            .empty_cells()
            .choose(rng)
            .copied()
            .ok_or_else(|| GameError::Validation("no cells left to attack".into()))
    }
}
