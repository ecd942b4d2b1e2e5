//! Connection bookkeeping and ordered message fan-out.
//!
//! Each live connection owns an unbounded outbox drained by its writer task,
//! so delivering never blocks the caller and a stalled socket only delays
//! itself. Business logic never iterates connections: it builds a list of
//! [`Delivery`] values with the planners below and hands it to
//! [`SessionRouter::deliver`], which executes them strictly in order.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use log::debug;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::core::{AttackOutcome, AttackReport, GameError, MatchStart, PlayerIndex};
use crate::identity::{PlayerProfile, WinnerEntry};
use crate::protocol::{fleet_to_dtos, AttackStatus, PositionDto, ServerMessage};

/// Opaque id of one transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Who receives a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Every connection bound to one of these players.
    Players(Vec<PlayerIndex>),
    /// Every logged-in connection.
    Authenticated,
    Connection(ConnectionId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub audience: Audience,
    pub message: ServerMessage,
}

impl Delivery {
    pub fn to_players(players: &[PlayerIndex], message: ServerMessage) -> Self {
        Delivery {
            audience: Audience::Players(players.to_vec()),
            message,
        }
    }

    pub fn to_authenticated(message: ServerMessage) -> Self {
        Delivery {
            audience: Audience::Authenticated,
            message,
        }
    }
}

struct Connection {
    player: Option<PlayerProfile>,
    outbox: UnboundedSender<ServerMessage>,
}

/// Maps live connections to logged-in players and delivers messages to them.
pub struct SessionRouter {
    connections: Mutex<BTreeMap<ConnectionId, Connection>>,
    next_id: AtomicU64,
}

impl Default for SessionRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRouter {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new connection and return its id and outbox receiver.
    pub fn connect(&self) -> (ConnectionId, UnboundedReceiver<ServerMessage>) {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (outbox, rx) = mpsc::unbounded_channel();
        self.lock().insert(
            id,
            Connection {
                player: None,
                outbox,
            },
        );
        (id, rx)
    }

    /// Bind `conn` to a logged-in player, replacing any previous binding.
    pub fn bind(&self, conn: ConnectionId, profile: PlayerProfile) -> Result<(), GameError> {
        let mut connections = self.lock();
        let entry = connections
            .get_mut(&conn)
            .ok_or(GameError::Unauthenticated)?;
        entry.player = Some(profile);
        Ok(())
    }

    /// Player bound to `conn`.
    pub fn resolve_player(&self, conn: ConnectionId) -> Result<PlayerProfile, GameError> {
        self.lock()
            .get(&conn)
            .and_then(|c| c.player.clone())
            .ok_or(GameError::Unauthenticated)
    }

    /// Forget `conn`, returning the player it was bound to.
    pub fn disconnect(&self, conn: ConnectionId) -> Option<PlayerProfile> {
        self.lock().remove(&conn).and_then(|c| c.player)
    }

    /// `true` if any live connection is bound to `player`.
    pub fn is_bound(&self, player: PlayerIndex) -> bool {
        self.lock()
            .values()
            .any(|c| c.player.as_ref().is_some_and(|p| p.index == player))
    }

    pub fn connection_count(&self) -> usize {
        self.lock().len()
    }

    pub fn send_to(&self, conn: ConnectionId, message: ServerMessage) -> bool {
        match self.lock().get(&conn) {
            Some(c) => push(conn, &c.outbox, message),
            None => false,
        }
    }

    /// Deliver one copy of `message` to every connection bound to one of
    /// `players`. Returns the number of outboxes reached.
    pub fn publish(&self, players: &[PlayerIndex], message: &ServerMessage) -> usize {
        let connections = self.lock();
        let mut reached = 0;
        for (id, c) in connections.iter() {
            let addressed = c
                .player
                .as_ref()
                .is_some_and(|p| players.contains(&p.index));
            if addressed && push(*id, &c.outbox, message.clone()) {
                reached += 1;
            }
        }
        reached
    }

    /// Deliver `message` to every logged-in connection.
    pub fn broadcast_authenticated(&self, message: &ServerMessage) -> usize {
        let connections = self.lock();
        let mut reached = 0;
        for (id, c) in connections.iter() {
            if c.player.is_some() && push(*id, &c.outbox, message.clone()) {
                reached += 1;
            }
        }
        reached
    }

    /// Execute `deliveries` in order.
    pub fn deliver(&self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            let reached = match &delivery.audience {
                Audience::Players(players) => self.publish(players, &delivery.message),
                Audience::Authenticated => self.broadcast_authenticated(&delivery.message),
                Audience::Connection(conn) => {
                    usize::from(self.send_to(*conn, delivery.message.clone()))
                }
            };
            debug!(
                "delivered {} to {:?} ({} connections)",
                delivery.message.kind(),
                delivery.audience,
                reached
            );
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<ConnectionId, Connection>> {
        self.connections.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn push(conn: ConnectionId, outbox: &UnboundedSender<ServerMessage>, message: ServerMessage) -> bool {
    match outbox.send(message) {
        Ok(()) => true,
        Err(_) => {
            debug!("{} outbox closed, message dropped", conn);
            false
        }
    }
}

/// Personalized `start_game` per seat, then one `turn` to both.
pub fn start_deliveries(start: &MatchStart) -> Vec<Delivery> {
    let seats: Vec<PlayerIndex> = start.seats.iter().map(|(p, _)| *p).collect();
    let mut deliveries: Vec<Delivery> = start
        .seats
        .iter()
        .map(|(player, fleet)| {
            Delivery::to_players(
                &[*player],
                ServerMessage::StartGame {
                    ships: fleet_to_dtos(fleet),
                    current_player_index: *player,
                },
            )
        })
        .collect();
    deliveries.push(Delivery::to_players(
        &seats,
        ServerMessage::Turn {
            current_player: start.first_turn,
        },
    ));
    deliveries
}

/// Primary `attack` to both seats, then swept misses (after a kill) or the
/// post-switch `turn` (after a miss).
pub fn attack_deliveries(seats: &[PlayerIndex], report: &AttackReport) -> Vec<Delivery> {
    let attack = |position: PositionDto, status: AttackStatus| {
        Delivery::to_players(
            seats,
            ServerMessage::Attack {
                position,
                current_player: report.attacker,
                status,
            },
        )
    };
    let target = PositionDto::from(report.target);

    match &report.outcome {
        AttackOutcome::Hit => vec![attack(target, AttackStatus::Shot)],
        AttackOutcome::Miss { next_turn } => vec![
            attack(target, AttackStatus::Miss),
            Delivery::to_players(
                seats,
                ServerMessage::Turn {
                    current_player: *next_turn,
                },
            ),
        ],
        AttackOutcome::Killed { missed_cells, .. } => {
            let mut deliveries = vec![attack(target, AttackStatus::Killed)];
            deliveries.extend(
                missed_cells
                    .iter()
                    .map(|pos| attack(PositionDto::from(*pos), AttackStatus::Miss)),
            );
            deliveries
        }
    }
}

/// `finish` to both seats, then the leaderboard to everyone logged in.
pub fn finish_deliveries(
    seats: &[PlayerIndex],
    winner: PlayerIndex,
    winners: Vec<WinnerEntry>,
) -> Vec<Delivery> {
    vec![
        Delivery::to_players(seats, ServerMessage::Finish { win_player: winner }),
        Delivery::to_authenticated(ServerMessage::UpdateWinners(winners)),
    ]
}
