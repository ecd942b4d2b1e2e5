//! Scripted client that plays one full game.
//!
//! The bot logs in, takes a seat, places a random fleet and fires
//! `random_attack` whenever it holds the turn. It returns once the
//! leaderboard following `finish` arrives.

use anyhow::{anyhow, bail};
use log::{debug, info, warn};
use rand::Rng;

use crate::core::{Fleet, MatchId, PlayerIndex};
use crate::identity::WinnerEntry;
use crate::protocol::{fleet_to_dtos, AttackStatus, ClientCommand, ServerMessage};
use crate::transport::Transport;

/// How the bot finds an opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomChoice {
    /// Open a new room and wait in it.
    Create,
    Join(u32),
    /// Join the first room opened by someone else, or open one.
    Auto,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub name: String,
    pub password: String,
    pub room: RoomChoice,
}

/// Result of a finished game, seen from the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotOutcome {
    pub player: PlayerIndex,
    pub match_id: MatchId,
    pub winner: PlayerIndex,
    pub winners: Vec<WinnerEntry>,
    pub shots_fired: u32,
}

impl BotOutcome {
    pub fn won(&self) -> bool {
        self.winner == self.player
    }
}

pub async fn play<T, R>(transport: &mut T, config: &BotConfig, rng: &mut R) -> anyhow::Result<BotOutcome>
where
    T: Transport<ClientCommand, ServerMessage> + ?Sized,
    R: Rng + Send,
{
    transport
        .send(ClientCommand::Reg {
            name: config.name.clone(),
            password: config.password.clone(),
        })
        .await?;
    let player = match transport.recv().await? {
        ServerMessage::Reg {
            error: true,
            error_text,
            ..
        } => bail!("login refused: {}", error_text),
        ServerMessage::Reg { index, .. } => index,
        other => bail!("expected reg reply, got {}", other.kind()),
    };
    info!("{} logged in as player {}", config.name, player);

    let mut seated = false;
    let mut match_id: Option<MatchId> = None;
    let mut winner: Option<PlayerIndex> = None;
    let mut shots_fired = 0u32;

    if let RoomChoice::Join(room) = config.room {
        transport
            .send(ClientCommand::AddUserToRoom { index_room: room })
            .await?;
        seated = true;
    } else if config.room == RoomChoice::Create {
        transport.send(ClientCommand::CreateRoom).await?;
        seated = true;
    }

    loop {
        let message = transport.recv().await?;
        debug!("{} received {}", config.name, message.kind());
        match message {
            ServerMessage::UpdateRoom(rooms) if !seated => {
                let open = rooms
                    .iter()
                    .find(|r| r.room_users.iter().all(|u| u.index != player));
                let command = match open {
                    Some(room) => ClientCommand::AddUserToRoom {
                        index_room: room.room_id,
                    },
                    None => ClientCommand::CreateRoom,
                };
                transport.send(command).await?;
                seated = true;
            }
            ServerMessage::CreateGame { id_game, id_player } => {
                match_id = Some(id_game);
                let fleet = Fleet::random(rng).map_err(|e| anyhow!(e))?;
                transport
                    .send(ClientCommand::AddShips {
                        game_id: id_game,
                        index_player: id_player,
                        ships: fleet_to_dtos(&fleet),
                    })
                    .await?;
            }
            ServerMessage::Turn { current_player } if current_player == player => {
                fire(transport, match_id, player, &mut shots_fired).await?;
            }
            // A hit or a kill keeps the turn.
            ServerMessage::Attack {
                current_player,
                status: AttackStatus::Shot | AttackStatus::Killed,
                ..
            } if current_player == player && winner.is_none() => {
                fire(transport, match_id, player, &mut shots_fired).await?;
            }
            ServerMessage::Finish { win_player } => {
                info!("{}: player {} won", config.name, win_player);
                winner = Some(win_player);
            }
            ServerMessage::UpdateWinners(winners) => {
                if let (Some(winner), Some(match_id)) = (winner, match_id) {
                    return Ok(BotOutcome {
                        player,
                        match_id,
                        winner,
                        winners,
                        shots_fired,
                    });
                }
            }
            ServerMessage::Error { reason } => {
                warn!("{}: server rejected a command: {}", config.name, reason);
            }
            _ => {}
        }
    }
}

async fn fire<T>(
    transport: &mut T,
    match_id: Option<MatchId>,
    player: PlayerIndex,
    shots_fired: &mut u32,
) -> anyhow::Result<()>
where
    T: Transport<ClientCommand, ServerMessage> + ?Sized,
{
    let game_id = match_id.ok_or_else(|| anyhow!("turn received before create_game"))?;
    transport
        .send(ClientCommand::RandomAttack {
            game_id,
            index_player: player,
        })
        .await?;
    *shots_fired += 1;
    Ok(())
}
