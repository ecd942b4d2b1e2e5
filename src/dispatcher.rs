//! Typed command handling.
//!
//! The dispatcher owns the process-wide registries and turns each decoded
//! [`ClientCommand`] into lobby, directory and engine calls, followed by one
//! ordered batch of deliveries. Match commands hold that match's lock until
//! their deliveries are queued, so both seats observe the same order.

use std::sync::Mutex;

use log::{info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::core::{GameError, MatchId, PlayerIndex, Position};
use crate::identity::PlayerDirectory;
use crate::lobby::RoomLobby;
use crate::protocol::{fleet_from_dtos, ClientCommand, ServerMessage, ShipDto};
use crate::registry::MatchRegistry;
use crate::session::{
    attack_deliveries, finish_deliveries, start_deliveries, ConnectionId, Delivery, SessionRouter,
};

enum Target {
    Cell { x: i32, y: i32 },
    Random,
}

pub struct Dispatcher {
    registry: MatchRegistry,
    router: SessionRouter,
    directory: PlayerDirectory,
    lobby: RoomLobby,
    rng: Mutex<SmallRng>,
}

impl Dispatcher {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            registry: MatchRegistry::new(),
            router: SessionRouter::new(),
            directory: PlayerDirectory::new(),
            lobby: RoomLobby::new(),
            rng: Mutex::new(rng),
        }
    }

    /// Fixed seed for reproducible random attacks, or a fresh one.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => {
                let mut seed_rng = rand::rng();
                SmallRng::from_rng(&mut seed_rng)
            }
        };
        Self::new(rng)
    }

    pub fn router(&self) -> &SessionRouter {
        &self.router
    }

    pub fn registry(&self) -> &MatchRegistry {
        &self.registry
    }

    pub fn directory(&self) -> &PlayerDirectory {
        &self.directory
    }

    pub fn lobby(&self) -> &RoomLobby {
        &self.lobby
    }

    /// Handle `command`; a rejection is reported to `conn` only.
    pub async fn dispatch(&self, conn: ConnectionId, command: ClientCommand) {
        let kind = command.kind();
        if let Err(err) = self.handle(conn, command).await {
            warn!("{} rejected {}: {}", conn, kind, err);
            self.router.send_to(
                conn,
                ServerMessage::Error {
                    reason: format!("{}: {}", kind, err),
                },
            );
        }
    }

    pub async fn handle(&self, conn: ConnectionId, command: ClientCommand) -> Result<(), GameError> {
        match command {
            ClientCommand::Reg { name, password } => self.login(conn, &name, &password),
            ClientCommand::CreateRoom => self.create_room(conn),
            ClientCommand::AddUserToRoom { index_room } => self.join_room(conn, index_room),
            ClientCommand::AddShips {
                game_id,
                index_player,
                ships,
            } => self.add_ships(conn, game_id, index_player, &ships).await,
            ClientCommand::Attack {
                game_id,
                index_player,
                x,
                y,
            } => {
                self.attack(conn, game_id, index_player, Target::Cell { x, y })
                    .await
            }
            ClientCommand::RandomAttack {
                game_id,
                index_player,
            } => self.attack(conn, game_id, index_player, Target::Random).await,
        }
    }

    /// Forget `conn`. The player's lobby seat is freed once their last
    /// connection is gone.
    pub fn disconnect(&self, conn: ConnectionId) {
        let Some(profile) = self.router.disconnect(conn) else {
            return;
        };
        if self.router.is_bound(profile.index) {
            info!("{} closed, player {} still connected elsewhere", conn, profile.index);
            return;
        }
        info!("player {} ({}) left", profile.name, profile.index);
        self.lobby.release(profile.index);
        self.router.deliver(vec![self.room_listing()]);
    }

    fn login(&self, conn: ConnectionId, name: &str, password: &str) -> Result<(), GameError> {
        let profile = match self.directory.login(name, password) {
            Ok(profile) => profile,
            Err(err) => {
                warn!("{} login as {:?} refused: {:?}", conn, name, err);
                self.router
                    .send_to(conn, ServerMessage::reg_failed(name, &err.to_string()));
                return Ok(());
            }
        };
        self.router.bind(conn, profile.clone())?;
        info!("{} logged in as {} ({})", conn, profile.name, profile.index);
        self.router.send_to(conn, ServerMessage::reg_ok(&profile));
        self.router.deliver(vec![
            self.room_listing(),
            Delivery::to_authenticated(ServerMessage::UpdateWinners(
                self.directory.list_winners(),
            )),
        ]);
        Ok(())
    }

    fn create_room(&self, conn: ConnectionId) -> Result<(), GameError> {
        let profile = self.router.resolve_player(conn)?;
        if let Some(room_id) = self.lobby.create_room(&profile) {
            info!("player {} opened room {}", profile.index, room_id);
        }
        self.router.deliver(vec![self.room_listing()]);
        Ok(())
    }

    fn join_room(&self, conn: ConnectionId, room_id: u32) -> Result<(), GameError> {
        let profile = self.router.resolve_player(conn)?;
        let mut deliveries = Vec::new();
        if let Some(seats) = self.lobby.add_user_to_room(&profile, room_id)? {
            self.registry.reserve(room_id, seats);
            deliveries.extend(seats.iter().map(|seat| {
                Delivery::to_players(
                    &[*seat],
                    ServerMessage::CreateGame {
                        id_game: room_id,
                        id_player: *seat,
                    },
                )
            }));
        }
        deliveries.push(self.room_listing());
        self.router.deliver(deliveries);
        Ok(())
    }

    async fn add_ships(
        &self,
        conn: ConnectionId,
        game_id: MatchId,
        index_player: PlayerIndex,
        ships: &[ShipDto],
    ) -> Result<(), GameError> {
        let player = self.authorize(conn, index_player)?;
        let fleet = fleet_from_dtos(ships)?;

        // Matches only exist once their room has filled.
        let shared = self.registry.get(game_id)?;
        let mut engine = shared.lock().await;
        if engine.submit_fleet(player, fleet)? {
            let start = engine.begin()?;
            self.router.deliver(start_deliveries(&start));
        }
        Ok(())
    }

    async fn attack(
        &self,
        conn: ConnectionId,
        game_id: MatchId,
        index_player: PlayerIndex,
        target: Target,
    ) -> Result<(), GameError> {
        let player = self.authorize(conn, index_player)?;
        let shared = self.registry.get(game_id)?;
        let mut engine = shared.lock().await;

        let position = match target {
            Target::Cell { x, y } => Position::from_signed(x, y)?,
            Target::Random => {
                let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
                engine.random_target(player, &mut *rng)?
            }
        };
        let report = engine.attack(player, position)?;
        let seats = engine.seat_indices();
        let mut deliveries = attack_deliveries(&seats, &report);

        if let Some(winner) = engine.check_winner() {
            if let Err(err) = self.directory.record_win(winner) {
                warn!("match {}: could not record win: {}", game_id, err);
            }
            for seat in &seats {
                self.lobby.release(*seat);
            }
            deliveries.extend(finish_deliveries(
                &seats,
                winner,
                self.directory.list_winners(),
            ));
        }
        self.router.deliver(deliveries);
        Ok(())
    }

    /// The player bound to `conn`, which must match the payload's index.
    fn authorize(&self, conn: ConnectionId, index_player: PlayerIndex) -> Result<PlayerIndex, GameError> {
        let profile = self.router.resolve_player(conn)?;
        if profile.index != index_player {
            return Err(GameError::Validation(format!(
                "index_player {} does not belong to this connection",
                index_player
            )));
        }
        Ok(profile.index)
    }

    fn room_listing(&self) -> Delivery {
        Delivery::to_authenticated(ServerMessage::UpdateRoom(self.lobby.open_rooms()))
    }
}
