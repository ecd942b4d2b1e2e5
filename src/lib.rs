pub mod bot;
pub mod config;
pub mod core;
pub mod dispatcher;
pub mod identity;
pub mod lobby;
mod logging;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod transport;

pub use bot::{BotConfig, BotOutcome, RoomChoice};
pub use config::ServerConfig;
pub use crate::core::*;
pub use dispatcher::Dispatcher;
pub use identity::{LoginError, PlayerDirectory, PlayerProfile, WinnerEntry};
pub use lobby::{RoomLobby, RoomSummary};
pub use logging::{env_level, init_logging};
pub use protocol::*;
pub use registry::{MatchRegistry, SharedMatch};
pub use session::{ConnectionId, Delivery, SessionRouter};
pub use transport::tcp::TcpTransport;
pub use transport::Transport;
