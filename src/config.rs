//! Runtime settings for the server process.

use log::LevelFilter;

use crate::transport::tcp::{DEFAULT_TIMEOUT, MAX_FRAME_SIZE};

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// Seed for `random_attack` target selection.
    pub seed: Option<u64>,
    /// Overrides `BATTLESHIP_LOG` when set.
    pub log_level: Option<LevelFilter>,
    pub max_frame_size: u32,
    /// Per-frame write timeout, in seconds.
    pub write_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            seed: None,
            log_level: None,
            max_frame_size: MAX_FRAME_SIZE,
            write_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}
