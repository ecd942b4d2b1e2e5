use battleship_server::{
    bot, init_logging, server, BotConfig, ClientCommand, RoomChoice, ServerConfig,
    ServerMessage, TcpTransport,
};

use clap::Parser;
use log::{info, LevelFilter};
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Run the game server.
    Serve {
        #[arg(long, default_value = battleship_server::config::DEFAULT_BIND)]
        bind: String,
        #[arg(long, help = "Fix RNG seed for reproducible random attacks (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, help = "Log level (error, warn, info, debug, trace); overrides BATTLESHIP_LOG")]
        log_level: Option<LevelFilter>,
        #[arg(long, default_value_t = battleship_server::transport::tcp::MAX_FRAME_SIZE)]
        max_frame_size: u32,
    },
    /// Connect to a server and play one game with random shots.
    Bot {
        #[arg(long, default_value = "127.0.0.1:3000")]
        connect: String,
        #[arg(long, default_value = "robot")]
        name: String,
        #[arg(long, default_value = "password")]
        password: String,
        #[arg(long, help = "Join this room instead of picking one automatically")]
        room: Option<u32>,
        #[arg(long, help = "Open a new room and wait for an opponent")]
        create: bool,
        #[arg(long, help = "Fix RNG seed for reproducible fleets (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long)]
        log_level: Option<LevelFilter>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            seed,
            log_level,
            max_frame_size,
        } => {
            init_logging(log_level);
            let config = ServerConfig {
                bind,
                seed,
                log_level,
                max_frame_size,
                ..ServerConfig::default()
            };
            tokio::select! {
                result = server::run(config) => result?,
                _ = tokio::signal::ctrl_c() => info!("shutting down"),
            }
        }
        Commands::Bot {
            connect,
            name,
            password,
            room,
            create,
            seed,
            log_level,
        } => {
            init_logging(log_level);
            let mut rng = if let Some(s) = seed {
                SmallRng::seed_from_u64(s)
            } else {
                let mut seed_rng = rand::rng();
                SmallRng::from_rng(&mut seed_rng)
            };
            let room = match (room, create) {
                (Some(id), _) => RoomChoice::Join(id),
                (None, true) => RoomChoice::Create,
                (None, false) => RoomChoice::Auto,
            };
            info!("connecting to {}...", connect);
            let mut transport: TcpTransport<ClientCommand, ServerMessage> =
                TcpTransport::connect(&connect).await?;
            let config = BotConfig {
                name,
                password,
                room,
            };
            let outcome = bot::play(&mut transport, &config, &mut rng).await?;
            println!(
                "match {} finished after {} shots: {}",
                outcome.match_id,
                outcome.shots_fired,
                if outcome.won() { "you won" } else { "you lost" }
            );
            for entry in &outcome.winners {
                println!("{:>5}  {}", entry.wins, entry.name);
            }
        }
    }
    Ok(())
}
