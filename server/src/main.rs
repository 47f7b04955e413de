use clap::Parser;
use log::info;
use server::console::read_console;
use server::game::load_world;
use server::network::{GameServer, ServerConfig};
use shared::DEFAULT_PORT;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Tick rate (updates per second)
    #[arg(short, long, default_value = "30")]
    tick_rate: u32,

    /// Maximum number of concurrent clients
    #[arg(short, long, default_value = "8")]
    max_clients: usize,

    /// Seconds between random fruit spawns (0 disables)
    #[arg(long, default_value = "3")]
    fruit_interval: u64,

    /// Seconds before a player's round ends (0 = never)
    #[arg(long, default_value = "0")]
    round_secs: u64,

    /// JSON file with the initial fruit layout
    #[arg(long)]
    world: Option<PathBuf>,

    /// Read operator commands (spawn, gameover, status) from stdin
    #[arg(long)]
    console: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let world = match &args.world {
        Some(path) => load_world(path)?,
        None => Vec::new(),
    };

    let config = ServerConfig {
        tick_rate: args.tick_rate,
        max_clients: args.max_clients,
        fruit_interval: Duration::from_secs(args.fruit_interval),
        round_length: Duration::from_secs(args.round_secs),
        world,
    };

    info!("Starting server...");
    info!("Tick rate: {}Hz", config.tick_rate);
    info!("Max clients: {}", config.max_clients);

    let address = format!("{}:{}", args.host, args.port);
    let server = GameServer::bind(&address, config).await?;

    if args.console {
        info!("Console enabled: spawn <kind> <x> <y> <points> | gameover <id> | status");
        tokio::spawn(read_console(tokio::io::stdin(), server.console_sender()));
    }

    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
