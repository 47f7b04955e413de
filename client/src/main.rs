use clap::Parser;
use client::controller::GameController;
use client::input::InputManager;
use client::rendering::MacroquadCanvas;
use log::{info, warn};
use macroquad::prelude::*;
use shared::{DEFAULT_HOST, DEFAULT_PORT, SCREEN_HEIGHT, SCREEN_WIDTH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server host to connect to
    #[arg(short = 's', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Skip connecting and play locally
    #[arg(long)]
    offline: bool,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "DonCEy Kong Jr".to_owned(),
        window_width: SCREEN_WIDTH,
        window_height: SCREEN_HEIGHT,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Controls: A/D or arrows to move, Space to jump, click fruit to eat");

    let mut controller = GameController::new();
    if args.offline {
        info!("Offline mode");
    } else if let Err(e) = controller.connect(&args.host, args.port) {
        warn!("Could not connect ({}), continuing offline", e);
    }

    let mut input_manager = InputManager::new();
    let mut canvas = MacroquadCanvas;

    loop {
        let input = input_manager.capture();
        controller.tick(&input, &mut canvas);

        if controller.should_exit() {
            break;
        }

        next_frame().await;
    }

    controller.shutdown();
    info!("Client stopped");
}
