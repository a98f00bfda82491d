use clap::Parser;
use client::game::ClientGameState;
use client::input::{ClientCommand, InputManager};
use client::network::Connection;
use client::rendering::Renderer;
use log::{error, info};
use macroquad::prelude::*;

const WINDOW_WIDTH: i32 = 800;
const WINDOW_HEIGHT: i32 = 600;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Tic-Tac-Toe".to_owned(),
        window_width: WINDOW_WIDTH,
        window_height: WINDOW_HEIGHT,
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
    info!("Connecting to: {}", args.server);
    info!("Controls: C create room, J join room, click to move, R reset");

    let mut connection = match Connection::spawn(&args.server) {
        Ok(connection) => connection,
        Err(e) => {
            error!("Failed to start network: {}", e);
            return;
        }
    };

    let mut game_state = ClientGameState::new();
    let mut input_manager = InputManager::new();
    let renderer = Renderer::new(WINDOW_WIDTH as usize, WINDOW_HEIGHT as usize);

    'frame: loop {
        while let Some(packet) = connection.try_recv() {
            game_state.apply_packet(packet);
        }

        for command in input_manager.update(&renderer.layout()) {
            match command {
                ClientCommand::Quit => break 'frame,
                ClientCommand::MakeMove(cell) if !game_state.can_play(cell as usize) => {}
                command => {
                    if let Some(packet) = command.into_packet() {
                        connection.send(packet);
                    }
                }
            }
        }

        renderer.render(&game_state, input_manager.join_code());

        next_frame().await;
    }

    connection.shutdown();
}
