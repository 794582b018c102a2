use clap::Parser;
use client::game::ClientGame;
use client::input::InputManager;
use client::network::Client;
use client::rendering::Renderer;
use log::{error, info, warn};
use macroquad::prelude::*;
use server::game::GameServer;
use server::network::Server;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server host to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1")]
    server: String,

    /// Server port
    #[arg(short, long, default_value_t = shared::PORT)]
    port: u16,

    /// Window width
    #[arg(short = 'w', long, default_value = "800")]
    width: i32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "600")]
    height: i32,

    /// Also run a game server inside this process and connect to it
    #[arg(long)]
    host_local: bool,
}

fn window_conf() -> Conf {
    let args = Args::parse();
    Conf {
        window_title: "Arena".to_owned(),
        window_width: args.width,
        window_height: args.height,
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

    if let Err(e) = run(args).await {
        error!("Client stopped: {}", e);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut local_server = if args.host_local {
        let server = Server::bind(("0.0.0.0", args.port), GameServer::new())?;
        info!("Hosting a local game on {}", server.local_addr()?);
        Some(server)
    } else {
        None
    };

    let host = if args.host_local {
        "127.0.0.1"
    } else {
        args.server.as_str()
    };
    info!("Connecting to: {}:{}", host, args.port);
    info!("Controls: WASD or arrow keys to move, Escape to quit");

    let mut client = Client::connect((host, args.port))?;
    info!("Talking to server at {}", client.server_addr());
    let mut game = ClientGame::new();
    let mut input_manager = InputManager::new();
    let mut renderer = Renderer::new();

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        for input in input_manager.capture() {
            client.send(&input.into())?;
        }

        if let Some(server) = local_server.as_mut() {
            if let Err(e) = server.step() {
                warn!("Local server step failed: {}", e);
            }
        }

        game.poll(&client);
        renderer.render(game.world());

        next_frame().await;
    }

    client.close();
    if let Some(server) = local_server {
        server.close();
    }

    Ok(())
}
