use clap::{Parser, ValueEnum};
use log::info;
use server::echo::EchoServer;
use server::game::GameServer;
use server::network::{Handler, Server};
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Run the arena simulation
    Game,
    /// Rebroadcast every message to all peers
    Echo,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = shared::PORT)]
    port: u16,

    /// Drop peers that stay silent this long
    #[arg(long, default_value = "2000")]
    timeout_ms: u64,

    /// Server steps per second
    #[arg(short, long, default_value = "60")]
    tick_rate: u32,

    #[arg(short, long, value_enum, default_value = "game")]
    mode: Mode,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let tick = Duration::from_secs_f64(1.0 / args.tick_rate.max(1) as f64);
    let timeout = Duration::from_millis(args.timeout_ms);
    let address = (args.host.as_str(), args.port);

    info!("Starting {:?} server at {} Hz", args.mode, args.tick_rate);

    match args.mode {
        Mode::Game => run(Server::bind(address, GameServer::new())?.with_timeout(timeout), tick).await,
        Mode::Echo => run(Server::bind(address, EchoServer)?.with_timeout(timeout), tick).await,
    }
}

async fn run<H: Handler>(
    mut server: Server<H>,
    tick: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    tokio::select! {
        result = server.serve(tick) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    server.close();
    Ok(())
}
