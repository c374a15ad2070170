use clap::Parser;
use log::{error, info};
use server::game::{run_simulation, Engine, SimConfig};
use server::network::{Server, ServerContext};
use server::registry::Registry;
use shared::{GameState, DEFAULT_PORT};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Simulation tick rate (updates per second)
    #[arg(short, long, default_value = "60")]
    tick_rate: u32,

    /// Seconds to wait for a client intent before dropping the connection
    #[arg(long, default_value = "30")]
    read_timeout_secs: u64,

    /// A game ends when a score exceeds this value
    #[arg(long, default_value = "7")]
    win_score: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = SimConfig {
        win_score: args.win_score,
        ..SimConfig::default()
    };

    let context = ServerContext {
        engine: Arc::new(Engine::new(config)),
        state: Arc::new(RwLock::new(GameState::new())),
        registry: Arc::new(RwLock::new(Registry::new())),
        read_timeout: Duration::from_secs(args.read_timeout_secs),
    };

    let address = format!("{}:{}", args.host, args.port);
    let server = Server::bind(&address, context.clone()).await?;

    // The simulation task is owned by the process, not by any connection:
    // it keeps running (or pausing) regardless of who comes and goes.
    let simulation_handle = tokio::spawn(run_simulation(
        Arc::clone(&context.engine),
        Arc::clone(&context.state),
        Arc::clone(&context.registry),
        args.tick_rate,
    ));

    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Server loop failed: {}", e);
        }
    });

    tokio::select! {
        result = server_handle => {
            if let Err(e) = result {
                error!("Network task panicked: {}", e);
            }
        }
        result = simulation_handle => {
            if let Err(e) = result {
                error!("Simulation task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
