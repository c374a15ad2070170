use clap::Parser;
use client::controller::Controller;
use client::network::Connection;
use client::session::{Phase, Session};
use log::{error, info};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Per-frame paddle travel, matching what a keyboard front-end applies.
const PADDLE_STEP: f32 = 7.0;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:5555")]
    server: String,

    /// Paddle controller driving this bot
    #[arg(short, long, value_enum, default_value = "reactive")]
    controller: Controller,

    /// Seconds to wait for the initial connection
    #[arg(long, default_value = "10")]
    connect_timeout_secs: u64,

    /// Seconds to wait for each snapshot reply
    #[arg(long, default_value = "10")]
    exchange_timeout_secs: u64,

    /// Stop after this many frames (0 = play until the game ends)
    #[arg(long, default_value = "0")]
    max_frames: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Connecting to {}", args.server);
    let mut connection = Connection::connect(
        &args.server,
        Duration::from_secs(args.connect_timeout_secs),
        Duration::from_secs(args.exchange_timeout_secs),
    )
    .await?;

    let mut session = Session::new(connection.slot());
    info!(
        "Playing slot {} with the {:?} controller",
        session.slot(),
        args.controller
    );

    let mut frame_timer = interval(Duration::from_millis(16));
    frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last_scores = (0, 0);
    let mut frames: u64 = 0;

    loop {
        frame_timer.tick().await;
        frames += 1;
        if args.max_frames > 0 && frames > args.max_frames {
            info!("Frame limit reached, leaving");
            break;
        }

        // One intent per frame: readiness while waiting, otherwise the
        // controller-driven paddle position.
        let intent = match session.intent_ready() {
            Some(intent) => intent,
            None => {
                let desired = args
                    .controller
                    .desired_y(session.snapshot(), session.slot());
                let delta = (desired - session.local_paddle_y()).clamp(-PADDLE_STEP, PADDLE_STEP);
                session.apply_paddle_delta(delta);
                session.paddle_intent()
            }
        };

        match connection.exchange(intent).await {
            Some(snapshot) => {
                let scores = (snapshot.left_score, snapshot.right_score);
                if scores != last_scores {
                    info!("Score: {} - {}", scores.0, scores.1);
                    last_scores = scores;
                }
                session.apply_snapshot(snapshot);
            }
            None => {
                session.mark_connection_lost();
                error!("Connection lost");
                break;
            }
        }

        if session.phase() == Phase::GameOver {
            info!("{}", session.snapshot().winner);
            break;
        }
    }

    connection.disconnect().await;
    Ok(())
}
