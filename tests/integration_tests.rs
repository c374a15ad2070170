//! Integration tests for the networked game session
//!
//! These tests run a real server on a loopback socket and drive it with real
//! client connections.

use client::network::{ConnectError, Connection};
use server::game::{run_simulation, Engine, SimConfig};
use server::network::{Server, ServerContext};
use server::registry::Registry;
use shared::{read_packet, write_packet, GameState, Packet, ARENA_HEIGHT, PADDLE_HEIGHT};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Boots a full server (accept loop + simulation task) on an ephemeral port.
async fn start_server() -> SocketAddr {
    let context = ServerContext {
        engine: Arc::new(Engine::new(SimConfig::default())),
        state: Arc::new(RwLock::new(GameState::new())),
        registry: Arc::new(RwLock::new(Registry::new())),
        read_timeout: Duration::from_secs(5),
    };

    let server = Server::bind("127.0.0.1:0", context.clone())
        .await
        .expect("failed to bind test server");
    let addr = server.local_addr().unwrap();

    tokio::spawn(run_simulation(
        Arc::clone(&context.engine),
        Arc::clone(&context.state),
        Arc::clone(&context.registry),
        60,
    ));
    tokio::spawn(async move {
        let _ = server.run().await;
    });

    addr
}

async fn connect(addr: SocketAddr) -> Result<Connection, ConnectError> {
    Connection::connect(&addr.to_string(), CONNECT_TIMEOUT, READ_TIMEOUT).await
}

/// PROTOCOL TESTS
mod protocol_tests {
    use super::*;

    /// Tests the framing codec over a real TCP socket pair
    #[tokio::test]
    async fn framed_packets_survive_a_real_socket() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let echo = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            while let Some(packet) = read_packet(&mut stream).await.unwrap() {
                write_packet(&mut stream, &packet).await.unwrap();
            }
        });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();

        let packets = vec![
            Packet::Ready,
            Packet::PaddleMove { y: 123.5 },
            Packet::Snapshot(GameState::new()),
        ];

        for packet in &packets {
            write_packet(&mut stream, packet).await.unwrap();
            let reply = read_packet(&mut stream).await.unwrap();
            assert_eq!(reply.as_ref(), Some(packet));
        }

        drop(stream);
        echo.await.unwrap();
    }
}

/// SESSION LIFECYCLE TESTS
mod session_tests {
    use super::*;

    /// Slots are assigned lowest-first; a third connection is rejected with
    /// an explicit "server full" message and existing slots are untouched.
    #[tokio::test]
    async fn slot_assignment_and_capacity() {
        let addr = start_server().await;

        let mut first = connect(addr).await.unwrap();
        let mut second = connect(addr).await.unwrap();
        assert_eq!(first.slot(), 0);
        assert_eq!(second.slot(), 1);

        match connect(addr).await {
            Err(ConnectError::ServerFull) => {}
            other => panic!("Expected ServerFull, got {:?}", other.map(|c| c.slot())),
        }

        // The rejection did not disturb the admitted players.
        assert!(first.send_paddle(100.0).await.is_some());
        assert!(second.send_paddle(100.0).await.is_some());
    }

    /// One ready player never starts the game; the second does.
    #[tokio::test]
    async fn readiness_handshake_starts_the_game() {
        let addr = start_server().await;

        let mut first = connect(addr).await.unwrap();
        let mut second = connect(addr).await.unwrap();

        let snapshot = first.send_ready().await.unwrap();
        assert!(!snapshot.game_active);
        assert!(snapshot.winner.is_empty());

        // The second readiness completes the pair; its own reply already
        // reflects the started game.
        let snapshot = second.send_ready().await.unwrap();
        assert!(snapshot.game_active);
        assert!(snapshot.winner.is_empty());

        let snapshot = first.send_paddle(250.0).await.unwrap();
        assert!(snapshot.game_active);
    }

    /// The simulation advances the ball once both players are ready.
    #[tokio::test]
    async fn ball_moves_while_game_is_active() {
        let addr = start_server().await;

        let mut first = connect(addr).await.unwrap();
        let mut second = connect(addr).await.unwrap();

        first.send_ready().await.unwrap();
        let served = second.send_ready().await.unwrap();
        assert!(served.ball_speed_x != 0.0);

        // A handful of ticks is plenty to leave the serve position, and far
        // too few for a score to re-center the ball.
        sleep(Duration::from_millis(150)).await;
        let snapshot = first.send_paddle(250.0).await.unwrap();
        assert!(snapshot.game_active);
        assert!(snapshot.ball_x != served.ball_x);
    }

    /// A paddle update is reflected in the paired reply (read-your-write)
    /// and visible to the peer on its next exchange.
    #[tokio::test]
    async fn paddle_updates_propagate() {
        let addr = start_server().await;

        let mut first = connect(addr).await.unwrap();
        let mut second = connect(addr).await.unwrap();

        let snapshot = first.send_paddle(240.0).await.unwrap();
        assert_eq!(snapshot.left_paddle_y, 240.0);

        let snapshot = second.send_paddle(300.0).await.unwrap();
        assert_eq!(snapshot.right_paddle_y, 300.0);
        assert_eq!(snapshot.left_paddle_y, 240.0);
    }

    /// The server clamps paddle positions; out-of-range input is never
    /// stored as sent.
    #[tokio::test]
    async fn paddle_input_is_clamped() {
        let addr = start_server().await;

        let mut first = connect(addr).await.unwrap();

        let snapshot = first.send_paddle(10_000.0).await.unwrap();
        assert_eq!(snapshot.left_paddle_y, ARENA_HEIGHT - PADDLE_HEIGHT);

        let snapshot = first.send_paddle(-10_000.0).await.unwrap();
        assert_eq!(snapshot.left_paddle_y, 0.0);
    }

    /// Disconnecting frees the slot for the next player.
    #[tokio::test]
    async fn disconnect_frees_the_slot() {
        let addr = start_server().await;

        let first = connect(addr).await.unwrap();
        let mut second = connect(addr).await.unwrap();

        first.disconnect().await;

        // The handler notices the shutdown asynchronously; retry briefly.
        let mut replacement = None;
        for _ in 0..40 {
            match connect(addr).await {
                Ok(connection) => {
                    replacement = Some(connection);
                    break;
                }
                Err(ConnectError::ServerFull) => sleep(Duration::from_millis(50)).await,
                Err(e) => panic!("Unexpected connect failure: {}", e),
            }
        }

        let mut replacement = replacement.expect("slot was never freed");
        assert_eq!(replacement.slot(), 0);

        // Both current players remain functional.
        assert!(replacement.send_paddle(50.0).await.is_some());
        assert!(second.send_paddle(50.0).await.is_some());
    }

    /// An unknown/none-like payload changes nothing and still gets the
    /// snapshot reply.
    #[tokio::test]
    async fn unexpected_client_packet_is_ignored() {
        let addr = start_server().await;

        let mut first = connect(addr).await.unwrap();
        first.send_paddle(240.0).await.unwrap();

        // A client-bound variant arriving at the server is not an intent.
        let snapshot = first.exchange(Packet::ServerFull).await.unwrap();
        assert_eq!(snapshot.left_paddle_y, 240.0);
        assert!(!snapshot.game_active);
    }
}
