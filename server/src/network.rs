//! Server network layer: TCP listener, admission and per-connection handlers

use crate::game::Engine;
use crate::registry::Registry;
use log::{debug, error, info, warn};
use shared::{read_packet, write_packet, GameState, Packet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio::time::timeout;

/// Shared handles every connection handler and the simulation task work
/// against. Cloning is cheap; all fields are reference-counted.
#[derive(Clone)]
pub struct ServerContext {
    pub engine: Arc<Engine>,
    pub state: Arc<RwLock<GameState>>,
    pub registry: Arc<RwLock<Registry>>,
    /// How long a handler waits for the next client intent before treating
    /// the peer as dead.
    pub read_timeout: Duration,
}

/// Accepting end of the game server. One handler task per admitted client.
pub struct Server {
    listener: TcpListener,
    context: ServerContext,
}

impl Server {
    /// Binds the listening socket. A bind failure is fatal and must be
    /// reported to the operator; the process does not start without it.
    pub async fn bind(addr: &str, context: ServerContext) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);
        Ok(Server { listener, context })
    }

    /// Address the listener actually bound to (port 0 resolves here).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop. Each connection runs concurrently with all others and
    /// with the simulation task; a handler failure terminates only that
    /// connection, never the process.
    pub async fn run(self) -> std::io::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let context = self.context.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, addr, context).await;
                    });
                }
                Err(e) => {
                    // Transient accept errors (e.g. fd exhaustion) should not
                    // take the server down.
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// Per-connection loop: admit, handshake, then answer every intent with a
/// snapshot until the peer disappears.
pub async fn handle_connection(mut stream: TcpStream, addr: SocketAddr, context: ServerContext) {
    let slot = {
        let mut registry = context.registry.write().await;
        registry.admit()
    };

    let Some(slot) = slot else {
        warn!("Rejecting connection from {}: server full", addr);
        if let Err(e) = write_packet(&mut stream, &Packet::ServerFull).await {
            debug!("Failed to deliver rejection to {}: {}", addr, e);
        }
        return;
    };

    info!("Player {} connected from {}", slot, addr);

    if let Err(e) = write_packet(&mut stream, &Packet::SlotAssigned { slot }).await {
        error!("Failed to send slot assignment to player {}: {}", slot, e);
        context.registry.write().await.remove(slot);
        return;
    }

    loop {
        let packet = match timeout(context.read_timeout, read_packet(&mut stream)).await {
            Ok(Ok(Some(packet))) => packet,
            Ok(Ok(None)) => {
                info!("Player {} closed the connection", slot);
                break;
            }
            Ok(Err(e)) => {
                warn!("Transport error from player {}: {}", slot, e);
                break;
            }
            Err(_) => {
                warn!(
                    "Player {} sent nothing for {:?}, dropping",
                    slot, context.read_timeout
                );
                break;
            }
        };

        apply_intent(&context, slot, packet).await;

        // The snapshot is taken after the intent has been applied, so a
        // client always reads its own write in the paired reply.
        let snapshot = context.state.read().await.clone();
        if let Err(e) = write_packet(&mut stream, &Packet::Snapshot(snapshot)).await {
            warn!("Failed to send snapshot to player {}: {}", slot, e);
            break;
        }
    }

    context.registry.write().await.remove(slot);
    info!("Player {} disconnected", slot);
}

/// Applies one decoded client intent to the shared state.
async fn apply_intent(context: &ServerContext, slot: u8, packet: Packet) {
    match packet {
        Packet::Ready => {
            let pair_complete = context.registry.write().await.mark_ready(slot);
            info!("Player {} is ready", slot);
            if pair_complete {
                let mut state = context.state.write().await;
                if !state.game_active {
                    context.engine.start_game(&mut state);
                    info!("Both players ready, game on");
                }
            }
        }
        Packet::Restart => {
            let mut state = context.state.write().await;
            if !state.winner.is_empty() {
                context.engine.start_game(&mut state);
                info!("Player {} restarted the game", slot);
            }
        }
        Packet::PaddleMove { y } => {
            context.state.write().await.set_paddle(slot, y);
        }
        other => {
            // Server-bound stream carrying a server-to-client variant; no
            // state change, no error.
            debug!("Ignoring unexpected packet from player {}: {:?}", slot, other);
        }
    }
}
