use log::{info, warn};
use shared::{read_packet, write_packet, GameState, Packet};
use std::fmt;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Why a connection attempt failed. Surfaced to the caller so a front-end
/// can show "could not connect" with a retry affordance instead of crashing.
#[derive(Debug)]
pub enum ConnectError {
    /// The server did not answer within the configured timeout.
    Timeout,
    /// Both player slots were already taken.
    ServerFull,
    /// The server answered with something other than a slot assignment.
    Protocol,
    Io(io::Error),
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::Timeout => write!(f, "connection attempt timed out"),
            ConnectError::ServerFull => write!(f, "server is full"),
            ConnectError::Protocol => write!(f, "unexpected handshake reply"),
            ConnectError::Io(e) => write!(f, "connection failed: {}", e),
        }
    }
}

impl std::error::Error for ConnectError {}

impl From<io::Error> for ConnectError {
    fn from(e: io::Error) -> Self {
        ConnectError::Io(e)
    }
}

/// Client side of the session protocol: connect once, then repeatedly send
/// one intent and block for the paired snapshot.
pub struct Connection {
    stream: TcpStream,
    slot: u8,
    read_timeout: Duration,
}

impl Connection {
    /// Connects and completes the handshake: the first server frame must be
    /// a slot assignment. A "server full" reply is a distinct error so the
    /// caller can report it instead of retrying.
    pub async fn connect(
        addr: &str,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, ConnectError> {
        let stream = match timeout(connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(ConnectError::Io(e)),
            Err(_) => return Err(ConnectError::Timeout),
        };

        let mut connection = Connection {
            stream,
            slot: 0,
            read_timeout,
        };

        match timeout(read_timeout, read_packet(&mut connection.stream)).await {
            Ok(Ok(Some(Packet::SlotAssigned { slot }))) => {
                info!("Assigned player slot {}", slot);
                connection.slot = slot;
                Ok(connection)
            }
            Ok(Ok(Some(Packet::ServerFull))) => Err(ConnectError::ServerFull),
            Ok(Ok(Some(_))) => Err(ConnectError::Protocol),
            Ok(Ok(None)) => Err(ConnectError::Protocol),
            Ok(Err(e)) => Err(ConnectError::Io(e)),
            Err(_) => Err(ConnectError::Timeout),
        }
    }

    /// Slot assigned by the server during the handshake.
    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Sends one intent and blocks for the paired snapshot.
    ///
    /// Any transport failure (timeout, I/O error, malformed or unexpected
    /// reply, clean server shutdown) yields `None`. The caller must treat
    /// that as "connection lost" and end the session, not retry silently.
    pub async fn exchange(&mut self, intent: Packet) -> Option<GameState> {
        if let Err(e) = write_packet(&mut self.stream, &intent).await {
            warn!("Failed to send intent: {}", e);
            return None;
        }

        match timeout(self.read_timeout, read_packet(&mut self.stream)).await {
            Ok(Ok(Some(Packet::Snapshot(state)))) => Some(state),
            Ok(Ok(Some(other))) => {
                warn!("Expected snapshot, got {:?}", other);
                None
            }
            Ok(Ok(None)) => {
                info!("Server closed the connection");
                None
            }
            Ok(Err(e)) => {
                warn!("Transport error while waiting for snapshot: {}", e);
                None
            }
            Err(_) => {
                warn!("Timed out waiting for snapshot");
                None
            }
        }
    }

    /// Signals readiness to start the game.
    pub async fn send_ready(&mut self) -> Option<GameState> {
        self.exchange(Packet::Ready).await
    }

    /// Requests a new game after a win.
    pub async fn send_restart(&mut self) -> Option<GameState> {
        self.exchange(Packet::Restart).await
    }

    /// Submits a new paddle position for this player's slot.
    pub async fn send_paddle(&mut self, y: f32) -> Option<GameState> {
        self.exchange(Packet::PaddleMove { y }).await
    }

    /// Closes the socket. Tolerates a peer that is already gone.
    pub async fn disconnect(mut self) {
        use tokio::io::AsyncWriteExt;
        let _ = self.stream.shutdown().await;
    }
}
