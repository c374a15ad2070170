//! Types shared between the game server and client: arena constants, the
//! authoritative [`GameState`] snapshot, the [`Packet`] wire protocol and the
//! length-prefixed transport codec.

use serde::{Deserialize, Serialize};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const ARENA_WIDTH: f32 = 800.0;
pub const ARENA_HEIGHT: f32 = 600.0;
pub const PADDLE_WIDTH: f32 = 20.0;
pub const PADDLE_HEIGHT: f32 = 100.0;
/// Horizontal inset of each paddle's near edge from its wall.
pub const PADDLE_MARGIN: f32 = 50.0;
pub const BALL_SIZE: f32 = 20.0;

pub const DEFAULT_PORT: u16 = 5555;

/// Slot id of the left player.
pub const LEFT_SLOT: u8 = 0;
/// Slot id of the right player.
pub const RIGHT_SLOT: u8 = 1;

/// Full authoritative game snapshot, broadcast to clients every exchange.
///
/// All mutation happens on the server; clients only render what they receive.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GameState {
    pub left_paddle_y: f32,
    pub right_paddle_y: f32,
    pub ball_x: f32,
    pub ball_y: f32,
    pub ball_speed_x: f32,
    pub ball_speed_y: f32,
    pub left_score: u32,
    pub right_score: u32,
    /// True while a rally is being simulated.
    pub game_active: bool,
    /// Empty until one side crosses the score threshold, then set exactly once
    /// per game.
    pub winner: String,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            left_paddle_y: (ARENA_HEIGHT - PADDLE_HEIGHT) / 2.0,
            right_paddle_y: (ARENA_HEIGHT - PADDLE_HEIGHT) / 2.0,
            ball_x: (ARENA_WIDTH - BALL_SIZE) / 2.0,
            ball_y: (ARENA_HEIGHT - BALL_SIZE) / 2.0,
            ball_speed_x: 0.0,
            ball_speed_y: 0.0,
            left_score: 0,
            right_score: 0,
            game_active: false,
            winner: String::new(),
        }
    }

    /// Writes a paddle position for the given slot, clamped to the arena.
    /// Client input is never trusted beyond this clamp.
    pub fn set_paddle(&mut self, slot: u8, y: f32) {
        let y = clamp_paddle(y);
        if slot == LEFT_SLOT {
            self.left_paddle_y = y;
        } else {
            self.right_paddle_y = y;
        }
    }

    pub fn paddle(&self, slot: u8) -> f32 {
        if slot == LEFT_SLOT {
            self.left_paddle_y
        } else {
            self.right_paddle_y
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamps a paddle position so the paddle stays fully inside the arena.
pub fn clamp_paddle(y: f32) -> f32 {
    y.clamp(0.0, ARENA_HEIGHT - PADDLE_HEIGHT)
}

/// One logical message on the wire.
///
/// The protocol is request/reply from the client's perspective: after the
/// initial slot assignment, every client intent is answered with a snapshot.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    /// Server -> client, once, immediately after admission.
    SlotAssigned { slot: u8 },
    /// Server -> client when both slots are already taken, sent before close.
    ServerFull,
    /// Server -> client, one per received intent.
    Snapshot(GameState),

    /// Client -> server: this player is ready to start.
    Ready,
    /// Client -> server: start a new game after a win.
    Restart,
    /// Client -> server: new paddle position for this player's slot.
    PaddleMove { y: f32 },
}

/// Upper bound on an encoded packet. A snapshot is well under this; anything
/// larger is treated as a protocol violation rather than read blindly.
pub const MAX_FRAME_LEN: usize = 2048;

/// Encodes one packet as a u32 length prefix followed by the bincode body.
pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let data =
        bincode::serialize(packet).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if data.len() > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds limit", data.len()),
        ));
    }

    writer.write_u32(data.len() as u32).await?;
    writer.write_all(&data).await?;
    writer.flush().await?;
    Ok(())
}

/// Decodes one packet from the stream.
///
/// Returns `Ok(None)` when the peer shut down cleanly before the next frame.
/// EOF in the middle of a frame, an oversized length prefix, or a body that
/// fails to decode are all errors that terminate the exchange.
pub async fn read_packet<R>(reader: &mut R) -> io::Result<Option<Packet>>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    };

    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame length {} exceeds limit", len),
        ));
    }

    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer).await?;

    let packet = bincode::deserialize(&buffer)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(packet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_new_state_is_centered_and_idle() {
        let state = GameState::new();

        assert_approx_eq!(state.left_paddle_y, 250.0);
        assert_approx_eq!(state.right_paddle_y, 250.0);
        assert_approx_eq!(state.ball_x, 390.0);
        assert_approx_eq!(state.ball_y, 290.0);
        assert_eq!(state.left_score, 0);
        assert_eq!(state.right_score, 0);
        assert!(!state.game_active);
        assert!(state.winner.is_empty());
    }

    #[test]
    fn test_set_paddle_clamps_to_arena() {
        let mut state = GameState::new();

        state.set_paddle(LEFT_SLOT, -50.0);
        assert_eq!(state.left_paddle_y, 0.0);

        state.set_paddle(LEFT_SLOT, 10_000.0);
        assert_eq!(state.left_paddle_y, ARENA_HEIGHT - PADDLE_HEIGHT);

        state.set_paddle(RIGHT_SLOT, 240.0);
        assert_eq!(state.right_paddle_y, 240.0);
        // Writing one slot never touches the other.
        assert_eq!(state.left_paddle_y, ARENA_HEIGHT - PADDLE_HEIGHT);
    }

    #[test]
    fn test_snapshot_roundtrip_is_exact() {
        let mut state = GameState::new();
        state.left_paddle_y = 123.0;
        state.right_paddle_y = 456.0;
        state.ball_x = 17.25;
        state.ball_y = 599.5;
        state.ball_speed_x = -6.75;
        state.ball_speed_y = 3.125;
        state.left_score = 7;
        state.right_score = 3;
        state.game_active = true;

        let serialized = bincode::serialize(&Packet::Snapshot(state.clone())).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Snapshot(decoded) => assert_eq!(decoded, state),
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_intent_roundtrip() {
        let packets = vec![
            Packet::SlotAssigned { slot: 1 },
            Packet::ServerFull,
            Packet::Ready,
            Packet::Restart,
            Packet::PaddleMove { y: 240.0 },
        ];

        for packet in packets {
            let serialized = bincode::serialize(&packet).unwrap();
            let deserialized: Packet = bincode::deserialize(&serialized).unwrap();
            assert_eq!(deserialized, packet);
        }
    }

    #[tokio::test]
    async fn test_codec_roundtrip_over_duplex() {
        let (mut a, mut b) = tokio::io::duplex(4096);

        let sent = vec![
            Packet::SlotAssigned { slot: 0 },
            Packet::Ready,
            Packet::PaddleMove { y: 123.5 },
            Packet::Snapshot(GameState::new()),
        ];

        for packet in &sent {
            write_packet(&mut a, packet).await.unwrap();
        }
        drop(a);

        for packet in &sent {
            let received = read_packet(&mut b).await.unwrap();
            assert_eq!(received.as_ref(), Some(packet));
        }

        // Clean shutdown after the last frame reads as None.
        assert_eq!(read_packet(&mut b).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_codec_rejects_oversized_frame() {
        let (mut a, mut b) = tokio::io::duplex(4096);

        a.write_u32((MAX_FRAME_LEN + 1) as u32).await.unwrap();
        a.write_all(&[0u8; 16]).await.unwrap();

        let err = read_packet(&mut b).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_codec_mid_frame_eof_is_an_error() {
        let (mut a, mut b) = tokio::io::duplex(4096);

        // Announce 100 bytes but deliver only 3 before closing.
        a.write_u32(100).await.unwrap();
        a.write_all(&[1, 2, 3]).await.unwrap();
        drop(a);

        assert!(read_packet(&mut b).await.is_err());
    }

    #[tokio::test]
    async fn test_codec_rejects_garbage_body() {
        let (mut a, mut b) = tokio::io::duplex(4096);

        a.write_u32(4).await.unwrap();
        a.write_all(&[0xFF, 0xFF, 0xFF, 0xFF]).await.unwrap();

        let err = read_packet(&mut b).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
