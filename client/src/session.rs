//! Client-side session state: what phase the player is in and what the
//! latest authoritative snapshot says. A rendering front-end consumes this;
//! the headless bot drives it the same way.

use shared::{clamp_paddle, GameState, Packet};

/// Where the player is in the session lifecycle, derived from snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Connected, waiting for both players to signal readiness.
    WaitingForOpponent,
    /// A rally is being simulated.
    Playing,
    /// A winner has been decided; a restart intent starts the next game.
    GameOver,
}

/// Tracks the local player's view of the session.
///
/// The local paddle position is advisory only: it is clamped optimistically
/// on input, sent to the server, and overwritten by whatever the next
/// authoritative snapshot says.
pub struct Session {
    slot: u8,
    snapshot: GameState,
    local_paddle_y: f32,
    connection_lost: bool,
    phase: Phase,
    ready_sent: bool,
    restart_sent: bool,
}

impl Session {
    pub fn new(slot: u8) -> Self {
        let snapshot = GameState::new();
        let local_paddle_y = snapshot.paddle(slot);
        Self {
            slot,
            snapshot,
            local_paddle_y,
            connection_lost: false,
            phase: Phase::WaitingForOpponent,
            ready_sent: false,
            restart_sent: false,
        }
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Latest authoritative snapshot received from the server.
    pub fn snapshot(&self) -> &GameState {
        &self.snapshot
    }

    pub fn connection_lost(&self) -> bool {
        self.connection_lost
    }

    pub fn local_paddle_y(&self) -> f32 {
        self.local_paddle_y
    }

    /// Moves the local paddle by a frame delta, clamped to the arena. The
    /// server applies the same clamp; this one only keeps the optimistic
    /// position honest until the next snapshot confirms it.
    pub fn apply_paddle_delta(&mut self, dy: f32) {
        self.local_paddle_y = clamp_paddle(self.local_paddle_y + dy);
    }

    /// The paddle intent for this frame.
    pub fn paddle_intent(&self) -> Packet {
        Packet::PaddleMove {
            y: self.local_paddle_y,
        }
    }

    /// Readiness intent, produced at most once per waiting period.
    pub fn intent_ready(&mut self) -> Option<Packet> {
        if self.phase == Phase::WaitingForOpponent && !self.ready_sent {
            self.ready_sent = true;
            Some(Packet::Ready)
        } else {
            None
        }
    }

    /// Restart intent, produced at most once per finished game.
    pub fn intent_restart(&mut self) -> Option<Packet> {
        if self.phase == Phase::GameOver && !self.restart_sent {
            self.restart_sent = true;
            Some(Packet::Restart)
        } else {
            None
        }
    }

    /// Folds an authoritative snapshot into the session. The server's
    /// numbers always win, including this player's own paddle.
    pub fn apply_snapshot(&mut self, snapshot: GameState) {
        self.local_paddle_y = snapshot.paddle(self.slot);

        self.phase = if snapshot.game_active {
            self.restart_sent = false;
            Phase::Playing
        } else if !snapshot.winner.is_empty() {
            Phase::GameOver
        } else {
            // Transition back to the lobby (e.g. after a restart handshake)
            // re-arms readiness; staying in the lobby does not.
            if self.phase != Phase::WaitingForOpponent {
                self.ready_sent = false;
            }
            Phase::WaitingForOpponent
        };

        self.snapshot = snapshot;
    }

    /// Marks the session dead after a failed exchange. There is no recovery;
    /// the front-end offers a reconnect, which builds a fresh session.
    pub fn mark_connection_lost(&mut self) {
        self.connection_lost = true;
    }
}
