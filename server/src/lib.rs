//! # Game Server Library
//!
//! Authoritative server for the networked two-player paddle-ball game. The
//! server owns the only real copy of the game: clients submit intents and
//! render whatever snapshot comes back.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! A dedicated task advances the ball, resolves collisions and scoring, and
//! decides the win condition at a fixed tick rate. Clients never influence
//! the simulation beyond their own clamped paddle position.
//!
//! ### Session Lifecycle
//! Two fixed player slots are handed out to incoming connections, lowest id
//! first. A game starts when both occupants have signaled readiness and can
//! be restarted after a win. Disconnects free the slot and pause the
//! simulation until a second player returns.
//!
//! ### Request/Reply State Broadcast
//! Every client intent is answered with the current full snapshot, taken
//! after the intent has been applied. A client therefore always observes its
//! own paddle write in the paired reply.
//!
//! ## Architecture
//!
//! One tokio task per connection plus one simulation task. All of them share
//! the game state and the session registry behind `RwLock`s; critical
//! sections are field-local and short. The simulation task never blocks on
//! I/O and skips ticks, rather than exiting, while the session is not
//! playable.
//!
//! ## Module Organization
//!
//! - [`game`]: simulation engine, tuning config and the tick task
//! - [`registry`]: slot admission, readiness handshake, disconnect cleanup
//! - [`network`]: TCP listener, framing, per-connection handlers

pub mod game;
pub mod network;
pub mod registry;
