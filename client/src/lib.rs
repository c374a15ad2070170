//! # Game Client Library
//!
//! Client-side implementation for the networked paddle-ball game: the
//! session adapter that speaks the wire protocol, the session state machine
//! a front-end drives, and the paddle controllers used by the headless bot.
//!
//! ## Architecture Overview
//!
//! The client is deliberately thin. The server simulates everything; the
//! client's job is to ship intents upstream and render whatever snapshot
//! comes back. Each frame it sends exactly one intent and blocks for the
//! paired reply, so the displayed state is never more than one exchange
//! behind the server's authoritative numbers.
//!
//! The local paddle position is the one piece of optimistic state: it moves
//! immediately on input so the controls feel responsive, but the next
//! snapshot overwrites it unconditionally.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! The session adapter: TCP connect with a bounded timeout, the slot
//! handshake, the intent/snapshot exchange, and disconnect. Every failure
//! surfaces as "connection lost" rather than a panic or a silent retry.
//!
//! ### Session Module (`session`)
//! Rendering-agnostic session state machine: lobby / playing / game-over
//! phases, one-shot ready and restart intents, and the optimistic paddle.
//!
//! ### Controller Module (`controller`)
//! Pure paddle controllers (reactive, laggy, predictive) that map a
//! snapshot to a desired paddle position. The headless bot binary picks one
//! at the command line; an interactive front-end would substitute keyboard
//! deltas.

pub mod controller;
pub mod network;
pub mod session;
