//! Paddle controllers for the headless bot: pure functions of the ball and
//! the controller's own paddle to a desired paddle position. A rendering
//! front-end replaces these with keyboard deltas.

use shared::{GameState, ARENA_HEIGHT, ARENA_WIDTH, BALL_SIZE, LEFT_SLOT, PADDLE_HEIGHT,
    PADDLE_MARGIN, PADDLE_WIDTH};

/// Available controller behaviors, from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Controller {
    /// Centers the paddle on the ball's current position.
    Reactive,
    /// Tracks the ball only while it approaches; re-centers otherwise.
    Laggy,
    /// Aims for where the ball will cross the paddle plane, accounting for
    /// wall bounces.
    Predictive,
}

impl Controller {
    /// The paddle position this controller wants for the given snapshot.
    /// Pure: no internal state, no randomness.
    pub fn desired_y(&self, state: &GameState, slot: u8) -> f32 {
        let target = match self {
            Controller::Reactive => track_ball(state),
            Controller::Laggy => {
                if ball_approaching(state, slot) {
                    track_ball(state)
                } else {
                    (ARENA_HEIGHT - PADDLE_HEIGHT) / 2.0
                }
            }
            Controller::Predictive => {
                if ball_approaching(state, slot) {
                    predict_crossing(state, slot)
                } else {
                    (ARENA_HEIGHT - PADDLE_HEIGHT) / 2.0
                }
            }
        };
        shared::clamp_paddle(target)
    }
}

/// Paddle position that centers the paddle on the ball.
fn track_ball(state: &GameState) -> f32 {
    state.ball_y + BALL_SIZE / 2.0 - PADDLE_HEIGHT / 2.0
}

fn ball_approaching(state: &GameState, slot: u8) -> bool {
    if slot == LEFT_SLOT {
        state.ball_speed_x < 0.0
    } else {
        state.ball_speed_x > 0.0
    }
}

/// Projects the ball to this slot's paddle plane, folding the vertical
/// trajectory at the walls.
fn predict_crossing(state: &GameState, slot: u8) -> f32 {
    let plane_x = if slot == LEFT_SLOT {
        PADDLE_MARGIN + PADDLE_WIDTH
    } else {
        ARENA_WIDTH - PADDLE_MARGIN - PADDLE_WIDTH - BALL_SIZE
    };

    if state.ball_speed_x == 0.0 {
        return track_ball(state);
    }

    let ticks = (plane_x - state.ball_x) / state.ball_speed_x;
    if ticks <= 0.0 {
        return track_ball(state);
    }

    let raw_y = state.ball_y + state.ball_speed_y * ticks;

    // Fold the unbounded trajectory back into the arena: the ball's center
    // line reflects off y = 0 and y = ARENA_HEIGHT - BALL_SIZE.
    let span = ARENA_HEIGHT - BALL_SIZE;
    let period = 2.0 * span;
    let mut folded = raw_y.rem_euclid(period);
    if folded > span {
        folded = period - folded;
    }

    folded + BALL_SIZE / 2.0 - PADDLE_HEIGHT / 2.0
}
