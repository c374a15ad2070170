use log::info;
use rand::Rng;
use shared::{
    clamp_paddle, GameState, ARENA_HEIGHT, ARENA_WIDTH, BALL_SIZE, PADDLE_HEIGHT, PADDLE_MARGIN,
    PADDLE_WIDTH,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::registry::Registry;

/// Simulation tuning parameters, passed into the engine at construction.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// A game ends when a score exceeds this value.
    pub win_score: u32,
    /// Horizontal speed of a freshly served ball.
    pub serve_speed: f32,
    /// Bound on the random vertical speed of a serve.
    pub max_serve_vy: f32,
    /// Scale applied to the normalized hit offset on a paddle rebound.
    pub hit_rebound: f32,
    /// Horizontal speed gained on every paddle hit.
    pub speed_increment: f32,
    /// Cap on either velocity component, so rallies cannot accelerate past
    /// what the fixed tick can resolve.
    pub max_ball_speed: f32,
    /// Constant downward acceleration per tick. Zero for the classic game.
    pub gravity: f32,
    /// Scale in [0, 1] applied to reflected speed on wall and paddle bounces.
    pub bounce_damping: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            win_score: 7,
            serve_speed: 5.0,
            max_serve_vy: 5.0,
            hit_rebound: 5.0,
            speed_increment: 0.25,
            max_ball_speed: 12.0,
            gravity: 0.0,
            bounce_damping: 1.0,
        }
    }
}

/// The authoritative simulation. Owns no state itself; it mutates the shared
/// [`GameState`] one fixed tick at a time.
pub struct Engine {
    config: SimConfig,
}

impl Engine {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Resets score, winner and ball, then activates the rally.
    pub fn start_game(&self, state: &mut GameState) {
        state.left_score = 0;
        state.right_score = 0;
        state.winner.clear();
        self.reset_ball(state);
        state.game_active = true;
    }

    /// Re-centers the ball and serves it with a random velocity. The
    /// horizontal component is always nonzero.
    pub fn reset_ball(&self, state: &mut GameState) {
        let mut rng = rand::thread_rng();

        state.ball_x = (ARENA_WIDTH - BALL_SIZE) / 2.0;
        state.ball_y = (ARENA_HEIGHT - BALL_SIZE) / 2.0;
        state.ball_speed_x = if rng.gen_bool(0.5) {
            self.config.serve_speed
        } else {
            -self.config.serve_speed
        };
        state.ball_speed_y = rng.gen_range(-self.config.max_serve_vy..=self.config.max_serve_vy);
    }

    /// Advances the simulation by one fixed tick. No-op while no rally is
    /// active, including after a winner has been decided.
    pub fn advance(&self, state: &mut GameState) {
        if !state.game_active {
            return;
        }

        // Paddle positions are clamped on write, but the invariant must hold
        // after every tick regardless of who wrote last.
        state.left_paddle_y = clamp_paddle(state.left_paddle_y);
        state.right_paddle_y = clamp_paddle(state.right_paddle_y);

        if self.config.gravity != 0.0 {
            state.ball_speed_y += self.config.gravity;
        }

        state.ball_x += state.ball_speed_x;
        state.ball_y += state.ball_speed_y;

        self.bounce_off_walls(state);
        self.bounce_off_paddles(state);
        self.apply_scoring(state);
        self.check_win(state);
    }

    fn bounce_off_walls(&self, state: &mut GameState) {
        if state.ball_y <= 0.0 {
            state.ball_y = 0.0;
            state.ball_speed_y = -state.ball_speed_y * self.config.bounce_damping;
        } else if state.ball_y + BALL_SIZE >= ARENA_HEIGHT {
            state.ball_y = ARENA_HEIGHT - BALL_SIZE;
            state.ball_speed_y = -state.ball_speed_y * self.config.bounce_damping;
        }
    }

    fn bounce_off_paddles(&self, state: &mut GameState) {
        let left_face = PADDLE_MARGIN + PADDLE_WIDTH;
        let right_edge = ARENA_WIDTH - PADDLE_MARGIN - PADDLE_WIDTH;

        if state.ball_x <= left_face
            && state.ball_x + BALL_SIZE >= PADDLE_MARGIN
            && state.ball_y + BALL_SIZE >= state.left_paddle_y
            && state.ball_y <= state.left_paddle_y + PADDLE_HEIGHT
        {
            let hit_offset = (state.ball_y + BALL_SIZE / 2.0
                - (state.left_paddle_y + PADDLE_HEIGHT / 2.0))
                / (PADDLE_HEIGHT / 2.0);
            self.rebound(state, hit_offset);
            // Snap just outside the paddle so the ball cannot stick inside it.
            state.ball_x = left_face + 1.0;
        }

        if state.ball_x + BALL_SIZE >= right_edge
            && state.ball_x <= ARENA_WIDTH - PADDLE_MARGIN
            && state.ball_y + BALL_SIZE >= state.right_paddle_y
            && state.ball_y <= state.right_paddle_y + PADDLE_HEIGHT
        {
            let hit_offset = (state.ball_y + BALL_SIZE / 2.0
                - (state.right_paddle_y + PADDLE_HEIGHT / 2.0))
                / (PADDLE_HEIGHT / 2.0);
            self.rebound(state, hit_offset);
            state.ball_x = right_edge - BALL_SIZE - 1.0;
        }
    }

    fn rebound(&self, state: &mut GameState, hit_offset: f32) {
        state.ball_speed_y = hit_offset * self.config.hit_rebound;
        state.ball_speed_x = -state.ball_speed_x * self.config.bounce_damping;

        // Each return gets slightly faster, up to the configured cap.
        state.ball_speed_x += self.config.speed_increment * state.ball_speed_x.signum();
        let cap = self.config.max_ball_speed;
        state.ball_speed_x = state.ball_speed_x.clamp(-cap, cap);
        state.ball_speed_y = state.ball_speed_y.clamp(-cap, cap);
    }

    fn apply_scoring(&self, state: &mut GameState) {
        if state.ball_x <= 0.0 {
            state.right_score += 1;
            self.reset_ball(state);
        } else if state.ball_x + BALL_SIZE >= ARENA_WIDTH {
            state.left_score += 1;
            self.reset_ball(state);
        }
    }

    fn check_win(&self, state: &mut GameState) {
        if state.left_score > self.config.win_score {
            state.winner = "Player 1 Wins!".to_string();
            state.game_active = false;
        } else if state.right_score > self.config.win_score {
            state.winner = "Player 2 Wins!".to_string();
            state.game_active = false;
        }
    }
}

/// Dedicated simulation task, spawned once per server process.
///
/// Paces itself at the configured tick rate and skips ticks (never exits)
/// while fewer than two players are connected or no rally is active. When a
/// rally ends with a winner, the readiness set is cleared so the next game
/// requires a fresh handshake.
pub async fn run_simulation(
    engine: Arc<Engine>,
    state: Arc<RwLock<GameState>>,
    registry: Arc<RwLock<Registry>>,
    tick_rate: u32,
) {
    let mut ticker = interval(Duration::from_secs_f32(1.0 / tick_rate as f32));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The first tick fires immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        if registry.read().await.occupied() < 2 {
            continue;
        }

        let finished = {
            let mut state = state.write().await;
            if !state.game_active {
                continue;
            }
            engine.advance(&mut state);
            if state.game_active {
                None
            } else {
                Some(state.winner.clone())
            }
        };

        if let Some(winner) = finished {
            registry.write().await.clear_ready();
            info!("Game over: {}", winner);
        }
    }
}
