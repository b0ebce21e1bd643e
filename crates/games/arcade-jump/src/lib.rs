pub mod physics;

use serde::{Deserialize, Serialize};

use arcade_core::arcade_game_boilerplate;
use arcade_core::game_trait::{ArcadeGame, GameEvent, GameId, GameMetadata};
use arcade_core::input::InputFrame;
use arcade_core::lifecycle::{Command, Lifecycle};
use arcade_core::store::ScoreStore;

use physics::{
    BASE_SPEED, BallState, JumpConfig, OBSTACLE_HEIGHT, Obstacle, SCORE_INTERVAL, SPAWN_X,
    SPEED_STEP, SPEED_STEP_SCORE, advance_obstacles, collides,
};

/// Serializable snapshot of a Ball Jump session, broadcast to the UI each
/// tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JumpState {
    pub lifecycle: Lifecycle,
    pub ball: BallState,
    pub obstacles: Vec<Obstacle>,
    pub score: u32,
    pub high_score: u32,
    pub game_speed: f32,
    pub score_timer: f32,
    pub spawn_timer: f32,
    pub next_obstacle_id: u64,
}

/// The Ball Jump game: a single vertical degree of freedom, scrolling
/// obstacles, and a run that ends on the first collision.
pub struct BallJump {
    state: JumpState,
    config: JumpConfig,
    store: Box<dyn ScoreStore>,
}

impl BallJump {
    pub fn new(store: Box<dyn ScoreStore>) -> Self {
        Self::with_config(store, JumpConfig::load())
    }

    pub fn with_config(store: Box<dyn ScoreStore>, config: JumpConfig) -> Self {
        let high_score = store.get(GameId::BallJump).unwrap_or(0);
        Self {
            state: JumpState {
                lifecycle: Lifecycle::Menu,
                ball: BallState::new(),
                obstacles: Vec::new(),
                score: 0,
                high_score,
                game_speed: BASE_SPEED,
                score_timer: 0.0,
                spawn_timer: 0.0,
                next_obstacle_id: 0,
            },
            config,
            store,
        }
    }

    pub fn state(&self) -> &JumpState {
        &self.state
    }

    /// Reset every per-run value and enter Playing. Used by both the start
    /// and restart transitions; the high score carries over.
    fn start(&mut self) -> Vec<GameEvent> {
        let from = self.state.lifecycle;
        self.state.lifecycle = Lifecycle::Playing;
        self.state.ball = BallState::new();
        self.state.obstacles.clear();
        self.state.score = 0;
        self.state.game_speed = BASE_SPEED;
        self.state.score_timer = 0.0;
        self.state.spawn_timer = 0.0;
        vec![GameEvent::LifecycleChanged {
            from,
            to: Lifecycle::Playing,
        }]
    }

    fn game_over(&mut self) -> Vec<GameEvent> {
        let from = self.state.lifecycle;
        self.state.lifecycle = Lifecycle::GameOver;
        let mut events = vec![GameEvent::LifecycleChanged {
            from,
            to: Lifecycle::GameOver,
        }];
        if self.state.score > self.state.high_score {
            self.state.high_score = self.state.score;
            self.store.set(GameId::BallJump, self.state.score);
            tracing::info!(score = self.state.score, "New Ball Jump record");
            events.push(GameEvent::NewHighScore {
                score: self.state.score,
            });
        }
        events
    }
}

impl ArcadeGame for BallJump {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Ball Jump".to_string(),
            description: "Time your jumps over the scrolling obstacles.".to_string(),
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.tick_rate_hz
    }

    fn handle_command(&mut self, command: Command) -> Vec<GameEvent> {
        match (self.state.lifecycle, command) {
            (Lifecycle::Menu, Command::Start | Command::Jump) => self.start(),
            (Lifecycle::Playing, Command::Jump) => {
                self.state.ball.request_jump();
                Vec::new()
            },
            (Lifecycle::GameOver, Command::Restart | Command::Jump) => self.start(),
            _ => Vec::new(),
        }
    }

    fn tick(&mut self, input: &InputFrame) -> Vec<GameEvent> {
        if !self.state.lifecycle.is_running() {
            return Vec::new();
        }

        let dt = 1.0 / self.config.tick_rate_hz;
        let mut events = Vec::new();

        if input.jump_pressed {
            self.state.ball.request_jump();
        }
        self.state.ball.step();

        self.state.spawn_timer += dt;
        while self.state.spawn_timer >= self.config.spawn_interval_secs {
            self.state.spawn_timer -= self.config.spawn_interval_secs;
            let id = self.state.next_obstacle_id;
            self.state.next_obstacle_id += 1;
            self.state.obstacles.push(Obstacle {
                id,
                x: SPAWN_X,
                height: OBSTACLE_HEIGHT,
            });
        }

        advance_obstacles(&mut self.state.obstacles, self.state.game_speed);

        if self
            .state
            .obstacles
            .iter()
            .any(|obs| collides(&self.state.ball, obs))
        {
            events.extend(self.game_over());
            return events;
        }

        // Score ticks on simulated time, independent of obstacle spacing
        self.state.score_timer += dt;
        while self.state.score_timer >= SCORE_INTERVAL {
            self.state.score_timer -= SCORE_INTERVAL;
            self.state.score += 1;
            events.push(GameEvent::ScoreUpdate {
                score: self.state.score,
            });
            if self.state.score % SPEED_STEP_SCORE == 0 {
                self.state.game_speed =
                    (self.state.game_speed + SPEED_STEP).min(self.config.max_speed);
            }
        }

        events
    }

    arcade_game_boilerplate!(game_id: GameId::BallJump);
}
