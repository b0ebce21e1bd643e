use serde::{Deserialize, Serialize};

/// Y of the ball's top edge while resting on the ground. Y grows downward,
/// as on a canvas, so jumping decreases it.
pub const GROUND_LEVEL: f32 = 300.0;
/// Ball bounding-box size (square).
pub const BALL_SIZE: f32 = 50.0;
/// Fixed x of the ball's left edge.
pub const BALL_X: f32 = 100.0;
/// Maximum height gained by a jump.
pub const JUMP_HEIGHT: f32 = 150.0;
/// Upward speed while jumping (px/tick).
pub const JUMP_SPEED: f32 = 8.0;
/// Downward speed while falling (px/tick).
pub const FALL_SPEED: f32 = 8.0;
/// Obstacle bounding-box width.
pub const OBSTACLE_WIDTH: f32 = 30.0;
/// Obstacle bounding-box height.
pub const OBSTACLE_HEIGHT: f32 = 50.0;
/// X at which new obstacles appear.
pub const SPAWN_X: f32 = 800.0;
/// Seconds between obstacle spawns.
pub const SPAWN_INTERVAL: f32 = 2.0;
/// Seconds between score increments.
pub const SCORE_INTERVAL: f32 = 0.1;
/// Initial obstacle speed (px/tick).
pub const BASE_SPEED: f32 = 5.0;
/// Speed gained every `SPEED_STEP_SCORE` points.
pub const SPEED_STEP: f32 = 0.5;
/// Score interval at which the speed ramps up.
pub const SPEED_STEP_SCORE: u32 = 100;
/// Speed ceiling (px/tick).
pub const MAX_SPEED: f32 = 12.0;

/// Configurable session parameters, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    pub tick_rate_hz: f32,
    pub spawn_interval_secs: f32,
    pub max_speed: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            spawn_interval_secs: SPAWN_INTERVAL,
            max_speed: MAX_SPEED,
        }
    }
}

impl JumpConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is
    /// missing or unparseable.
    pub fn load() -> Self {
        let path =
            std::env::var("ARCADE_JUMP_CONFIG").unwrap_or_else(|_| "config/jump.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<JumpConfig>(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    JumpConfig::default()
                },
            },
            Err(_) => JumpConfig::default(),
        }
    }
}

/// Vertical state of the ball. `y` is the top edge of the ball box; it
/// starts at `GROUND_LEVEL` and falls no lower.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub y: f32,
    pub jumping: bool,
}

impl BallState {
    pub fn new() -> Self {
        Self {
            y: GROUND_LEVEL,
            jumping: false,
        }
    }

    /// Whether the ball is resting on the ground.
    pub fn grounded(&self) -> bool {
        !self.jumping && self.y >= GROUND_LEVEL
    }

    /// Request a jump. Ignored unless grounded: airborne requests never
    /// alter the current trajectory.
    pub fn request_jump(&mut self) {
        if self.grounded() {
            self.jumping = true;
        }
    }

    /// Advance one tick of vertical motion: rise at `JUMP_SPEED` toward the
    /// apex, then fall at `FALL_SPEED`, clamped at the ground.
    pub fn step(&mut self) {
        if self.jumping {
            let apex = GROUND_LEVEL - JUMP_HEIGHT;
            if self.y > apex {
                self.y = (self.y - JUMP_SPEED).max(apex);
            } else {
                self.jumping = false;
            }
        } else if self.y < GROUND_LEVEL {
            self.y = (self.y + FALL_SPEED).min(GROUND_LEVEL);
        }
    }
}

impl Default for BallState {
    fn default() -> Self {
        Self::new()
    }
}

/// A scrolling obstacle. Ids are unique and insertion-ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u64,
    pub x: f32,
    pub height: f32,
}

impl Obstacle {
    /// Top edge of the obstacle box. Obstacles sit on the ground line.
    pub fn top(&self) -> f32 {
        GROUND_LEVEL + BALL_SIZE - self.height
    }

    pub fn bottom(&self) -> f32 {
        GROUND_LEVEL + BALL_SIZE
    }
}

/// Advance all obstacles leftward and prune those fully off-screen. An
/// obstacle is removed iff its right edge has scrolled past x = 0.
pub fn advance_obstacles(obstacles: &mut Vec<Obstacle>, speed: f32) {
    for obs in obstacles.iter_mut() {
        obs.x -= speed;
    }
    obstacles.retain(|obs| obs.x > -OBSTACLE_WIDTH);
}

/// AABB overlap test between the ball box and one obstacle box.
pub fn collides(ball: &BallState, obs: &Obstacle) -> bool {
    let ball_right = BALL_X + BALL_SIZE;
    let ball_bottom = ball.y + BALL_SIZE;
    ball_right > obs.x
        && BALL_X < obs.x + OBSTACLE_WIDTH
        && ball_bottom > obs.top()
        && ball.y < obs.bottom()
}
