pub mod levels;
pub mod physics;

use serde::{Deserialize, Serialize};

use arcade_core::arcade_game_boilerplate;
use arcade_core::game_trait::{ArcadeGame, GameEvent, GameId, GameMetadata};
use arcade_core::input::InputFrame;
use arcade_core::lifecycle::{Command, Lifecycle};
use arcade_core::store::ScoreStore;

use levels::{Catalog, LoadedLevel};
use physics::{Ball, BouncyConfig};

/// Serializable snapshot of a Bouncy Ball session, broadcast to the UI each
/// tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BouncyState {
    pub lifecycle: Lifecycle,
    /// Current level number, 1-based.
    pub level: usize,
    pub lives: u32,
    /// Stars collected in the current level attempt.
    pub level_stars: u32,
    /// Stars collected across the whole session.
    pub total_stars: u32,
    /// Best session total ever observed, persisted across sessions.
    pub best_total_stars: u32,
    pub ball: Ball,
    pub world: LoadedLevel,
}

/// The Bouncy Ball game: gravity, bouncing, stars, spikes, and a finish
/// flag that only opens once every star is collected.
pub struct BouncyBall {
    catalog: Catalog,
    state: BouncyState,
    config: BouncyConfig,
    store: Box<dyn ScoreStore>,
}

impl BouncyBall {
    pub fn new(store: Box<dyn ScoreStore>) -> Self {
        Self::with_config(store, BouncyConfig::load())
    }

    pub fn with_config(store: Box<dyn ScoreStore>, config: BouncyConfig) -> Self {
        let catalog = Catalog::new();
        let world = catalog.load(1).expect("catalog ships at least one level");
        let best_total_stars = store.get(GameId::BouncyBall).unwrap_or(0);
        Self {
            state: BouncyState {
                lifecycle: Lifecycle::Menu,
                level: 1,
                lives: config.starting_lives,
                level_stars: 0,
                total_stars: 0,
                best_total_stars,
                ball: Ball::spawn_at(world.spawn),
                world,
            },
            catalog,
            config,
            store,
        }
    }

    pub fn state(&self) -> &BouncyState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Load level `n` fresh: deep-copied geometry, respawned ball, per-level
    /// progress cleared. Cumulative counters are untouched. Returns false
    /// when `n` is past the catalog.
    fn load_level(&mut self, n: usize) -> bool {
        match self.catalog.load(n) {
            Some(world) => {
                self.state.ball = Ball::spawn_at(world.spawn);
                self.state.world = world;
                self.state.level = n;
                self.state.level_stars = 0;
                true
            },
            None => false,
        }
    }

    /// Re-initialize the whole session at level 1 and enter Playing. Used
    /// by start and restart alike; the persisted best carries over.
    fn start(&mut self) -> Vec<GameEvent> {
        let from = self.state.lifecycle;
        self.state.lives = self.config.starting_lives;
        self.state.total_stars = 0;
        self.load_level(1);
        self.state.lifecycle = Lifecycle::Playing;
        vec![GameEvent::LifecycleChanged {
            from,
            to: Lifecycle::Playing,
        }]
    }

    /// Move to the next level, or finish the game when the catalog runs out.
    fn advance(&mut self) -> Vec<GameEvent> {
        let from = self.state.lifecycle;
        if self.load_level(self.state.level + 1) {
            self.state.lifecycle = Lifecycle::Playing;
            vec![GameEvent::LifecycleChanged {
                from,
                to: Lifecycle::Playing,
            }]
        } else {
            self.state.lifecycle = Lifecycle::GameComplete;
            let mut events = vec![GameEvent::LifecycleChanged {
                from,
                to: Lifecycle::GameComplete,
            }];
            events.extend(self.record_best());
            events
        }
    }

    fn record_best(&mut self) -> Vec<GameEvent> {
        if self.state.total_stars > self.state.best_total_stars {
            self.state.best_total_stars = self.state.total_stars;
            self.store.set(GameId::BouncyBall, self.state.total_stars);
            tracing::info!(stars = self.state.total_stars, "New Bouncy Ball best");
            vec![GameEvent::NewHighScore {
                score: self.state.total_stars,
            }]
        } else {
            Vec::new()
        }
    }

    /// A spike hit or fall-out. Costs a life; the last life ends the
    /// session, otherwise the current level restarts fresh.
    fn lose_life(&mut self) -> Vec<GameEvent> {
        self.state.lives = self.state.lives.saturating_sub(1);
        if self.state.lives == 0 {
            let from = self.state.lifecycle;
            self.state.lifecycle = Lifecycle::GameOver;
            let mut events = vec![GameEvent::LifecycleChanged {
                from,
                to: Lifecycle::GameOver,
            }];
            events.extend(self.record_best());
            events
        } else {
            let level = self.state.level;
            self.load_level(level);
            Vec::new()
        }
    }
}

impl ArcadeGame for BouncyBall {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Bouncy Ball".to_string(),
            description: "Collect all stars and reach the finish!".to_string(),
        }
    }

    fn tick_rate(&self) -> f32 {
        self.config.tick_rate_hz
    }

    fn handle_command(&mut self, command: Command) -> Vec<GameEvent> {
        match (self.state.lifecycle, command) {
            (Lifecycle::Menu, Command::Start | Command::Jump) => self.start(),
            (Lifecycle::LevelComplete, Command::Advance | Command::Jump) => self.advance(),
            (Lifecycle::GameOver | Lifecycle::GameComplete, Command::Restart | Command::Jump) => {
                self.start()
            },
            _ => Vec::new(),
        }
    }

    fn tick(&mut self, input: &InputFrame) -> Vec<GameEvent> {
        if !self.state.lifecycle.is_running() {
            return Vec::new();
        }

        let outcome = {
            let state = &mut self.state;
            physics::step(&mut state.ball, input, &mut state.world)
        };

        let mut events = Vec::new();
        if outcome.stars_collected > 0 {
            self.state.level_stars += outcome.stars_collected;
            self.state.total_stars += outcome.stars_collected;
            events.push(GameEvent::StarCollected {
                level_stars: self.state.level_stars,
                total_stars: self.state.total_stars,
            });
        }

        if outcome.hazard_hit || outcome.fell_out {
            events.extend(self.lose_life());
        } else if outcome.reached_finish {
            let from = self.state.lifecycle;
            self.state.lifecycle = Lifecycle::LevelComplete;
            events.push(GameEvent::LifecycleChanged {
                from,
                to: Lifecycle::LevelComplete,
            });
        }

        events
    }

    arcade_game_boilerplate!(game_id: GameId::BouncyBall);
}
