use std::collections::HashMap;

use arcade_core::game_trait::{ArcadeGame, GameId};
use arcade_core::store::FileScoreStore;

/// Factory function type for creating game instances.
type GameFactory = fn() -> Box<dyn ArcadeGame>;

/// Registry mapping game ids to factory functions.
pub struct GameRegistry {
    factories: HashMap<GameId, GameFactory>,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        self.factories.insert(GameId::BallJump, || {
            Box::new(arcade_jump::BallJump::new(Box::new(
                FileScoreStore::from_env(),
            )))
        });
        self.factories.insert(GameId::BouncyBall, || {
            Box::new(arcade_bouncy::BouncyBall::new(Box::new(
                FileScoreStore::from_env(),
            )))
        });
    }

    pub fn create(&self, game_id: GameId) -> Option<Box<dyn ArcadeGame>> {
        self.factories.get(&game_id).map(|f| f())
    }

    /// Return the number of registered game types.
    pub fn available_games(&self) -> usize {
        self.factories.len()
    }
}
