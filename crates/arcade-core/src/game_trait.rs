use serde::{Deserialize, Serialize};

use crate::input::InputFrame;
use crate::lifecycle::{Command, Lifecycle};

/// Stable identifier for a game, used as the high-score storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameId {
    BallJump,
    BouncyBall,
}

impl GameId {
    /// Key under which this game's persisted record is stored.
    pub fn storage_key(self) -> &'static str {
        match self {
            GameId::BallJump => "ball-jump",
            GameId::BouncyBall => "bouncy-ball",
        }
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// Game metadata for menu/overlay display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
}

/// Events emitted by a game during a tick or command.
///
/// The session loop logs these; a UI consumer may use them to drive sound
/// or overlay effects without diffing snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LifecycleChanged { from: Lifecycle, to: Lifecycle },
    ScoreUpdate { score: u32 },
    StarCollected { level_stars: u32, total_stars: u32 },
    NewHighScore { score: u32 },
}

/// Core trait that both arcade games implement.
///
/// The runtime owns scheduling, input sampling, and snapshot broadcast;
/// the game only handles its simulation and lifecycle transitions.
pub trait ArcadeGame: Send + Sync {
    /// Game metadata for the menu screen.
    fn metadata(&self) -> GameMetadata;

    /// Stable identifier, doubling as the persisted-score key.
    fn game_id(&self) -> GameId;

    /// Current lifecycle state. The scheduler only ticks while this is
    /// `Playing`.
    fn lifecycle(&self) -> Lifecycle;

    /// Apply a UI command. Commands invalid for the current state are
    /// silent no-ops; the returned events describe what actually happened.
    fn handle_command(&mut self, command: Command) -> Vec<GameEvent>;

    /// Advance the simulation by one fixed tick with the sampled input.
    fn tick(&mut self, input: &InputFrame) -> Vec<GameEvent>;

    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// Serialize the full state snapshot for the render/UI consumer. The
    /// consumer must treat the decoded value as read-only.
    fn serialize_snapshot(&self) -> Vec<u8>;
}

/// Generates the `ArcadeGame` methods that are identical across both games:
/// `game_id`, `lifecycle`, `serialize_snapshot`.
///
/// Requires the implementing struct to have a `state` field whose type has a
/// `lifecycle: Lifecycle` field and derives `Serialize`.
#[macro_export]
macro_rules! arcade_game_boilerplate {
    (game_id: $id:expr) => {
        fn game_id(&self) -> $crate::game_trait::GameId {
            $id
        }

        fn lifecycle(&self) -> $crate::lifecycle::Lifecycle {
            self.state.lifecycle
        }

        fn serialize_snapshot(&self) -> Vec<u8> {
            rmp_serde::to_vec(&self.state).expect("snapshot serialization must succeed")
        }
    };
}
