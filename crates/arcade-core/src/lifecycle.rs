use serde::{Deserialize, Serialize};

/// Lifecycle state of a game session.
///
/// One instance per session; transitions happen only inside the owning
/// game's command and tick handling. The scheduler reads it to decide
/// whether the tick loop should run at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Start screen; nothing simulates.
    Menu,
    /// The tick loop is live.
    Playing,
    /// A level was finished with every star collected (platformer only).
    LevelComplete,
    /// The session ended in a loss.
    GameOver,
    /// Every level in the catalog was finished (platformer only).
    GameComplete,
}

impl Lifecycle {
    /// Whether the scheduler should be driving ticks.
    pub fn is_running(self) -> bool {
        matches!(self, Lifecycle::Playing)
    }
}

/// Discrete commands the UI can issue.
///
/// Each maps to exactly one lifecycle transition for the current state, or
/// to a no-op; games never reject a command with an error. `Jump` doubles
/// as the primary keyboard action: outside `Playing` the games interpret it
/// as start / advance / restart, matching the space-bar behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Start,
    Advance,
    Restart,
    Jump,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_playing_is_running() {
        assert!(Lifecycle::Playing.is_running());
        for state in [
            Lifecycle::Menu,
            Lifecycle::LevelComplete,
            Lifecycle::GameOver,
            Lifecycle::GameComplete,
        ] {
            assert!(!state.is_running(), "{state:?} must not run the scheduler");
        }
    }
}
