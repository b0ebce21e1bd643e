pub mod game_trait;
pub mod input;
pub mod lifecycle;
pub mod store;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_trait::{ArcadeGame, GameEvent};
    use crate::input::InputFrame;
    use crate::lifecycle::{Command, Lifecycle};

    /// An input frame with nothing held.
    pub fn idle_frame() -> InputFrame {
        InputFrame::default()
    }

    /// An input frame holding a movement direction, optionally with a jump
    /// key held.
    pub fn held_frame(move_dir: f32, jump_held: bool) -> InputFrame {
        InputFrame {
            move_dir,
            jump_held,
            jump_pressed: false,
        }
    }

    /// A frame carrying a one-shot jump edge.
    pub fn jump_frame() -> InputFrame {
        InputFrame {
            move_dir: 0.0,
            jump_held: true,
            jump_pressed: true,
        }
    }

    /// Run `n` ticks with the given frame, returning all accumulated events.
    pub fn run_ticks(game: &mut dyn ArcadeGame, n: usize, frame: InputFrame) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            events.extend(game.tick(&frame));
        }
        events
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Generic assertions every ArcadeGame implementation must satisfy.
    // Game crates call them from their own #[cfg(test)] modules with a
    // freshly constructed game.

    /// A freshly constructed game sits in Menu and serializes to non-empty
    /// bytes.
    pub fn contract_new_game_in_menu(game: &dyn ArcadeGame) {
        assert_eq!(
            game.lifecycle(),
            Lifecycle::Menu,
            "new game must start in Menu"
        );
        assert!(
            !game.serialize_snapshot().is_empty(),
            "snapshot must be non-empty"
        );
    }

    /// `Start` from Menu enters Playing and reports the transition.
    pub fn contract_start_enters_playing(game: &mut dyn ArcadeGame) {
        let events = game.handle_command(Command::Start);
        assert_eq!(game.lifecycle(), Lifecycle::Playing);
        assert!(
            events.iter().any(|e| matches!(
                e,
                GameEvent::LifecycleChanged {
                    to: Lifecycle::Playing,
                    ..
                }
            )),
            "Start must report a LifecycleChanged into Playing"
        );
    }

    /// Commands invalid for Menu leave the state untouched and emit nothing.
    pub fn contract_invalid_commands_are_noops(game: &mut dyn ArcadeGame) {
        let before = game.serialize_snapshot();
        for command in [Command::Advance, Command::Restart] {
            let events = game.handle_command(command);
            assert!(events.is_empty(), "{command:?} in Menu must emit no events");
        }
        assert_eq!(
            before,
            game.serialize_snapshot(),
            "invalid commands must not change state"
        );
    }

    /// Ticks outside Playing do not mutate state.
    pub fn contract_tick_gated_on_playing(game: &mut dyn ArcadeGame) {
        let before = game.serialize_snapshot();
        let events = run_ticks(game, 5, idle_frame());
        assert!(events.is_empty(), "ticks outside Playing must emit no events");
        assert_eq!(
            before,
            game.serialize_snapshot(),
            "ticks outside Playing must not change state"
        );
    }

    /// Ticking while Playing advances the simulation.
    pub fn contract_tick_advances_state(game: &mut dyn ArcadeGame) {
        game.handle_command(Command::Start);
        let before = game.serialize_snapshot();
        run_ticks(game, 30, idle_frame());
        assert_ne!(
            before,
            game.serialize_snapshot(),
            "30 ticks of Playing must change state"
        );
    }
}
