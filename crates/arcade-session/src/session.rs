use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use arcade_core::game_trait::ArcadeGame;
use arcade_core::input::{InputSampler, Key};
use arcade_core::lifecycle::Command;

/// Commands sent from the UI/event layer into a running session.
#[derive(Debug)]
pub enum SessionCommand {
    KeyDown(Key),
    KeyUp(Key),
    Command(Command),
    Stop,
}

/// Broadcasts from the session to the render/UI consumer.
#[derive(Debug, Clone)]
pub enum SessionBroadcast {
    /// rmp-encoded game snapshot. `Bytes` keeps clones cheap when the
    /// snapshot is fanned out to multiple consumers.
    Snapshot(Bytes),
    /// The session task has exited.
    Ended,
}

/// Spawn a game session as a tokio task.
/// Returns the command sender, the broadcast receiver, and the join handle.
pub fn spawn_session(
    game: Box<dyn ArcadeGame>,
) -> (
    mpsc::UnboundedSender<SessionCommand>,
    mpsc::UnboundedReceiver<SessionBroadcast>,
    JoinHandle<()>,
) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        let mut game = game;
        run_session_loop(&mut *game, cmd_rx, broadcast_tx).await;
    });

    (cmd_tx, broadcast_rx, handle)
}

/// The session loop.
///
/// While the lifecycle is Playing, a fixed-rate interval drives ticks and
/// commands interleave through `select!`; a single task owns the game, so
/// ticks are strictly serial. Leaving Playing drops the interval, so no
/// pending tick can fire; re-entering arms a fresh one.
async fn run_session_loop(
    game: &mut dyn ArcadeGame,
    mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>,
    broadcast_tx: mpsc::UnboundedSender<SessionBroadcast>,
) {
    let mut sampler = InputSampler::new();

    tracing::info!(game = %game.game_id(), "Session started");

    // Initial snapshot so the consumer can draw the menu
    broadcast_snapshot(game, &broadcast_tx);

    'session: loop {
        if game.lifecycle().is_running() {
            let tick_interval = Duration::from_secs_f32(1.0 / game.tick_rate());
            let mut interval = tokio::time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            while game.lifecycle().is_running() {
                tokio::select! {
                    _ = interval.tick() => {
                        let frame = sampler.sample();
                        let events = game.tick(&frame);
                        for event in &events {
                            tracing::debug!(?event, "game event");
                        }
                        broadcast_snapshot(game, &broadcast_tx);
                    }
                    cmd = cmd_rx.recv() => {
                        match cmd {
                            Some(SessionCommand::Stop) | None => break 'session,
                            Some(cmd) => apply_command(game, &mut sampler, cmd, &broadcast_tx),
                        }
                    }
                }
            }
            // The interval is dropped here: any pending tick is cancelled
            // until a command re-enters Playing.
        } else {
            match cmd_rx.recv().await {
                Some(SessionCommand::Stop) | None => break 'session,
                Some(cmd) => apply_command(game, &mut sampler, cmd, &broadcast_tx),
            }
        }
    }

    tracing::info!(game = %game.game_id(), "Session ended");
    let _ = broadcast_tx.send(SessionBroadcast::Ended);
}

fn apply_command(
    game: &mut dyn ArcadeGame,
    sampler: &mut InputSampler,
    cmd: SessionCommand,
    broadcast_tx: &mpsc::UnboundedSender<SessionBroadcast>,
) {
    let before = game.lifecycle();
    match cmd {
        SessionCommand::KeyDown(key) => {
            sampler.key_down(key);
            // Outside Playing, a jump key doubles as the primary action;
            // the game maps it to start, advance, or restart.
            if key.is_jump() && !before.is_running() {
                for event in game.handle_command(Command::Jump) {
                    tracing::debug!(?event, "command event");
                }
            }
        },
        SessionCommand::KeyUp(key) => sampler.key_up(key),
        SessionCommand::Command(command) => {
            for event in game.handle_command(command) {
                tracing::debug!(?event, "command event");
            }
        },
        // Stop is filtered by the loop before reaching here
        SessionCommand::Stop => {},
    }
    if game.lifecycle() != before {
        if game.lifecycle().is_running() {
            // The press that (re)started the game is spent; it must not
            // double as the first jump of the new run.
            sampler.discard_pulse();
        }
        broadcast_snapshot(game, broadcast_tx);
    }
}

fn broadcast_snapshot(
    game: &dyn ArcadeGame,
    broadcast_tx: &mpsc::UnboundedSender<SessionBroadcast>,
) {
    let _ = broadcast_tx.send(SessionBroadcast::Snapshot(Bytes::from(
        game.serialize_snapshot(),
    )));
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_bouncy::{BouncyBall, BouncyState};
    use arcade_core::lifecycle::Lifecycle;
    use arcade_core::store::MemoryScoreStore;
    use arcade_jump::{BallJump, JumpState};

    fn jump_game() -> Box<dyn ArcadeGame> {
        Box::new(BallJump::with_config(
            Box::new(MemoryScoreStore::new()),
            arcade_jump::physics::JumpConfig::default(),
        ))
    }

    fn bouncy_game() -> Box<dyn ArcadeGame> {
        Box::new(BouncyBall::with_config(
            Box::new(MemoryScoreStore::new()),
            arcade_bouncy::physics::BouncyConfig::default(),
        ))
    }

    async fn recv_snapshot(rx: &mut mpsc::UnboundedReceiver<SessionBroadcast>) -> Option<Bytes> {
        match tokio::time::timeout(Duration::from_millis(500), rx.recv()).await {
            Ok(Some(SessionBroadcast::Snapshot(data))) => Some(data),
            _ => None,
        }
    }

    #[tokio::test]
    async fn session_opens_with_a_menu_snapshot_and_stays_quiet() {
        let (cmd_tx, mut rx, handle) = spawn_session(jump_game());

        let data = recv_snapshot(&mut rx).await.expect("initial snapshot");
        let state: JumpState = rmp_serde::from_slice(&data).expect("decodes");
        assert_eq!(state.lifecycle, Lifecycle::Menu);

        // No ticks run while in Menu, so nothing else arrives
        let quiet = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(quiet.is_err(), "Menu must not produce tick snapshots");

        let _ = cmd_tx.send(SessionCommand::Stop);
        let _ = handle.await;
    }

    #[tokio::test]
    async fn start_command_begins_ticking() {
        let (cmd_tx, mut rx, handle) = spawn_session(jump_game());
        let _ = recv_snapshot(&mut rx).await;

        let _ = cmd_tx.send(SessionCommand::Command(Command::Start));

        // The transition snapshot, then tick snapshots
        let data = recv_snapshot(&mut rx).await.expect("transition snapshot");
        let state: JumpState = rmp_serde::from_slice(&data).expect("decodes");
        assert_eq!(state.lifecycle, Lifecycle::Playing);

        let data = recv_snapshot(&mut rx).await.expect("tick snapshot");
        let state: JumpState = rmp_serde::from_slice(&data).expect("decodes");
        assert_eq!(state.lifecycle, Lifecycle::Playing);

        let _ = cmd_tx.send(SessionCommand::Stop);
        let _ = handle.await;
    }

    #[tokio::test]
    async fn space_key_starts_from_the_menu() {
        let (cmd_tx, mut rx, handle) = spawn_session(jump_game());
        let _ = recv_snapshot(&mut rx).await;

        let _ = cmd_tx.send(SessionCommand::KeyDown(Key::Space));

        let data = recv_snapshot(&mut rx).await.expect("snapshot after space");
        let state: JumpState = rmp_serde::from_slice(&data).expect("decodes");
        assert_eq!(state.lifecycle, Lifecycle::Playing);

        let _ = cmd_tx.send(SessionCommand::Stop);
        let _ = handle.await;
    }

    #[tokio::test]
    async fn movement_keys_do_not_start_the_game() {
        let (cmd_tx, mut rx, handle) = spawn_session(jump_game());
        let _ = recv_snapshot(&mut rx).await;

        let _ = cmd_tx.send(SessionCommand::KeyDown(Key::ArrowLeft));
        let quiet = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(quiet.is_err(), "a movement key is not the primary action");

        let _ = cmd_tx.send(SessionCommand::Stop);
        let _ = handle.await;
    }

    #[tokio::test]
    async fn stop_emits_ended() {
        let (cmd_tx, mut rx, handle) = spawn_session(jump_game());
        let _ = recv_snapshot(&mut rx).await;

        let _ = cmd_tx.send(SessionCommand::Stop);

        let mut got_ended = false;
        for _ in 0..10 {
            match tokio::time::timeout(Duration::from_millis(500), rx.recv()).await {
                Ok(Some(SessionBroadcast::Ended)) => {
                    got_ended = true;
                    break;
                },
                Ok(Some(_)) => continue,
                _ => break,
            }
        }
        assert!(got_ended, "Stop must produce an Ended broadcast");
        let _ = handle.await;
    }

    #[tokio::test]
    async fn dropping_the_command_sender_ends_the_session() {
        let (cmd_tx, mut rx, handle) = spawn_session(bouncy_game());
        let _ = recv_snapshot(&mut rx).await;

        drop(cmd_tx);

        let mut got_ended = false;
        for _ in 0..10 {
            match tokio::time::timeout(Duration::from_millis(500), rx.recv()).await {
                Ok(Some(SessionBroadcast::Ended)) => {
                    got_ended = true;
                    break;
                },
                Ok(Some(_)) => continue,
                _ => break,
            }
        }
        assert!(got_ended);
        let _ = handle.await;
    }

    #[tokio::test]
    async fn held_key_input_reaches_the_simulation() {
        let (cmd_tx, mut rx, handle) = spawn_session(bouncy_game());
        let _ = recv_snapshot(&mut rx).await;

        let _ = cmd_tx.send(SessionCommand::Command(Command::Start));
        let _ = cmd_tx.send(SessionCommand::KeyDown(Key::ArrowRight));

        let data = recv_snapshot(&mut rx).await.expect("snapshot");
        let initial: BouncyState = rmp_serde::from_slice(&data).expect("decodes");
        let start_x = initial.ball.x;

        // Drain snapshots until movement shows up
        let mut moved = false;
        for _ in 0..60 {
            let Some(data) = recv_snapshot(&mut rx).await else {
                break;
            };
            let state: BouncyState = rmp_serde::from_slice(&data).expect("decodes");
            if state.ball.x > start_x {
                moved = true;
                break;
            }
        }
        assert!(moved, "held ArrowRight must move the ball right");

        let _ = cmd_tx.send(SessionCommand::Stop);
        let _ = handle.await;
    }

    #[tokio::test]
    async fn commands_for_other_states_are_ignored_in_menu() {
        let (cmd_tx, mut rx, handle) = spawn_session(bouncy_game());
        let _ = recv_snapshot(&mut rx).await;

        let _ = cmd_tx.send(SessionCommand::Command(Command::Advance));
        let _ = cmd_tx.send(SessionCommand::Command(Command::Restart));

        // Neither command transitions, so no snapshot is broadcast
        let quiet = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(quiet.is_err());

        let _ = cmd_tx.send(SessionCommand::Stop);
        let _ = handle.await;
    }
}
