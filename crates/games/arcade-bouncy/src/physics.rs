use serde::{Deserialize, Serialize};

use arcade_core::input::InputFrame;

use crate::levels::{LoadedLevel, Rect, Star, Vec2};

/// Gravity acceleration (px/tick², downward; canvas y grows down).
pub const GRAVITY: f32 = 0.5;
/// Vertical velocity multiplier on a platform bounce.
pub const BOUNCE_DAMPING: f32 = 0.7;
/// Horizontal speed while a direction key is held (px/tick).
pub const MOVE_SPEED: f32 = 5.0;
/// Vertical impulse applied by a grounded jump (negative = up).
pub const JUMP_FORCE: f32 = -10.0;
/// Ball radius.
pub const BALL_RADIUS: f32 = 20.0;
/// Playfield width.
pub const FIELD_WIDTH: f32 = 800.0;
/// Playfield height.
pub const FIELD_HEIGHT: f32 = 600.0;
/// Extra margin below the playfield before a fall counts as a death.
pub const FALL_GRACE: f32 = 50.0;
/// Landing detection band below a platform's top edge.
const LAND_TOLERANCE: f32 = 10.0;
/// Post-bounce speed below which the ball settles instead of micro-bouncing.
const SETTLE_SPEED: f32 = 1.0;
/// Pickup reach added to the ball radius for star collection.
const STAR_PICKUP_RADIUS: f32 = 15.0;

/// Configurable session parameters, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BouncyConfig {
    pub tick_rate_hz: f32,
    pub starting_lives: u32,
}

impl Default for BouncyConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            starting_lives: 3,
        }
    }
}

impl BouncyConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is
    /// missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("ARCADE_BOUNCY_CONFIG")
            .unwrap_or_else(|_| "config/bouncy.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<BouncyConfig>(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    BouncyConfig::default()
                },
            },
            Err(_) => BouncyConfig::default(),
        }
    }
}

/// The controlled ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub on_ground: bool,
}

impl Ball {
    pub fn spawn_at(point: Vec2) -> Self {
        Self {
            x: point.x,
            y: point.y,
            vx: 0.0,
            vy: 0.0,
            radius: BALL_RADIUS,
            on_ground: false,
        }
    }
}

/// What one physics step observed, for the session state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Stars newly collected this tick.
    pub stars_collected: u32,
    /// The ball touched a spike.
    pub hazard_hit: bool,
    /// The ball fell below the playfield (plus grace margin).
    pub fell_out: bool,
    /// The ball reached the finish zone with every star collected.
    pub reached_finish: bool,
}

/// Advance the ball by one tick against the loaded level.
///
/// Fixed order: input, gravity, position integration, platform resolution,
/// star pickup, spike and fall-out checks, finish check, horizontal clamp.
/// A spike hit or fall-out suppresses a same-tick finish; hazards are
/// checked first and win.
pub fn step(ball: &mut Ball, input: &InputFrame, level: &mut LoadedLevel) -> StepOutcome {
    let mut outcome = StepOutcome::default();

    // Held keys drive velocity directly; there is no friction model
    ball.vx = if input.move_dir < 0.0 {
        -MOVE_SPEED
    } else if input.move_dir > 0.0 {
        MOVE_SPEED
    } else {
        0.0
    };

    // Jump requires ground contact
    if input.jump_held && ball.on_ground {
        ball.vy = JUMP_FORCE;
        ball.on_ground = false;
    }

    ball.vy += GRAVITY;

    ball.x += ball.vx;
    ball.y += ball.vy;

    resolve_platforms(ball, &level.platforms);

    outcome.stars_collected = collect_stars(ball, &mut level.stars);

    for spike in &level.spikes {
        if ball.x + ball.radius > spike.x
            && ball.x - ball.radius < spike.right()
            && ball.y + ball.radius > spike.y
        {
            outcome.hazard_hit = true;
        }
    }
    if ball.y > FIELD_HEIGHT + FALL_GRACE {
        outcome.fell_out = true;
    }

    if !outcome.hazard_hit && !outcome.fell_out {
        let all_collected = level.stars.iter().all(|s| s.collected);
        if all_collected
            && ball.x + ball.radius > level.finish.x
            && ball.x - ball.radius < level.finish.right()
            && ball.y + ball.radius > level.finish.y
        {
            outcome.reached_finish = true;
        }
    }

    // The horizontal clamp never costs a life
    if ball.x - ball.radius < 0.0 {
        ball.x = ball.radius;
    }
    if ball.x + ball.radius > FIELD_WIDTH {
        ball.x = FIELD_WIDTH - ball.radius;
    }

    outcome
}

/// Resolve downward collisions against every platform. All platforms are
/// tested in order; the bounce flips vy, so at most one platform claims a
/// given tick: whichever passes the test first in iteration order.
fn resolve_platforms(ball: &mut Ball, platforms: &[Rect]) {
    ball.on_ground = false;
    for platform in platforms {
        if ball.x + ball.radius > platform.x
            && ball.x - ball.radius < platform.right()
            && ball.y + ball.radius > platform.y
            && ball.y + ball.radius < platform.bottom() + LAND_TOLERANCE
            && ball.vy > 0.0
        {
            ball.y = platform.y - ball.radius;
            ball.vy *= -BOUNCE_DAMPING;
            if ball.vy.abs() < SETTLE_SPEED {
                ball.vy = 0.0;
                ball.on_ground = true;
            }
        }
    }
}

fn collect_stars(ball: &Ball, stars: &mut [Star]) -> u32 {
    let mut collected = 0;
    for star in stars.iter_mut() {
        if star.collected {
            continue;
        }
        let dx = ball.x - star.x;
        let dy = ball.y - star.y;
        if (dx * dx + dy * dy).sqrt() < ball.radius + STAR_PICKUP_RADIUS {
            star.collected = true;
            collected += 1;
        }
    }
    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::Catalog;
    use arcade_core::test_helpers::{held_frame, idle_frame, jump_frame};

    fn level_one() -> LoadedLevel {
        Catalog::new().load(1).expect("level 1 exists")
    }

    /// A bare level with a single wide floor, for focused physics tests.
    fn flat_level() -> LoadedLevel {
        LoadedLevel {
            name: "flat".to_string(),
            platforms: vec![Rect::new(0.0, 550.0, 800.0, 50.0)],
            spikes: Vec::new(),
            stars: vec![Star {
                x: 400.0,
                y: 100.0,
                collected: false,
            }],
            spawn: Vec2::new(400.0, 400.0),
            finish: Rect::new(720.0, 490.0, 40.0, 60.0),
        }
    }

    fn settle(ball: &mut Ball, level: &mut LoadedLevel) {
        for _ in 0..600 {
            step(ball, &idle_frame(), level);
            if ball.on_ground {
                break;
            }
        }
    }

    #[test]
    fn gravity_pulls_the_ball_down() {
        let mut level = flat_level();
        let mut ball = Ball::spawn_at(level.spawn);
        let y_before = ball.y;

        step(&mut ball, &idle_frame(), &mut level);

        assert!(ball.y > y_before, "canvas-y grows downward under gravity");
        assert_eq!(ball.vy, GRAVITY);
    }

    #[test]
    fn ball_settles_on_the_floor() {
        let mut level = flat_level();
        let mut ball = Ball::spawn_at(level.spawn);

        for _ in 0..600 {
            step(&mut ball, &idle_frame(), &mut level);
        }

        assert!(ball.on_ground);
        assert_eq!(ball.vy, 0.0);
        assert!((ball.y - (550.0 - BALL_RADIUS)).abs() < 1e-3);
    }

    #[test]
    fn bounce_reflects_with_damping() {
        let mut level = flat_level();
        let mut ball = Ball::spawn_at(Vec2::new(400.0, 525.0));
        ball.vy = 8.0;

        step(&mut ball, &idle_frame(), &mut level);

        // Landed this tick: vy reflected and damped
        assert_eq!(ball.y, 550.0 - BALL_RADIUS);
        assert!((ball.vy + (8.0 + GRAVITY) * BOUNCE_DAMPING).abs() < 1e-3);
        assert!(!ball.on_ground, "a hard bounce does not settle");
    }

    #[test]
    fn slow_impact_settles_instead_of_micro_bouncing() {
        let mut level = flat_level();
        let mut ball = Ball::spawn_at(Vec2::new(400.0, 529.5));
        ball.vy = 0.5;

        step(&mut ball, &idle_frame(), &mut level);

        assert!(ball.on_ground);
        assert_eq!(ball.vy, 0.0);
        assert_eq!(ball.y, 550.0 - BALL_RADIUS);
    }

    #[test]
    fn jump_requires_ground_contact() {
        let mut level = flat_level();
        let mut ball = Ball::spawn_at(level.spawn);

        // Airborne: jump key held, nothing happens
        step(&mut ball, &jump_frame(), &mut level);
        assert!(ball.vy > 0.0, "airborne jump input must not fire");

        settle(&mut ball, &mut level);
        assert!(ball.on_ground);

        step(&mut ball, &jump_frame(), &mut level);
        assert_eq!(ball.vy, JUMP_FORCE + GRAVITY);
        assert!(!ball.on_ground);
    }

    #[test]
    fn held_direction_drives_velocity_directly() {
        let mut level = flat_level();
        let mut ball = Ball::spawn_at(level.spawn);
        settle(&mut ball, &mut level);

        let x_before = ball.x;
        step(&mut ball, &held_frame(1.0, false), &mut level);
        assert_eq!(ball.x, x_before + MOVE_SPEED);
        assert_eq!(ball.vx, MOVE_SPEED);

        step(&mut ball, &held_frame(-1.0, false), &mut level);
        assert_eq!(ball.vx, -MOVE_SPEED);

        step(&mut ball, &idle_frame(), &mut level);
        assert_eq!(ball.vx, 0.0, "no key held means no drift");
    }

    #[test]
    fn star_pickup_is_idempotent() {
        let mut level = flat_level();
        let mut ball = Ball::spawn_at(level.spawn);
        settle(&mut ball, &mut level);

        // Place the star under the resting ball only now, so the settling
        // fall above did not already sweep through it
        level.stars[0] = Star {
            x: 400.0,
            y: 531.0,
            collected: false,
        };

        let first = step(&mut ball, &idle_frame(), &mut level);
        assert_eq!(first.stars_collected, 1);
        assert!(level.stars[0].collected);

        let second = step(&mut ball, &idle_frame(), &mut level);
        assert_eq!(second.stars_collected, 0, "a collected star stays spent");
    }

    #[test]
    fn star_pickup_radius_matches_reach() {
        let mut level = flat_level();
        let reach = BALL_RADIUS + STAR_PICKUP_RADIUS;
        level.stars[0] = Star {
            x: 400.0 + reach + 1.0,
            y: 550.0 - BALL_RADIUS,
            collected: false,
        };
        let mut ball = Ball::spawn_at(level.spawn);
        settle(&mut ball, &mut level);

        let outcome = step(&mut ball, &idle_frame(), &mut level);
        assert_eq!(outcome.stars_collected, 0, "just out of reach");
    }

    #[test]
    fn spike_detects_bottom_edge_overlap() {
        let mut level = level_one();
        // Spike spans x 380..440, top at y=530
        let mut ball = Ball::spawn_at(Vec2::new(410.0, 505.0));
        ball.vy = 8.0;

        let outcome = step(&mut ball, &idle_frame(), &mut level);
        assert!(outcome.hazard_hit);
    }

    #[test]
    fn spike_misses_when_horizontally_clear() {
        let mut level = level_one();
        let mut ball = Ball::spawn_at(Vec2::new(300.0, 505.0));
        ball.vy = 8.0;

        let outcome = step(&mut ball, &idle_frame(), &mut level);
        assert!(!outcome.hazard_hit);
    }

    #[test]
    fn falling_past_the_grace_margin_is_fatal() {
        let mut level = LoadedLevel {
            platforms: Vec::new(),
            ..flat_level()
        };
        let mut ball = Ball::spawn_at(Vec2::new(400.0, FIELD_HEIGHT + FALL_GRACE - 5.0));
        ball.vy = 4.0;

        let first = step(&mut ball, &idle_frame(), &mut level);
        assert!(!first.fell_out, "still inside the grace margin");

        let second = step(&mut ball, &idle_frame(), &mut level);
        assert!(second.fell_out);
    }

    #[test]
    fn finish_is_gated_on_all_stars() {
        let mut level = flat_level();
        // Park the ball inside the finish zone, on the floor
        let mut ball = Ball::spawn_at(Vec2::new(740.0, 500.0));
        settle(&mut ball, &mut level);

        let blocked = step(&mut ball, &idle_frame(), &mut level);
        assert!(
            !blocked.reached_finish,
            "an uncollected star must block the finish"
        );

        for star in &mut level.stars {
            star.collected = true;
        }
        let open = step(&mut ball, &idle_frame(), &mut level);
        assert!(open.reached_finish);
    }

    #[test]
    fn hazard_beats_finish_in_the_same_tick() {
        let mut level = flat_level();
        for star in &mut level.stars {
            star.collected = true;
        }
        // A spike covering the finish zone
        level.spikes.push(Rect::new(700.0, 530.0, 100.0, 20.0));

        let mut ball = Ball::spawn_at(Vec2::new(740.0, 505.0));
        ball.vy = 8.0;

        let outcome = step(&mut ball, &idle_frame(), &mut level);
        assert!(outcome.hazard_hit);
        assert!(
            !outcome.reached_finish,
            "hazards are checked first and win the tick"
        );
    }

    #[test]
    fn horizontal_clamp_keeps_ball_in_field() {
        let mut level = flat_level();
        let mut ball = Ball::spawn_at(Vec2::new(BALL_RADIUS + 2.0, 400.0));

        for _ in 0..10 {
            step(&mut ball, &held_frame(-1.0, false), &mut level);
            assert!(ball.x >= BALL_RADIUS);
        }
        assert_eq!(ball.x, BALL_RADIUS);

        let mut ball = Ball::spawn_at(Vec2::new(FIELD_WIDTH - BALL_RADIUS - 2.0, 400.0));
        for _ in 0..10 {
            step(&mut ball, &held_frame(1.0, false), &mut level);
        }
        assert_eq!(ball.x, FIELD_WIDTH - BALL_RADIUS);
    }

    #[test]
    fn overlapping_platforms_resolve_to_a_single_bounce() {
        // Two platforms whose landing bands overlap; the first in iteration
        // order claims the bounce because it flips vy.
        let mut level = flat_level();
        level.platforms = vec![
            Rect::new(300.0, 500.0, 200.0, 20.0),
            Rect::new(300.0, 505.0, 200.0, 20.0),
        ];
        let mut ball = Ball::spawn_at(Vec2::new(400.0, 475.0));
        ball.vy = 8.0;

        step(&mut ball, &idle_frame(), &mut level);

        assert_eq!(
            ball.y,
            500.0 - BALL_RADIUS,
            "the first overlapping platform in order wins"
        );
        assert!(ball.vy < 0.0, "exactly one damped reflection");
    }

    #[test]
    fn platform_ignored_when_moving_upward() {
        let mut level = flat_level();
        let mut ball = Ball::spawn_at(Vec2::new(400.0, 545.0));
        ball.vy = -12.0;

        step(&mut ball, &idle_frame(), &mut level);

        assert!(
            ball.vy < 0.0,
            "rising through a platform's band must not snap"
        );
        assert!(ball.y < 545.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Ball dropped from any height onto the floor eventually settles
            // exactly on the surface with zero velocity.
            #[test]
            fn drops_always_settle_on_the_surface(start_y in 0.0f32..500.0) {
                let mut level = flat_level();
                let mut ball = Ball::spawn_at(Vec2::new(400.0, start_y));

                for _ in 0..2000 {
                    step(&mut ball, &idle_frame(), &mut level);
                }

                prop_assert!(ball.on_ground);
                prop_assert_eq!(ball.vy, 0.0);
                prop_assert!((ball.y - (550.0 - BALL_RADIUS)).abs() < 1e-3);
            }

            // Arbitrary input never drives the ball outside the horizontal
            // bounds after a step.
            #[test]
            fn clamp_holds_under_arbitrary_input(
                start_x in BALL_RADIUS..(FIELD_WIDTH - BALL_RADIUS),
                moves in proptest::collection::vec(-1.0f32..=1.0, 1..120)
            ) {
                let mut level = flat_level();
                let mut ball = Ball::spawn_at(Vec2::new(start_x, 400.0));

                for &m in &moves {
                    step(&mut ball, &held_frame(m, false), &mut level);
                    prop_assert!(ball.x >= BALL_RADIUS - 1e-3);
                    prop_assert!(ball.x <= FIELD_WIDTH - BALL_RADIUS + 1e-3);
                }
            }
        }
    }
}
