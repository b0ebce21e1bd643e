use serde::{Deserialize, Serialize};

/// A 2D point. Y grows downward, as on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// A collectible star. `collected` only moves false → true during an
/// attempt; a fresh load is the one thing that resets it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub collected: bool,
}

impl Star {
    const fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            collected: false,
        }
    }
}

/// Finish zone dimensions; level descriptors only store its anchor point.
pub const FINISH_WIDTH: f32 = 40.0;
pub const FINISH_HEIGHT: f32 = 60.0;

/// Immutable description of one level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSpec {
    pub name: String,
    pub platforms: Vec<Rect>,
    pub spikes: Vec<Rect>,
    pub stars: Vec<Star>,
    pub spawn: Vec2,
    pub finish: Vec2,
}

/// Mutable per-attempt copy of a level, handed to the physics engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedLevel {
    pub name: String,
    pub platforms: Vec<Rect>,
    pub spikes: Vec<Rect>,
    pub stars: Vec<Star>,
    pub spawn: Vec2,
    pub finish: Rect,
}

/// The ordered, immutable level catalog. Levels are indexed from 1.
#[derive(Debug, Clone)]
pub struct Catalog {
    levels: Vec<LevelSpec>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            levels: all_levels(),
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Produce a fresh mutable copy of level `n` (1-based): deep-copied
    /// geometry, every star uncollected. Returns `None` past the end of the
    /// catalog: the all-levels-finished signal, not an error.
    pub fn load(&self, n: usize) -> Option<LoadedLevel> {
        let spec = self.levels.get(n.checked_sub(1)?)?;
        Some(LoadedLevel {
            name: spec.name.clone(),
            platforms: spec.platforms.clone(),
            spikes: spec.spikes.clone(),
            stars: spec
                .stars
                .iter()
                .map(|s| Star {
                    collected: false,
                    ..*s
                })
                .collect(),
            spawn: spec.spawn,
            finish: Rect::new(spec.finish.x, spec.finish.y, FINISH_WIDTH, FINISH_HEIGHT),
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// The three shipped levels.
fn all_levels() -> Vec<LevelSpec> {
    vec![
        LevelSpec {
            name: "Level 1: The Beginning".to_string(),
            platforms: vec![
                Rect::new(0.0, 550.0, 800.0, 50.0), // Ground
                Rect::new(200.0, 450.0, 150.0, 20.0),
                Rect::new(450.0, 350.0, 150.0, 20.0),
            ],
            stars: vec![
                Star::at(270.0, 400.0),
                Star::at(520.0, 300.0),
                Star::at(650.0, 450.0),
            ],
            spikes: vec![Rect::new(380.0, 530.0, 60.0, 20.0)],
            spawn: Vec2::new(50.0, 400.0),
            finish: Vec2::new(720.0, 490.0),
        },
        LevelSpec {
            name: "Level 2: The Gap".to_string(),
            platforms: vec![
                Rect::new(0.0, 550.0, 250.0, 50.0),
                Rect::new(550.0, 550.0, 250.0, 50.0),
                Rect::new(150.0, 400.0, 100.0, 20.0),
                Rect::new(350.0, 450.0, 100.0, 20.0),
                Rect::new(550.0, 400.0, 100.0, 20.0),
            ],
            stars: vec![
                Star::at(190.0, 350.0),
                Star::at(390.0, 400.0),
                Star::at(590.0, 350.0),
            ],
            spikes: vec![Rect::new(260.0, 530.0, 280.0, 20.0)],
            spawn: Vec2::new(50.0, 400.0),
            finish: Vec2::new(720.0, 490.0),
        },
        LevelSpec {
            name: "Level 3: The Tower".to_string(),
            platforms: vec![
                Rect::new(0.0, 550.0, 800.0, 50.0),
                Rect::new(100.0, 480.0, 120.0, 20.0),
                Rect::new(580.0, 480.0, 120.0, 20.0),
                Rect::new(100.0, 380.0, 120.0, 20.0),
                Rect::new(580.0, 380.0, 120.0, 20.0),
                Rect::new(340.0, 280.0, 120.0, 20.0),
            ],
            stars: vec![
                Star::at(150.0, 430.0),
                Star::at(630.0, 430.0),
                Star::at(150.0, 330.0),
                Star::at(630.0, 330.0),
                Star::at(390.0, 230.0),
            ],
            spikes: vec![
                Rect::new(230.0, 530.0, 80.0, 20.0),
                Rect::new(490.0, 530.0, 80.0, 20.0),
            ],
            spawn: Vec2::new(50.0, 400.0),
            finish: Vec2::new(720.0, 490.0),
        },
    ]
}
