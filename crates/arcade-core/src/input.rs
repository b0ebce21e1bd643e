use serde::{Deserialize, Serialize};

/// Keys the games recognize. Events for anything else are dropped at the
/// boundary (`Key::from_code` returns `None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    KeyA,
    KeyD,
    KeyW,
}

impl Key {
    pub const COUNT: usize = 7;

    /// Parse a DOM-style key code or key value.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Space" | " " => Some(Key::Space),
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            "ArrowUp" => Some(Key::ArrowUp),
            "KeyA" | "a" | "A" => Some(Key::KeyA),
            "KeyD" | "d" | "D" => Some(Key::KeyD),
            "KeyW" | "w" | "W" => Some(Key::KeyW),
            _ => None,
        }
    }

    /// Whether this key requests a jump. Outside `Playing` the session loop
    /// also treats it as the primary menu action.
    pub fn is_jump(self) -> bool {
        matches!(self, Key::Space | Key::ArrowUp | Key::KeyW)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Read-only per-tick view of the sampler, handed to `ArcadeGame::tick`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// -1.0 (left), 0.0, or +1.0 (right). Left wins when both are held.
    pub move_dir: f32,
    /// A jump key is currently held.
    pub jump_held: bool,
    /// A jump key went down since the previous frame. Consumed by exactly
    /// one frame.
    pub jump_pressed: bool,
}

/// Persistent pressed-key set fed by raw key-down/key-up events.
///
/// Last writer wins per key; no debouncing. Key events may arrive at any
/// point between ticks; `sample` is called once at the start of each tick
/// and is the only reader.
#[derive(Debug, Default)]
pub struct InputSampler {
    pressed: [bool; Key::COUNT],
    jump_pulse: bool,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key going down. A jump key that was not already held arms a
    /// one-shot jump pulse, so OS auto-repeat does not re-trigger it.
    pub fn key_down(&mut self, key: Key) {
        if key.is_jump() && !self.pressed[key.index()] {
            self.jump_pulse = true;
        }
        self.pressed[key.index()] = true;
    }

    /// Record a key going up.
    pub fn key_up(&mut self, key: Key) {
        self.pressed[key.index()] = false;
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed[key.index()]
    }

    fn jump_held(&self) -> bool {
        self.pressed[Key::Space.index()]
            || self.pressed[Key::ArrowUp.index()]
            || self.pressed[Key::KeyW.index()]
    }

    /// Drop a pending jump pulse without sampling. Used when the key that
    /// armed it was spent on a lifecycle transition instead (the press that
    /// starts a game must not also jump on the first tick).
    pub fn discard_pulse(&mut self) {
        self.jump_pulse = false;
    }

    /// Take the per-tick input frame, consuming any pending jump pulse.
    pub fn sample(&mut self) -> InputFrame {
        let move_dir = if self.pressed[Key::ArrowLeft.index()] || self.pressed[Key::KeyA.index()] {
            -1.0
        } else if self.pressed[Key::ArrowRight.index()] || self.pressed[Key::KeyD.index()] {
            1.0
        } else {
            0.0
        };
        let frame = InputFrame {
            move_dir,
            jump_held: self.jump_held(),
            jump_pressed: self.jump_pulse,
        };
        self.jump_pulse = false;
        frame
    }
}
