use crate::core::math::MathError;
use crate::io::config::AnimationConfig;
use crate::scene::camera::{Camera, Direction};
use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown key {0:?}, expected one of W, A, S, D")]
    UnknownKey(String),
}

/// Movement keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
}

impl FromStr for Key {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" => Ok(Key::W),
            "a" => Ok(Key::A),
            "s" => Ok(Key::S),
            "d" => Ok(Key::D),
            _ => Err(InputError::UnknownKey(s.to_string())),
        }
    }
}

/// Snapshot of the devices for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pressed: HashSet<Key>,
    cursor: Option<(f64, f64)>,
}

impl InputState {
    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.pressed.remove(&key);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Absolute cursor position, if the cursor moved this frame.
    pub fn set_cursor(&mut self, x: f64, y: f64) {
        self.cursor = Some((x, y));
    }

    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.cursor
    }
}

/// Maps WASD to fixed-size camera steps and cursor motion to mouse-look.
pub struct CameraController {
    /// Distance moved per frame while a key is held.
    pub speed: f32,
}

impl CameraController {
    const BINDINGS: [(Key, Direction); 4] = [
        (Key::W, Direction::Forward),
        (Key::S, Direction::Backward),
        (Key::A, Direction::Left),
        (Key::D, Direction::Right),
    ];

    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Applies held keys first, then the cursor, matching a poll-then-events
    /// frame loop.
    pub fn update(&self, input: &InputState, camera: &mut Camera) -> Result<(), MathError> {
        for (key, direction) in Self::BINDINGS {
            if input.is_down(key) {
                camera.move_camera(direction, self.speed)?;
            }
        }
        if let Some((x, y)) = input.cursor() {
            camera.rotate(x, y);
        }
        Ok(())
    }
}

/// Replays a fixed input pattern for headless animations: the same keys
/// held every frame and the cursor drifting by a constant step.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    keys: Vec<Key>,
    step: (f64, f64),
    cursor: (f64, f64),
}

impl ScriptedInput {
    pub fn new(keys: Vec<Key>, step: (f64, f64)) -> Self {
        Self {
            keys,
            step,
            cursor: (0.0, 0.0),
        }
    }

    pub fn from_config(animation: &AnimationConfig) -> Result<Self, InputError> {
        let keys = animation
            .keys
            .iter()
            .map(|k| k.parse())
            .collect::<Result<Vec<Key>, _>>()?;
        let [dx, dy] = animation.mouse_step;
        Ok(Self::new(keys, (dx as f64, dy as f64)))
    }

    /// Input for the next frame. The first frame reports the starting cursor,
    /// which the camera only records as its reference.
    pub fn next_frame(&mut self) -> InputState {
        let mut state = InputState::default();
        for &key in &self.keys {
            state.press(key);
        }
        state.set_cursor(self.cursor.0, self.cursor.1);
        self.cursor.0 += self.step.0;
        self.cursor.1 += self.step.1;
        state
    }
}
