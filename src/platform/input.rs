//! Keyboard and touch input mapping
//!
//! Held keys and touches collapse into four movement intents that the tick
//! samples once. Pause and mute are commands, fired on the press edge only so
//! key auto-repeat can't flicker them.

use std::collections::HashSet;

use crate::sim::TickInput;

/// One-shot commands handled outside the tick loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    ToggleMute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Direction {
    Up,
    Down,
    Left,
    Right,
}

fn key_direction(key: &str) -> Option<Direction> {
    match key {
        "ArrowUp" | "w" | "W" => Some(Direction::Up),
        "ArrowDown" | "s" | "S" => Some(Direction::Down),
        "ArrowLeft" | "a" | "A" => Some(Direction::Left),
        "ArrowRight" | "d" | "D" => Some(Direction::Right),
        _ => None,
    }
}

fn key_command(key: &str) -> Option<Command> {
    match key {
        "p" | "P" | "Escape" => Some(Command::TogglePause),
        "m" | "M" => Some(Command::ToggleMute),
        _ => None,
    }
}

/// Intents for a touch at `(x, y)` on a `width` x `height` surface.
///
/// The surface is split into a 3x3 grid: the outer columns steer left/right,
/// the outer rows steer up/down, corners give diagonals and the middle cell
/// does nothing.
pub fn touch_intent(x: f32, y: f32, width: f32, height: f32) -> TickInput {
    if width <= 0.0 || height <= 0.0 {
        return TickInput::default();
    }
    let col = (x / width * 3.0).floor();
    let row = (y / height * 3.0).floor();
    TickInput {
        up: row < 1.0,
        down: row >= 2.0,
        left: col < 1.0,
        right: col >= 2.0,
    }
}

/// Current state of every input source
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held_keys: HashSet<Direction>,
    /// Command keys currently down, for edge detection
    held_commands: HashSet<String>,
    /// Active touches by identifier
    touches: Vec<(i32, TickInput)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key press. Returns a command on its first press only.
    pub fn key_down(&mut self, key: &str) -> Option<Command> {
        if let Some(dir) = key_direction(key) {
            self.held_keys.insert(dir);
            return None;
        }
        let command = key_command(key)?;
        self.held_commands
            .insert(key.to_string())
            .then_some(command)
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(dir) = key_direction(key) {
            self.held_keys.remove(&dir);
        } else {
            self.held_commands.remove(key);
        }
    }

    /// Start or move a touch
    pub fn touch(&mut self, id: i32, x: f32, y: f32, width: f32, height: f32) {
        let intent = touch_intent(x, y, width, height);
        match self.touches.iter_mut().find(|(t, _)| *t == id) {
            Some(entry) => entry.1 = intent,
            None => self.touches.push((id, intent)),
        }
    }

    pub fn touch_end(&mut self, id: i32) {
        self.touches.retain(|(t, _)| *t != id);
    }

    /// Drop everything held, e.g. when the window loses focus
    pub fn clear(&mut self) {
        self.held_keys.clear();
        self.held_commands.clear();
        self.touches.clear();
    }

    /// Movement intents for the next tick
    pub fn sample(&self) -> TickInput {
        let mut input = TickInput {
            up: self.held_keys.contains(&Direction::Up),
            down: self.held_keys.contains(&Direction::Down),
            left: self.held_keys.contains(&Direction::Left),
            right: self.held_keys.contains(&Direction::Right),
        };
        for (_, t) in &self.touches {
            input.up |= t.up;
            input.down |= t.down;
            input.left |= t.left;
            input.right |= t.right;
        }
        input
    }
}
