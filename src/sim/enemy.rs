//! Dog AI
//!
//! Each dog is either wandering or chasing, re-decided every tick from
//! whether the player is inside its sighted box. Dogs collide against the
//! coarse [`EnemyBuildingObject`] boxes, never the fine roof staircase.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::AxisBox;
use super::movement::{MoveMode, normalize_step, try_move};
use super::world::EnemyBuildingObject;

/// Wander heading: eight compass points or standing still
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Heading {
    #[default]
    None,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Heading {
    pub const ALL: [Heading; 9] = [
        Heading::None,
        Heading::North,
        Heading::NorthEast,
        Heading::East,
        Heading::SouthEast,
        Heading::South,
        Heading::SouthWest,
        Heading::West,
        Heading::NorthWest,
    ];

    /// Unit grid direction, screen coordinates (y grows downward)
    pub fn components(self) -> (f32, f32) {
        match self {
            Heading::None => (0.0, 0.0),
            Heading::North => (0.0, -1.0),
            Heading::NorthEast => (1.0, -1.0),
            Heading::East => (1.0, 0.0),
            Heading::SouthEast => (1.0, 1.0),
            Heading::South => (0.0, 1.0),
            Heading::SouthWest => (-1.0, 1.0),
            Heading::West => (-1.0, 0.0),
            Heading::NorthWest => (-1.0, -1.0),
        }
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Behaviour chosen for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyMode {
    Wandering,
    Chasing,
}

/// Everything a dog needs to know about its surroundings this tick
#[derive(Debug, Clone, Copy)]
pub struct EnemyEnv<'a> {
    pub obstacles: &'a [EnemyBuildingObject],
    pub canvas: &'a AxisBox,
    pub padding: f32,
    pub speed: f32,
    pub sight_x: f32,
    pub sight_y: f32,
    pub reroll_chance: f64,
    pub probe_step: f32,
    pub probe_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub bounds: AxisBox,
    pub heading: Heading,
    /// Sticky horizontal escape direction (-1 or 1) while pinned vertically
    pub chase_x: Option<f32>,
    /// Sticky vertical escape direction (-1 or 1) while pinned horizontally
    pub chase_y: Option<f32>,
    pub mode: EnemyMode,
}

impl Enemy {
    pub fn new(bounds: AxisBox) -> Self {
        Self {
            bounds,
            heading: Heading::None,
            chase_x: None,
            chase_y: None,
            mode: EnemyMode::Wandering,
        }
    }

    /// Detection rectangle, stretched to match the screen's aspect ratio
    pub fn sighted_box(&self, sight_x: f32, sight_y: f32) -> AxisBox {
        self.bounds.expand_xy(sight_x, sight_y)
    }

    pub fn is_chasing(&self) -> bool {
        self.mode == EnemyMode::Chasing
    }

    /// Run one tick of AI. Returns `true` when the chase state flipped.
    pub fn update<R: Rng>(
        &mut self,
        env: &EnemyEnv,
        player_hitbox: &AxisBox,
        player_invincible: bool,
        rng: &mut R,
    ) -> bool {
        let sighted = self.sighted_box(env.sight_x, env.sight_y);
        let sees_player = !player_invincible && player_hitbox.overlaps(&sighted);
        let mode = if sees_player {
            EnemyMode::Chasing
        } else {
            EnemyMode::Wandering
        };
        let changed = mode != self.mode;
        if changed {
            log::debug!("Dog at {:?} now {:?}", self.bounds.center(), mode);
            self.mode = mode;
            if mode == EnemyMode::Wandering {
                self.chase_x = None;
                self.chase_y = None;
            }
        }

        match mode {
            EnemyMode::Chasing => self.chase(env, player_hitbox.center(), rng),
            EnemyMode::Wandering => self.wander(env, rng),
        }
        changed
    }

    fn attempt(&mut self, env: &EnemyEnv, dx: f32, dy: f32, mode: MoveMode) -> bool {
        try_move(
            &mut self.bounds,
            dx,
            dy,
            env.obstacles,
            env.padding,
            env.canvas,
            mode,
        )
    }

    fn wander<R: Rng>(&mut self, env: &EnemyEnv, rng: &mut R) {
        if rng.random_bool(env.reroll_chance) {
            self.heading = Heading::random(rng);
        }
        let (hx, hy) = self.heading.components();
        if hx == 0.0 && hy == 0.0 {
            return;
        }
        let step = normalize_step(hx, hy, env.speed);
        if self.attempt(env, step.x, step.y, MoveMode::Commit) {
            // Blocked: pick a new heading now rather than pushing into the wall
            self.heading = Heading::random(rng);
        }
    }

    fn chase<R: Rng>(&mut self, env: &EnemyEnv, target: Vec2, rng: &mut R) {
        let center = self.bounds.center();
        let toward = |delta: f32| {
            if delta.abs() <= env.speed {
                0.0
            } else {
                delta.signum()
            }
        };
        let dir_x = self.chase_x.unwrap_or_else(|| toward(target.x - center.x));
        let dir_y = self.chase_y.unwrap_or_else(|| toward(target.y - center.y));
        if dir_x == 0.0 && dir_y == 0.0 {
            return;
        }
        let step = normalize_step(dir_x, dir_y, env.speed);

        let mut x_moved = false;
        let mut x_blocked = false;
        if dir_x != 0.0 {
            if self.attempt(env, step.x, 0.0, MoveMode::Commit) {
                x_blocked = true;
            } else {
                x_moved = true;
                self.chase_y = None;
            }
        }

        let mut y_moved = false;
        let mut y_blocked = false;
        if dir_y != 0.0 {
            if self.attempt(env, 0.0, step.y, MoveMode::Commit) {
                y_blocked = true;
            } else {
                y_moved = true;
                self.chase_x = None;
            }
        }

        if x_blocked && dir_y == 0.0 {
            self.chase_y = Some(self.find_escape(env, step.x, true, rng));
        }
        if y_blocked && dir_x == 0.0 {
            self.chase_x = Some(self.find_escape(env, step.y, false, rng));
        }

        if x_blocked && y_blocked {
            // Wedged both ways: forget the detour and re-probe next tick
            self.chase_x = None;
            self.chase_y = None;
        }

        // Only one axis moved, so give it the full step instead of the diagonal share
        let residual = env.speed - std::f32::consts::FRAC_1_SQRT_2 * env.speed;
        if dir_x != 0.0 && dir_y != 0.0 && residual > 0.0 {
            if x_blocked && y_moved {
                self.attempt(env, 0.0, dir_y * residual, MoveMode::Commit);
            } else if y_blocked && x_moved {
                self.attempt(env, dir_x * residual, 0.0, MoveMode::Commit);
            }
        }
    }

    /// Pick which way to go around the obstacle blocking a move
    ///
    /// `blocked` is the step that collided; `vertical` is true when the
    /// blocked step is horizontal and the escape runs along y. Starts from a
    /// random side, then takes the first side within the probe radius where
    /// the blocked step would clear.
    fn find_escape<R: Rng>(
        &mut self,
        env: &EnemyEnv,
        blocked: f32,
        vertical: bool,
        rng: &mut R,
    ) -> f32 {
        let fallback = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        for k in 1..=env.probe_count {
            let offset = k as f32 * env.probe_step;
            for side in [1.0, -1.0] {
                let (dx, dy) = if vertical {
                    (blocked, side * offset)
                } else {
                    (side * offset, blocked)
                };
                if !self.attempt(env, dx, dy, MoveMode::Probe) {
                    return side;
                }
            }
        }
        fallback
    }
}
