//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick only
//! - Seeded RNG only
//! - Stable iteration order (registry index)
//! - No rendering, audio or storage dependencies; effects leave as events

pub mod delivery;
pub mod enemy;
pub mod error;
pub mod geom;
pub mod movement;
pub mod powerup;
pub mod scheduler;
pub mod state;
pub mod tick;
pub mod world;

pub use delivery::{Difficulty, at_door, choose_target, delivery_points};
pub use enemy::{Enemy, EnemyEnv, EnemyMode, Heading};
pub use error::{PlacementCategory, SimError};
pub use geom::{AxisBox, overlaps, point_on_circle};
pub use movement::{MoveMode, Obstacle, move_player, normalize_step, slide, try_move};
pub use powerup::{ActivePowerups, FieldPowerup, PowerupKind, PowerupState, Transition, is_safe};
pub use scheduler::{AnimationClock, TickScheduler, WALK_FRAMES};
pub use state::{GameEvent, Player, SimulationState};
pub use tick::{TickInput, TickReport, tick};
pub use world::{Building, Door, World, WorldObject, generate_world};
