//! Data-driven game balance
//!
//! Every number the simulation depends on lives here so a level designer can
//! override any subset from JSON without touching code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shortest powerup that can both take effect and be reversed: the change
/// commits on the pickup tick and the reversal is armed when one tick is left
pub const MIN_POWERUP_TICKS: u32 = 3;

/// Problems with a tuning document
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid range for {field}: min {min} must be below max {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be at least {min} ticks (got {value})")]
    TooShort {
        field: &'static str,
        value: u32,
        min: u32,
    },
    #[error("{field} must be a probability between 0 and 1 (got {value})")]
    NotProbability { field: &'static str, value: f64 },
    #[error("placement region for buildings is empty (canvas too small for margins)")]
    EmptyRegion,
}

/// Tunable game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Timing ===
    /// Simulation tick period in milliseconds
    pub tick_ms: f64,
    /// Walk-cycle animation period in milliseconds
    pub animation_ms: f64,

    // === Canvas ===
    pub canvas_width: f32,
    pub canvas_height: f32,

    // === Player ===
    pub player_spawn_x: f32,
    pub player_spawn_y: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Pixels per tick along one axis
    pub player_speed: f32,
    pub max_health: u32,
    /// Inset applied to the player's box for enemy/powerup contact
    pub hitbox_reduction: f32,
    /// Half-extent of the no-spawn zone around the player's spawn point
    pub spawn_safety_padding: f32,
    /// Invincibility granted after taking a bite
    pub damage_invincibility_ticks: u32,

    // === Buildings ===
    pub building_count: usize,
    pub building_min_width: f32,
    pub building_max_width: f32,
    pub building_min_height: f32,
    pub building_max_height: f32,
    /// Distance kept between buildings and the canvas edge
    pub building_edge_margin: f32,
    /// Horizontal padding between buildings
    pub building_pad_x: f32,
    /// Vertical padding between buildings (roofs stick up, so this is larger)
    pub building_pad_y: f32,
    /// How far the player may slip under a roof strip's side edges before it
    /// blocks (applied as a negative horizontal margin on each strip)
    pub roof_overlap_allowance: f32,

    // === Home ===
    pub home_offset_x: f32,
    pub home_offset_y: f32,
    pub home_width: f32,
    pub home_height: f32,

    // === Roofs ===
    pub roof_height: f32,
    pub roof_overhang: f32,
    pub roof_strip_height: f32,
    pub roof_apex_width: f32,

    // === Doors ===
    pub door_width: f32,
    pub door_height: f32,
    /// How far the door hit-box protrudes below the building
    pub door_reach: f32,

    // === Enemies ===
    pub enemy_count: usize,
    pub max_enemies: usize,
    pub enemy_width: f32,
    pub enemy_height: f32,
    pub enemy_speed: f32,
    pub enemy_padding: f32,
    pub enemy_spawn_padding: f32,
    pub enemy_min_separation: f32,
    pub sight_x: f32,
    pub sight_y: f32,
    /// Chance per tick a wandering enemy picks a new heading
    pub wander_reroll_chance: f64,
    pub chase_probe_step: f32,
    pub chase_probe_count: u32,

    // === Powerups ===
    pub powerup_count: usize,
    pub powerup_size: f32,
    pub powerup_padding: f32,
    pub powerup_min_separation: f32,
    pub powerup_duration_ticks: u32,
    pub big_multiplier: f32,
    pub small_multiplier: f32,

    // === Flowers ===
    pub flower_count: usize,
    pub flower_size: f32,
    pub flower_padding: f32,

    // === Difficulty ===
    pub max_difficulty: u32,
    pub enemy_speed_step: f32,
    /// Growth of horizontal sight per level; vertical follows the aspect ratio
    pub sight_step: f32,
    pub enemy_spawn_every: u32,

    // === Placement ===
    pub max_placement_attempts: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_ms: 33.0,
            animation_ms: 100.0,

            canvas_width: 1600.0,
            canvas_height: 900.0,

            player_spawn_x: 60.0,
            player_spawn_y: 420.0,
            player_width: 36.0,
            player_height: 54.0,
            player_speed: 6.0,
            max_health: 3,
            hitbox_reduction: 6.0,
            spawn_safety_padding: 140.0,
            damage_invincibility_ticks: 60,

            building_count: 6,
            building_min_width: 120.0,
            building_max_width: 190.0,
            building_min_height: 90.0,
            building_max_height: 130.0,
            building_edge_margin: 40.0,
            building_pad_x: 45.0,
            building_pad_y: 140.0,
            roof_overlap_allowance: 8.0,

            home_offset_x: 40.0,
            home_offset_y: -230.0,
            home_width: 150.0,
            home_height: 110.0,

            roof_height: 70.0,
            roof_overhang: 12.0,
            roof_strip_height: 10.0,
            roof_apex_width: 16.0,

            door_width: 28.0,
            door_height: 40.0,
            door_reach: 4.0,

            enemy_count: 4,
            max_enemies: 10,
            enemy_width: 48.0,
            enemy_height: 36.0,
            enemy_speed: 3.0,
            enemy_padding: 2.0,
            enemy_spawn_padding: 20.0,
            enemy_min_separation: 80.0,
            sight_x: 240.0,
            sight_y: 135.0,
            wander_reroll_chance: 0.02,
            chase_probe_step: 10.0,
            chase_probe_count: 6,

            powerup_count: 3,
            powerup_size: 28.0,
            powerup_padding: 12.0,
            powerup_min_separation: 120.0,
            powerup_duration_ticks: 300,
            big_multiplier: 1.5,
            small_multiplier: 0.6,

            flower_count: 24,
            flower_size: 14.0,
            flower_padding: 6.0,

            max_difficulty: 50,
            enemy_speed_step: 0.05,
            sight_step: 4.0,
            enemy_spawn_every: 10,

            max_placement_attempts: 20_000,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the generator or resolver cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ranges = [
            (
                "building width",
                self.building_min_width,
                self.building_max_width,
            ),
            (
                "building height",
                self.building_min_height,
                self.building_max_height,
            ),
        ];
        for (field, min, max) in ranges {
            if min >= max {
                return Err(ConfigError::InvertedRange { field, min, max });
            }
        }

        let positives = [
            ("tick_ms", self.tick_ms as f32),
            ("animation_ms", self.animation_ms as f32),
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("player_speed", self.player_speed),
            ("enemy_width", self.enemy_width),
            ("enemy_height", self.enemy_height),
            ("powerup_size", self.powerup_size),
            ("flower_size", self.flower_size),
            ("roof_strip_height", self.roof_strip_height),
            ("sight_x", self.sight_x),
            ("sight_y", self.sight_y),
            ("big_multiplier", self.big_multiplier),
            ("small_multiplier", self.small_multiplier),
        ];
        for (field, value) in positives {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        if self.powerup_duration_ticks < MIN_POWERUP_TICKS {
            return Err(ConfigError::TooShort {
                field: "powerup_duration_ticks",
                value: self.powerup_duration_ticks,
                min: MIN_POWERUP_TICKS,
            });
        }

        if !(0.0..=1.0).contains(&self.wander_reroll_chance) {
            return Err(ConfigError::NotProbability {
                field: "wander_reroll_chance",
                value: self.wander_reroll_chance,
            });
        }

        let (x_lo, x_hi) = self.building_x_range();
        let (y_lo, y_hi) = self.building_y_range();
        if x_lo >= x_hi || y_lo >= y_hi {
            return Err(ConfigError::EmptyRegion);
        }
        Ok(())
    }

    /// Range of valid left edges for a random building
    pub fn building_x_range(&self) -> (f32, f32) {
        (
            self.building_edge_margin + self.roof_overhang,
            self.canvas_width
                - self.building_edge_margin
                - self.roof_overhang
                - self.building_max_width,
        )
    }

    /// Range of valid top edges for a random building (roof must fit above)
    pub fn building_y_range(&self) -> (f32, f32) {
        (
            self.building_edge_margin + self.roof_height,
            self.canvas_height
                - self.building_edge_margin
                - self.door_reach
                - self.building_max_height,
        )
    }

    /// Vertical sight distance growth per difficulty level
    pub fn sight_step_y(&self) -> f32 {
        self.sight_step * self.sight_y / self.sight_x
    }
}
