//! Game state and core simulation types
//!
//! One [`SimulationState`] is one play session. It is built fresh on reset
//! and owns every registry the tick mutates.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::delivery::{Difficulty, choose_target};
use super::enemy::Enemy;
use super::error::SimError;
use super::geom::AxisBox;
use super::powerup::{FieldPowerup, PowerupKind, PowerupState};
use super::world::{World, generate_world, place_enemy, place_powerup, spawn_box};
use crate::audio::SoundEffect;
use crate::tuning::Tuning;

/// The courier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Current position and (possibly scaled) size
    pub bounds: AxisBox,
    pub base_width: f32,
    pub base_height: f32,
    pub size_multiplier: f32,
    pub health: u32,
    pub max_health: u32,
    pub score: u64,
    pub flying: bool,
    /// Sprite is mirrored when the last horizontal move was leftward
    pub facing_left: bool,
}

impl Player {
    pub fn new(bounds: AxisBox, tuning: &Tuning) -> Self {
        Self {
            bounds,
            base_width: bounds.width(),
            base_height: bounds.height(),
            size_multiplier: 1.0,
            health: tuning.max_health,
            max_health: tuning.max_health,
            score: 0,
            flying: false,
            facing_left: false,
        }
    }

    /// Contact box for dogs and powerups, a bit smaller than the sprite
    pub fn hitbox(&self, reduction: f32) -> AxisBox {
        let reduction = reduction
            .min(self.bounds.width() / 2.0 - 0.5)
            .min(self.bounds.height() / 2.0 - 0.5)
            .max(0.0);
        self.bounds.inset(reduction)
    }
}

/// Something the frontend should react to; the core never draws or plays
/// anything itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    FacingChanged { left: bool },
    EnemyAggro { index: usize, chasing: bool },
    PlayerBitten { health: u32 },
    Sound(SoundEffect),
    InvincibilityVisual(bool),
    PowerupCollected(PowerupKind),
    PowerupExpired(PowerupKind),
    SizeChanged { multiplier: f32 },
    FlyingChanged(bool),
    /// Door swings open; the renderer closes it again after its animation
    DoorOpened { building: usize },
    Delivered {
        building: usize,
        points: u64,
        score: u64,
        next_target: Option<usize>,
    },
    DifficultyRaised { level: u32 },
    EnemySpawned { index: usize },
    GameOver { score: u64 },
}

/// Complete state of one play session
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub seed: u64,
    pub tuning: Tuning,
    pub world: World,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub powerups: Vec<FieldPowerup>,
    pub effects: PowerupState,
    pub difficulty: Difficulty,
    /// Index into `world.buildings` of the house awaiting delivery
    pub target: Option<usize>,
    pub time_ticks: u64,
    pub deliveries: u64,
    pub(crate) rng: Pcg32,
}

impl SimulationState {
    /// Generate a new town and populate it
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, SimError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let world = generate_world(&tuning, &mut rng)?;
        let player = Player::new(spawn_box(&tuning), &tuning);

        let mut enemies: Vec<Enemy> = Vec::with_capacity(tuning.enemy_count);
        for _ in 0..tuning.enemy_count {
            let others: Vec<AxisBox> = enemies.iter().map(|e| e.bounds).collect();
            let bounds = place_enemy(&tuning, &world, &others, &world.safety_box, &mut rng)?;
            enemies.push(Enemy::new(bounds));
        }

        let mut powerups: Vec<FieldPowerup> = Vec::with_capacity(tuning.powerup_count);
        for _ in 0..tuning.powerup_count {
            let others: Vec<AxisBox> = powerups.iter().map(|p| p.bounds).collect();
            let bounds = place_powerup(&tuning, &world, &others, &player.bounds, &mut rng)?;
            let kind = PowerupKind::random(&mut rng);
            powerups.push(FieldPowerup { bounds, kind });
        }

        let target = choose_target(&world, None, &mut rng);
        let difficulty = Difficulty::new(&tuning);

        log::info!(
            "New session (seed {}): {} dogs, {} powerups, first target {:?} of {}",
            seed,
            enemies.len(),
            powerups.len(),
            target,
            world.deliverable_count()
        );

        Ok(Self {
            seed,
            tuning,
            world,
            player,
            enemies,
            powerups,
            effects: PowerupState::default(),
            difficulty,
            target,
            time_ticks: 0,
            deliveries: 0,
            rng,
        })
    }

    /// Seed for the session that follows this one
    pub fn next_seed(&mut self) -> u64 {
        self.rng.next_u64()
    }

    pub fn is_invincible(&self) -> bool {
        self.effects.active.is_active(PowerupKind::Invincible)
    }

    pub fn player_hitbox(&self) -> AxisBox {
        self.player.hitbox(self.tuning.hitbox_reduction)
    }

    /// Drop a replacement powerup somewhere away from the player
    pub(crate) fn spawn_powerup(&mut self) -> Result<(), SimError> {
        let others: Vec<AxisBox> = self.powerups.iter().map(|p| p.bounds).collect();
        let bounds = place_powerup(
            &self.tuning,
            &self.world,
            &others,
            &self.player.bounds,
            &mut self.rng,
        )?;
        let kind = PowerupKind::random(&mut self.rng);
        self.powerups.push(FieldPowerup { bounds, kind });
        Ok(())
    }

    /// Add one more dog, out of the player's immediate reach
    pub(crate) fn spawn_enemy(&mut self) -> Result<usize, SimError> {
        let others: Vec<AxisBox> = self.enemies.iter().map(|e| e.bounds).collect();
        let avoid = self.player.bounds.expand(self.tuning.spawn_safety_padding);
        let bounds = place_enemy(&self.tuning, &self.world, &others, &avoid, &mut self.rng)?;
        self.enemies.push(Enemy::new(bounds));
        Ok(self.enemies.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_populated() {
        let tuning = Tuning::default();
        let state = SimulationState::new(tuning.clone(), 12345).unwrap();
        assert_eq!(state.enemies.len(), tuning.enemy_count);
        assert_eq!(state.powerups.len(), tuning.powerup_count);
        assert_eq!(state.player.health, tuning.max_health);
        assert_eq!(state.player.score, 0);

        let target = state.target.unwrap();
        assert!(!state.world.buildings[target].is_home);
    }

    #[test]
    fn test_enemies_spawn_clear_of_player_and_buildings() {
        let state = SimulationState::new(Tuning::default(), 777).unwrap();
        for dog in &state.enemies {
            assert!(!dog.bounds.overlaps(&state.world.safety_box));
            assert!(!state.world.blocks_enemy(&dog.bounds));
            assert!(dog.bounds.inside(&state.world.canvas));
        }
        for (i, a) in state.enemies.iter().enumerate() {
            for b in &state.enemies[i + 1..] {
                assert!(!a.bounds.expand(state.tuning.enemy_min_separation).overlaps(&b.bounds));
            }
        }
    }

    #[test]
    fn test_player_spawns_clear() {
        let state = SimulationState::new(Tuning::default(), 4242).unwrap();
        assert!(!state.world.blocks_player(&state.player.bounds));
        assert!(state.player.bounds.inside(&state.world.canvas));
    }

    #[test]
    fn test_hitbox_is_inset() {
        let tuning = Tuning::default();
        let player = Player::new(AxisBox::from_size(0.0, 0.0, 36.0, 54.0), &tuning);
        let hitbox = player.hitbox(6.0);
        assert_eq!(hitbox, AxisBox::new(6.0, 6.0, 30.0, 48.0));
    }

    #[test]
    fn test_same_seed_same_session() {
        let a = SimulationState::new(Tuning::default(), 99).unwrap();
        let b = SimulationState::new(Tuning::default(), 99).unwrap();
        let dogs = |s: &SimulationState| s.enemies.iter().map(|e| e.bounds).collect::<Vec<_>>();
        assert_eq!(dogs(&a), dogs(&b));
        assert_eq!(a.target, b.target);
    }
}
