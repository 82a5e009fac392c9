//! Deliveries, scoring and difficulty
//!
//! There is always exactly one target house. Reaching its door scores,
//! re-rolls the target and makes the dogs a little faster and sharper-eyed.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::AxisBox;
use super::world::World;
use crate::tuning::Tuning;

/// Escalating enemy stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub level: u32,
    pub enemy_speed: f32,
    pub sight_x: f32,
    pub sight_y: f32,
}

impl Difficulty {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            level: 0,
            enemy_speed: tuning.enemy_speed,
            sight_x: tuning.sight_x,
            sight_y: tuning.sight_y,
        }
    }

    /// Raise the level by one (capped). Returns `true` when this level
    /// should add another dog.
    pub fn escalate(&mut self, tuning: &Tuning) -> bool {
        if self.level >= tuning.max_difficulty {
            return false;
        }
        self.level += 1;
        self.enemy_speed += tuning.enemy_speed_step;
        self.sight_x += tuning.sight_step;
        self.sight_y += tuning.sight_step_y();
        tuning.enemy_spawn_every > 0 && self.level % tuning.enemy_spawn_every == 0
    }
}

/// Pick a delivery target among non-home buildings, never repeating
/// `previous` unless it is the only choice
pub fn choose_target<R: Rng>(world: &World, previous: Option<usize>, rng: &mut R) -> Option<usize> {
    let candidates: Vec<usize> = world
        .buildings
        .iter()
        .filter(|b| !b.is_home)
        .map(|b| b.number)
        .collect();
    match candidates.len() {
        0 => None,
        1 => Some(candidates[0]),
        n => loop {
            let pick = candidates[rng.random_range(0..n)];
            if Some(pick) != previous {
                break Some(pick);
            }
        },
    }
}

/// True if the player's box touches the target building's door
pub fn at_door(world: &World, target: Option<usize>, player: &AxisBox) -> bool {
    target
        .and_then(|i| world.buildings.get(i))
        .is_some_and(|b| b.door.bounds.overlaps(player))
}

/// Points for one delivery
#[inline]
pub fn delivery_points(big_active: bool) -> u64 {
    if big_active { 2 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::generate_world;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_target_never_repeats() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(17);
        let world = generate_world(&tuning, &mut rng).unwrap();

        let mut target = choose_target(&world, None, &mut rng);
        for _ in 0..500 {
            let next = choose_target(&world, target, &mut rng);
            assert_ne!(next, target);
            let building = &world.buildings[next.unwrap()];
            assert!(!building.is_home);
            target = next;
        }
    }

    #[test]
    fn test_single_house_repeats() {
        let tuning = Tuning {
            building_count: 1,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(2);
        let world = generate_world(&tuning, &mut rng).unwrap();
        assert_eq!(choose_target(&world, Some(1), &mut rng), Some(1));
    }

    #[test]
    fn test_difficulty_caps_and_spawns_every_tenth() {
        let tuning = Tuning {
            max_difficulty: 25,
            ..Default::default()
        };
        let mut difficulty = Difficulty::new(&tuning);
        let mut spawns = Vec::new();
        for _ in 0..40 {
            if difficulty.escalate(&tuning) {
                spawns.push(difficulty.level);
            }
        }
        assert_eq!(difficulty.level, 25);
        assert_eq!(spawns, vec![10, 20]);
        let expected_speed = tuning.enemy_speed + 25.0 * tuning.enemy_speed_step;
        assert!((difficulty.enemy_speed - expected_speed).abs() < 1e-4);

        let ratio = difficulty.sight_y / difficulty.sight_x;
        assert!((ratio - tuning.sight_y / tuning.sight_x).abs() < 1e-4);
    }

    #[test]
    fn test_at_door() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let world = generate_world(&tuning, &mut rng).unwrap();
        let door = world.buildings[2].door.bounds;
        assert!(at_door(&world, Some(2), &door));
        assert!(!at_door(&world, Some(1), &door) || world.buildings[1].door.bounds.overlaps(&door));
        assert!(!at_door(&world, None, &door));
    }
}
