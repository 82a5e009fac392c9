//! Fixed timestep simulation tick
//!
//! Order within a tick is fixed: player movement, dogs (AI then bites),
//! powerup pickup, countdowns, when-safe transitions, delivery.

use serde::{Deserialize, Serialize};

use super::delivery::{at_door, choose_target, delivery_points};
use super::enemy::EnemyEnv;
use super::movement::{intent_vector, move_player};
use super::powerup::{PowerupChange, PowerupKind, Transition, collect};
use super::state::{GameEvent, SimulationState};
use crate::audio::SoundEffect;

/// Movement intents sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// What one tick produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    /// The player's position changed this tick (drives the walk cycle)
    pub player_moved: bool,
    /// Health hit zero; the session must be reset
    pub game_over: bool,
}

/// Advance the session by one tick
pub fn tick(state: &mut SimulationState, input: &TickInput) -> TickReport {
    let mut report = TickReport::default();
    state.time_ticks += 1;

    move_courier(state, input, &mut report);

    if run_dogs(state, &mut report) {
        report.game_over = true;
        return report;
    }

    pick_up_powerups(state, &mut report);

    for change in state.effects.tick() {
        if let PowerupChange::Expired(kind) = change {
            report.events.push(GameEvent::PowerupExpired(kind));
            if kind == PowerupKind::Invincible {
                report.events.push(GameEvent::InvincibilityVisual(false));
            }
        }
    }

    for change in state.effects.apply_pending(&mut state.player, &state.world) {
        match change {
            PowerupChange::Applied(Transition::Resize { multiplier }) => {
                report.events.push(GameEvent::SizeChanged { multiplier });
            }
            PowerupChange::Applied(Transition::SetFlying(flying)) => {
                report.events.push(GameEvent::FlyingChanged(flying));
            }
            PowerupChange::Expired(_) => {}
        }
    }

    check_delivery(state, &mut report);

    report
}

fn move_courier(state: &mut SimulationState, input: &TickInput, report: &mut TickReport) {
    let mut amount = state.tuning.player_speed;
    if state.effects.active.is_active(PowerupKind::Speed) {
        amount *= 2.0;
    }
    let delta = intent_vector(input.up, input.down, input.left, input.right, amount);
    if delta.x != 0.0 {
        let left = delta.x < 0.0;
        if left != state.player.facing_left {
            state.player.facing_left = left;
            report.events.push(GameEvent::FacingChanged { left });
        }
    }

    let moved = move_player(
        &mut state.player.bounds,
        delta,
        &state.world.obstacles,
        state.player.flying,
        &state.world.canvas,
    );
    report.player_moved = moved.x != 0.0 || moved.y != 0.0;
}

/// Returns `true` if the player ran out of health
fn run_dogs(state: &mut SimulationState, report: &mut TickReport) -> bool {
    let tuning = &state.tuning;
    let env = EnemyEnv {
        obstacles: &state.world.enemy_obstacles,
        canvas: &state.world.canvas,
        padding: tuning.enemy_padding,
        speed: state.difficulty.enemy_speed,
        sight_x: state.difficulty.sight_x,
        sight_y: state.difficulty.sight_y,
        reroll_chance: tuning.wander_reroll_chance,
        probe_step: tuning.chase_probe_step,
        probe_count: tuning.chase_probe_count,
    };
    let hitbox = state.player.hitbox(tuning.hitbox_reduction);

    for (index, dog) in state.enemies.iter_mut().enumerate() {
        let invincible = state.effects.active.is_active(PowerupKind::Invincible);
        if dog.update(&env, &hitbox, invincible, &mut state.rng) {
            report.events.push(GameEvent::EnemyAggro {
                index,
                chasing: dog.is_chasing(),
            });
        }

        if invincible || !dog.bounds.overlaps(&hitbox) {
            continue;
        }

        state.player.health = state.player.health.saturating_sub(1);
        report.events.push(GameEvent::PlayerBitten {
            health: state.player.health,
        });
        report
            .events
            .push(GameEvent::Sound(SoundEffect::random_bark(&mut state.rng)));

        if state.player.health == 0 {
            log::info!("Courier down with score {}", state.player.score);
            report.events.push(GameEvent::Sound(SoundEffect::GameOver));
            report.events.push(GameEvent::GameOver {
                score: state.player.score,
            });
            return true;
        }

        state
            .effects
            .active
            .set(PowerupKind::Invincible, tuning.damage_invincibility_ticks);
        report.events.push(GameEvent::InvincibilityVisual(true));
    }
    false
}

fn pick_up_powerups(state: &mut SimulationState, report: &mut TickReport) {
    let hitbox = state.player_hitbox();
    let taken = collect(&mut state.powerups, &hitbox);
    if taken.is_empty() {
        return;
    }

    for &kind in &taken {
        let was_flying = state.player.flying;
        state
            .effects
            .acquire(kind, &mut state.player, &state.tuning);
        report.events.push(GameEvent::PowerupCollected(kind));
        report.events.push(GameEvent::Sound(SoundEffect::PowerupCollect));
        if kind == PowerupKind::Invincible {
            report.events.push(GameEvent::InvincibilityVisual(true));
        }
        if state.player.flying && !was_flying {
            report.events.push(GameEvent::FlyingChanged(true));
        }
    }

    for _ in 0..taken.len() {
        if let Err(e) = state.spawn_powerup() {
            log::warn!("Skipping replacement powerup: {e}");
        }
    }
}

fn check_delivery(state: &mut SimulationState, report: &mut TickReport) {
    let Some(building) = state.target else {
        return;
    };
    if !at_door(&state.world, state.target, &state.player.bounds) {
        return;
    }

    let points = delivery_points(state.effects.active.is_active(PowerupKind::Big));
    state.player.score += points;
    state.deliveries += 1;

    let next_target = choose_target(&state.world, Some(building), &mut state.rng);
    state.target = next_target;

    log::info!(
        "Delivered to house {} (+{}), score {}, next {:?}",
        building,
        points,
        state.player.score,
        next_target
    );

    report.events.push(GameEvent::DoorOpened { building });
    report
        .events
        .push(GameEvent::Sound(SoundEffect::random_delivery(&mut state.rng)));
    report.events.push(GameEvent::Delivered {
        building,
        points,
        score: state.player.score,
        next_target,
    });

    let before = state.difficulty.level;
    let spawn = state.difficulty.escalate(&state.tuning);
    if state.difficulty.level != before {
        report.events.push(GameEvent::DifficultyRaised {
            level: state.difficulty.level,
        });
    }
    if spawn && state.enemies.len() < state.tuning.max_enemies {
        match state.spawn_enemy() {
            Ok(index) => report.events.push(GameEvent::EnemySpawned { index }),
            Err(e) => log::warn!("Skipping extra dog: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::Enemy;
    use crate::sim::geom::AxisBox;
    use crate::sim::powerup::FieldPowerup;
    use crate::tuning::Tuning;

    fn quiet_state(seed: u64) -> SimulationState {
        let mut state = SimulationState::new(Tuning::default(), seed).unwrap();
        state.enemies.clear();
        state.powerups.clear();
        state
    }

    /// Put the player right on top of the target door
    fn stand_on_target_door(state: &mut SimulationState) {
        let door = state.world.buildings[state.target.unwrap()].door.bounds;
        state.player.bounds = door;
    }

    #[test]
    fn test_basic_delivery() {
        let mut state = quiet_state(12345);
        let old = state.target.unwrap();
        stand_on_target_door(&mut state);

        let report = tick(&mut state, &TickInput::default());
        assert_eq!(state.player.score, 1);
        assert_ne!(state.target, Some(old));
        assert!(report.events.contains(&GameEvent::DoorOpened { building: old }));
        assert_eq!(state.difficulty.level, 1);
    }

    #[test]
    fn test_big_doubles_delivery_points() {
        let mut state = quiet_state(12345);
        state.effects.active.set(PowerupKind::Big, 100);
        stand_on_target_door(&mut state);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.score, 2);
    }

    #[test]
    fn test_invincible_contact_is_harmless() {
        let mut state = quiet_state(1);
        state.effects.active.set(PowerupKind::Invincible, 10);
        state.enemies.push(Enemy::new(state.player.bounds));

        let report = tick(&mut state, &TickInput::default());
        assert_eq!(state.player.health, state.tuning.max_health);
        assert_eq!(state.effects.active.invincible, 9);
        assert!(
            !report
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::PlayerBitten { .. }))
        );
    }

    #[test]
    fn test_bite_grants_invincibility() {
        let mut state = quiet_state(1);
        state.enemies.push(Enemy::new(state.player.bounds));
        state.enemies.push(Enemy::new(state.player.bounds));

        tick(&mut state, &TickInput::default());
        // Second dog is blocked by the window the first bite opened
        assert_eq!(state.player.health, state.tuning.max_health - 1);
        assert_eq!(
            state.effects.active.invincible,
            state.tuning.damage_invincibility_ticks - 1
        );
    }

    #[test]
    fn test_last_bite_ends_game_and_stops_dog_loop() {
        let mut state = quiet_state(1);
        state.player.health = 1;
        state.player.score = 7;
        let far = AxisBox::from_size(1500.0, 850.0, 48.0, 36.0);
        state.enemies.push(Enemy::new(state.player.bounds));
        state.enemies.push(Enemy::new(far));
        state.enemies[1].heading = crate::sim::enemy::Heading::West;

        let report = tick(&mut state, &TickInput::default());
        assert!(report.game_over);
        assert_eq!(state.player.health, 0);
        assert!(report.events.contains(&GameEvent::GameOver { score: 7 }));
        // The second dog never got its turn
        assert_eq!(state.enemies[1].bounds, far);
    }

    #[test]
    fn test_shortest_powerup_grows_then_reverts() {
        let tuning = Tuning {
            powerup_duration_ticks: crate::tuning::MIN_POWERUP_TICKS,
            ..Default::default()
        };
        tuning.validate().unwrap();
        let mut state = SimulationState::new(tuning, 8).unwrap();
        state.enemies.clear();
        state.powerups.clear();
        state.world.obstacles.clear();
        state.powerups.push(FieldPowerup {
            bounds: state.player.bounds,
            kind: PowerupKind::Big,
        });

        let mut sizes = Vec::new();
        for i in 0..10 {
            let report = tick(&mut state, &TickInput::default());
            if i == 0 {
                state.powerups.clear();
            }
            sizes.extend(report.events.iter().filter_map(|e| match e {
                GameEvent::SizeChanged { multiplier } => Some(*multiplier),
                _ => None,
            }));
        }
        assert_eq!(sizes, vec![state.tuning.big_multiplier, 1.0]);
        assert_eq!(state.player.size_multiplier, 1.0);
        assert_eq!(state.effects.active.big, 0);
        assert_eq!(state.effects.pending_size, None);
    }

    #[test]
    fn test_pickup_is_replaced() {
        let mut state = quiet_state(8);
        state.powerups.push(FieldPowerup {
            bounds: state.player.bounds,
            kind: PowerupKind::Speed,
        });

        let report = tick(&mut state, &TickInput::default());
        assert!(report.events.contains(&GameEvent::PowerupCollected(PowerupKind::Speed)));
        assert_eq!(state.powerups.len(), 1);
        assert!(!state.powerups[0].bounds.overlaps(&state.player.bounds));
        assert_eq!(state.effects.active.speed, state.tuning.powerup_duration_ticks - 1);
    }

    #[test]
    fn test_speed_doubles_movement() {
        let mut state = quiet_state(3);
        let start = state.player.bounds;
        tick(&mut state, &TickInput { up: true, ..Default::default() });
        let normal = start.y1 - state.player.bounds.y1;

        let start = state.player.bounds;
        state.effects.active.set(PowerupKind::Speed, 50);
        tick(&mut state, &TickInput { up: true, ..Default::default() });
        let fast = start.y1 - state.player.bounds.y1;

        assert_eq!(normal, state.tuning.player_speed);
        assert_eq!(fast, state.tuning.player_speed * 2.0);
    }

    #[test]
    fn test_facing_flips_once() {
        let mut state = quiet_state(3);
        let left = TickInput { left: true, ..Default::default() };
        let first = tick(&mut state, &left);
        let second = tick(&mut state, &left);
        assert!(first.events.contains(&GameEvent::FacingChanged { left: true }));
        assert!(!second.events.iter().any(|e| matches!(e, GameEvent::FacingChanged { .. })));
    }

    #[test]
    fn test_standing_still_does_not_move() {
        let mut state = quiet_state(3);
        let report = tick(&mut state, &TickInput::default());
        assert!(!report.player_moved);
        let report = tick(&mut state, &TickInput { down: true, ..Default::default() });
        assert!(report.player_moved);
    }

    #[test]
    fn test_size_and_mutual_exclusion_through_ticks() {
        let mut state = quiet_state(21);
        state.effects.acquire(PowerupKind::Big, &mut state.player, &state.tuning);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.size_multiplier, state.tuning.big_multiplier);

        state.effects.acquire(PowerupKind::Small, &mut state.player, &state.tuning);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.size_multiplier, state.tuning.small_multiplier);
        assert_eq!(state.effects.active.big, 0);
    }

    #[test]
    fn test_tenth_delivery_adds_a_dog() {
        let mut state = quiet_state(12345);
        for _ in 0..10 {
            stand_on_target_door(&mut state);
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.difficulty.level, 10);
        assert_eq!(state.enemies.len(), 1);
    }
}
