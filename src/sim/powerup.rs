//! Powerups: pickup, countdown and when-safe reversal
//!
//! Size and flight changes are two-phase: a [`Transition`] is armed, then
//! committed on the first tick where [`is_safe`] says it won't wedge the
//! player inside a wall. Until then the player keeps the powerup's state
//! even though its timer has run out.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::AxisBox;
use super::state::Player;
use super::world::World;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    Big,
    Small,
    Speed,
    Invincible,
    Fly,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 5] = [
        PowerupKind::Big,
        PowerupKind::Small,
        PowerupKind::Speed,
        PowerupKind::Invincible,
        PowerupKind::Fly,
    ];

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerupKind::Big => "big",
            PowerupKind::Small => "small",
            PowerupKind::Speed => "speed",
            PowerupKind::Invincible => "invincible",
            PowerupKind::Fly => "fly",
        }
    }
}

/// A powerup lying on the ground
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldPowerup {
    pub bounds: AxisBox,
    pub kind: PowerupKind,
}

/// Remaining ticks per powerup (0 = inactive)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePowerups {
    pub big: u32,
    pub small: u32,
    pub speed: u32,
    pub invincible: u32,
    pub fly: u32,
}

impl ActivePowerups {
    pub fn remaining(&self, kind: PowerupKind) -> u32 {
        match kind {
            PowerupKind::Big => self.big,
            PowerupKind::Small => self.small,
            PowerupKind::Speed => self.speed,
            PowerupKind::Invincible => self.invincible,
            PowerupKind::Fly => self.fly,
        }
    }

    fn slot(&mut self, kind: PowerupKind) -> &mut u32 {
        match kind {
            PowerupKind::Big => &mut self.big,
            PowerupKind::Small => &mut self.small,
            PowerupKind::Speed => &mut self.speed,
            PowerupKind::Invincible => &mut self.invincible,
            PowerupKind::Fly => &mut self.fly,
        }
    }

    pub fn set(&mut self, kind: PowerupKind, ticks: u32) {
        *self.slot(kind) = ticks;
    }

    #[inline]
    pub fn is_active(&self, kind: PowerupKind) -> bool {
        self.remaining(kind) > 0
    }
}

/// A state change waiting for a safe moment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Transition {
    /// Scale the player to `multiplier` × base size around its center
    Resize { multiplier: f32 },
    SetFlying(bool),
}

/// Something that happened to powerup state during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PowerupChange {
    Expired(PowerupKind),
    Applied(Transition),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerupState {
    pub active: ActivePowerups,
    pub pending_size: Option<Transition>,
    pub pending_fly: Option<Transition>,
}

impl PowerupState {
    /// Apply the pickup effect of `kind`
    pub fn acquire(&mut self, kind: PowerupKind, player: &mut Player, tuning: &Tuning) {
        let duration = tuning.powerup_duration_ticks;
        match kind {
            PowerupKind::Big | PowerupKind::Small => {
                let (other, multiplier) = if kind == PowerupKind::Big {
                    (PowerupKind::Small, tuning.big_multiplier)
                } else {
                    (PowerupKind::Big, tuning.small_multiplier)
                };
                self.active.set(other, 0);
                self.active.set(kind, duration);
                self.pending_size = Some(Transition::Resize { multiplier });
            }
            PowerupKind::Speed | PowerupKind::Invincible => {
                self.active.set(kind, duration);
            }
            PowerupKind::Fly => {
                self.active.set(kind, duration);
                self.pending_fly = None;
                player.flying = true;
            }
        }
        log::debug!("Acquired {} powerup", kind.as_str());
    }

    /// Count every active powerup down by one, arming reversals on each
    /// timer's last active tick
    pub fn tick(&mut self) -> Vec<PowerupChange> {
        let mut changes = Vec::new();
        for kind in PowerupKind::ALL {
            let slot = self.active.slot(kind);
            if *slot == 0 {
                continue;
            }
            *slot -= 1;
            match (*slot, kind) {
                (1, PowerupKind::Big | PowerupKind::Small) => {
                    self.pending_size = Some(Transition::Resize { multiplier: 1.0 });
                }
                (1, PowerupKind::Fly) => {
                    self.pending_fly = Some(Transition::SetFlying(false));
                }
                (0, _) => changes.push(PowerupChange::Expired(kind)),
                _ => {}
            }
        }
        changes
    }

    /// Commit any armed transition that is safe right now
    pub fn apply_pending(&mut self, player: &mut Player, world: &World) -> Vec<PowerupChange> {
        let mut applied = Vec::new();
        for slot in [&mut self.pending_size, &mut self.pending_fly] {
            if let Some(transition) = *slot {
                if is_safe(&transition, player, world) {
                    apply(&transition, player);
                    *slot = None;
                    applied.push(PowerupChange::Applied(transition));
                } else {
                    log::debug!("Deferring {:?}: player would be stuck", transition);
                }
            }
        }
        applied
    }
}

/// The player's box after a resize, keeping its center
pub fn resized_box(player: &Player, multiplier: f32) -> AxisBox {
    AxisBox::centered(
        player.bounds.center(),
        player.base_width * multiplier,
        player.base_height * multiplier,
    )
}

/// Would committing `transition` now leave the player overlapping an obstacle?
pub fn is_safe(transition: &Transition, player: &Player, world: &World) -> bool {
    match *transition {
        Transition::Resize { multiplier } => {
            let candidate = resized_box(player, multiplier);
            candidate.inside(&world.canvas) && (player.flying || !world.blocks_player(&candidate))
        }
        Transition::SetFlying(true) => true,
        Transition::SetFlying(false) => !world.blocks_player(&player.bounds),
    }
}

fn apply(transition: &Transition, player: &mut Player) {
    match *transition {
        Transition::Resize { multiplier } => {
            player.bounds = resized_box(player, multiplier);
            player.size_multiplier = multiplier;
        }
        Transition::SetFlying(flying) => player.flying = flying,
    }
    log::debug!("Applied {:?}", transition);
}

/// Remove every field powerup the player's hitbox touches
pub fn collect(field: &mut Vec<FieldPowerup>, hitbox: &AxisBox) -> Vec<PowerupKind> {
    let mut taken = Vec::new();
    field.retain(|p| {
        if p.bounds.overlaps(hitbox) {
            taken.push(p.kind);
            false
        } else {
            true
        }
    });
    taken
}
