//! Procedural town layout
//!
//! Layout is randomized but the structure is fixed:
//! 1. Home sits at a fixed offset from the player's spawn point
//! 2. Random houses are rejection-sampled so their padded boxes never touch
//! 3. Houses are sorted by `(y1, x1)` after home, which fixes house numbers
//! 4. Each building gets a staircase of roof strips for collision
//! 5. Flowers, enemies and powerups are scattered around what's left

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{PlacementCategory, SimError};
use super::geom::AxisBox;
use crate::tuning::Tuning;

/// What an obstacle represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// The player's own house
    Home,
    /// A house body
    House,
    /// One horizontal slice of a building's roof
    RoofStrip { building: usize },
}

/// Something the player cannot walk through (unless flying)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    pub bounds: AxisBox,
    pub kind: ObstacleKind,
    /// Horizontal margin applied when testing collision (negative lets the
    /// player tuck under roof eaves)
    pub margin_x: f32,
}

impl WorldObject {
    /// The box actually used for collision
    #[inline]
    pub fn collision_box(&self) -> AxisBox {
        self.bounds.expand_xy(self.margin_x, 0.0)
    }
}

/// Coarse building box used only for enemy movement: body plus the roof's
/// bounding box, so enemies never thread between roof strips
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyBuildingObject {
    pub bounds: AxisBox,
}

/// Delivery hit-box of one building
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub bounds: AxisBox,
    pub building: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Index in [`World::buildings`]; also the house number shown on the door
    pub number: usize,
    pub bounds: AxisBox,
    pub door: Door,
    pub is_home: bool,
}

/// Decorative only, never collides
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flower {
    pub bounds: AxisBox,
    pub variant: u8,
}

pub const FLOWER_VARIANTS: u8 = 4;

/// Static part of a town
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    /// Home first, then houses ordered by `(y1, x1)`
    pub buildings: Vec<Building>,
    /// Building bodies (same order as `buildings`) followed by roof strips
    pub obstacles: Vec<WorldObject>,
    pub enemy_obstacles: Vec<EnemyBuildingObject>,
    pub flowers: Vec<Flower>,
    pub canvas: AxisBox,
    /// No enemy may spawn here
    pub safety_box: AxisBox,
}

impl World {
    /// Number of buildings that can be delivery targets
    pub fn deliverable_count(&self) -> usize {
        self.buildings.iter().filter(|b| !b.is_home).count()
    }

    /// True if `candidate` hits any player obstacle
    pub fn blocks_player(&self, candidate: &AxisBox) -> bool {
        self.obstacles
            .iter()
            .any(|o| o.collision_box().overlaps(candidate))
    }

    /// True if `candidate` hits any coarse enemy obstacle
    pub fn blocks_enemy(&self, candidate: &AxisBox) -> bool {
        self.enemy_obstacles
            .iter()
            .any(|o| o.bounds.overlaps(candidate))
    }
}

/// The player's box at spawn
pub fn spawn_box(tuning: &Tuning) -> AxisBox {
    AxisBox::from_size(
        tuning.player_spawn_x,
        tuning.player_spawn_y,
        tuning.player_width,
        tuning.player_height,
    )
}

pub fn canvas_box(tuning: &Tuning) -> AxisBox {
    AxisBox::new(0.0, 0.0, tuning.canvas_width, tuning.canvas_height)
}

/// Rejection-sample boxes until `accept` passes, giving up after `max_attempts`
pub fn sample_until<R: Rng>(
    rng: &mut R,
    category: PlacementCategory,
    max_attempts: u32,
    mut sample: impl FnMut(&mut R) -> AxisBox,
    mut accept: impl FnMut(&AxisBox) -> bool,
) -> Result<AxisBox, SimError> {
    for _ in 0..max_attempts {
        let candidate = sample(rng);
        if accept(&candidate) {
            return Ok(candidate);
        }
    }
    Err(SimError::PlacementExhausted {
        category,
        attempts: max_attempts,
    })
}

/// Uniformly random box of the given size fully inside `canvas`
pub fn random_box_in<R: Rng>(rng: &mut R, canvas: &AxisBox, width: f32, height: f32) -> AxisBox {
    let x = rng.random_range(canvas.x1..(canvas.x2 - width).max(canvas.x1 + f32::EPSILON));
    let y = rng.random_range(canvas.y1..(canvas.y2 - height).max(canvas.y1 + f32::EPSILON));
    AxisBox::from_size(x, y, width, height)
}

/// Build the static town: buildings, roofs, doors and flowers
pub fn generate_world<R: Rng>(tuning: &Tuning, rng: &mut R) -> Result<World, SimError> {
    let spawn = spawn_box(tuning);
    let safety_box = spawn.expand(tuning.spawn_safety_padding);
    let canvas = canvas_box(tuning);

    let home = AxisBox::from_size(
        spawn.x1 + tuning.home_offset_x,
        spawn.y1 + tuning.home_offset_y,
        tuning.home_width,
        tuning.home_height,
    );

    let mut bodies: Vec<AxisBox> = Vec::with_capacity(tuning.building_count + 1);
    bodies.push(home);

    let (x_lo, x_hi) = tuning.building_x_range();
    let (y_lo, y_hi) = tuning.building_y_range();

    for _ in 0..tuning.building_count {
        let accepted = sample_until(
            rng,
            PlacementCategory::Building,
            tuning.max_placement_attempts,
            |rng| {
                let w = rng.random_range(tuning.building_min_width..tuning.building_max_width);
                let h = rng.random_range(tuning.building_min_height..tuning.building_max_height);
                let x = rng.random_range(x_lo..x_hi);
                let y = rng.random_range(y_lo..y_hi);
                AxisBox::from_size(x, y, w, h)
            },
            |candidate| {
                let padded = candidate.expand_xy(tuning.building_pad_x, tuning.building_pad_y);
                !padded.overlaps(&safety_box) && bodies.iter().all(|b| !padded.overlaps(b))
            },
        )?;
        bodies.push(accepted);
    }

    // Home stays first; everything else reads top-to-bottom, left-to-right
    bodies[1..].sort_by(|a, b| a.y1.total_cmp(&b.y1).then(a.x1.total_cmp(&b.x1)));

    let buildings: Vec<Building> = bodies
        .iter()
        .enumerate()
        .map(|(number, bounds)| Building {
            number,
            bounds: *bounds,
            door: door_for(tuning, number, bounds),
            is_home: number == 0,
        })
        .collect();

    let mut obstacles: Vec<WorldObject> = buildings
        .iter()
        .map(|b| WorldObject {
            bounds: b.bounds,
            kind: if b.is_home {
                ObstacleKind::Home
            } else {
                ObstacleKind::House
            },
            margin_x: 0.0,
        })
        .collect();
    for building in &buildings {
        append_roof_strips(tuning, building, &mut obstacles);
    }

    let enemy_obstacles = buildings
        .iter()
        .map(|b| EnemyBuildingObject {
            bounds: AxisBox::new(
                b.bounds.x1 - tuning.roof_overhang,
                b.bounds.y1 - tuning.roof_height,
                b.bounds.x2 + tuning.roof_overhang,
                b.bounds.y2,
            ),
        })
        .collect();

    let mut world = World {
        buildings,
        obstacles,
        enemy_obstacles,
        flowers: Vec::with_capacity(tuning.flower_count),
        canvas,
        safety_box,
    };

    for _ in 0..tuning.flower_count {
        let bounds = sample_until(
            rng,
            PlacementCategory::Flower,
            tuning.max_placement_attempts,
            |rng| random_box_in(rng, &canvas, tuning.flower_size, tuning.flower_size),
            |candidate| {
                let padded = candidate.expand(tuning.flower_padding);
                !padded.overlaps(&spawn)
                    && !world.obstacles.iter().any(|o| o.bounds.overlaps(&padded))
                    && !world.flowers.iter().any(|f| f.bounds.overlaps(&padded))
            },
        )?;
        let variant = rng.random_range(0..FLOWER_VARIANTS);
        world.flowers.push(Flower { bounds, variant });
    }

    log::info!(
        "Generated town: {} buildings, {} obstacles, {} flowers",
        world.buildings.len(),
        world.obstacles.len(),
        world.flowers.len()
    );

    Ok(world)
}

/// Find a free spot for an enemy: clear of coarse buildings, of `avoid` and
/// at least the minimum separation away from every other enemy
pub fn place_enemy<R: Rng>(
    tuning: &Tuning,
    world: &World,
    others: &[AxisBox],
    avoid: &AxisBox,
    rng: &mut R,
) -> Result<AxisBox, SimError> {
    sample_until(
        rng,
        PlacementCategory::Enemy,
        tuning.max_placement_attempts,
        |rng| random_box_in(rng, &world.canvas, tuning.enemy_width, tuning.enemy_height),
        |candidate| {
            let spread = candidate.expand(tuning.enemy_min_separation);
            !world.blocks_enemy(&candidate.expand(tuning.enemy_spawn_padding))
                && !candidate.overlaps(avoid)
                && !others.iter().any(|o| o.overlaps(&spread))
        },
    )
}

/// Find a free spot for a field powerup the player can actually reach
pub fn place_powerup<R: Rng>(
    tuning: &Tuning,
    world: &World,
    others: &[AxisBox],
    avoid: &AxisBox,
    rng: &mut R,
) -> Result<AxisBox, SimError> {
    sample_until(
        rng,
        PlacementCategory::Powerup,
        tuning.max_placement_attempts,
        |rng| random_box_in(rng, &world.canvas, tuning.powerup_size, tuning.powerup_size),
        |candidate| {
            let padded = candidate.expand(tuning.powerup_padding);
            let spread = candidate.expand(tuning.powerup_min_separation);
            !world.obstacles.iter().any(|o| o.bounds.overlaps(&padded))
                && !padded.overlaps(avoid)
                && !others.iter().any(|o| o.overlaps(&spread))
        },
    )
}

fn door_for(tuning: &Tuning, building: usize, bounds: &AxisBox) -> Door {
    let cx = bounds.center().x;
    Door {
        bounds: AxisBox::new(
            cx - tuning.door_width / 2.0,
            bounds.y2 - tuning.door_height,
            cx + tuning.door_width / 2.0,
            bounds.y2 + tuning.door_reach,
        ),
        building,
    }
}

/// Approximate a pyramidal roof with stacked rectangles, widest at the eaves
pub fn roof_strips(tuning: &Tuning, bounds: &AxisBox) -> Vec<AxisBox> {
    let base_width = bounds.width() + 2.0 * tuning.roof_overhang;
    let apex = bounds.y1 - tuning.roof_height;
    let count = (tuning.roof_height / tuning.roof_strip_height).ceil() as usize;
    let cx = bounds.center().x;

    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            let width = base_width + (tuning.roof_apex_width - base_width) * t;
            let bottom = bounds.y1 - i as f32 * tuning.roof_strip_height;
            let top = (bottom - tuning.roof_strip_height).max(apex);
            AxisBox::new(cx - width / 2.0, top, cx + width / 2.0, bottom)
        })
        .collect()
}

fn append_roof_strips(tuning: &Tuning, building: &Building, obstacles: &mut Vec<WorldObject>) {
    for strip in roof_strips(tuning, &building.bounds) {
        // Never let the eave allowance eat the whole strip
        let margin_x = -tuning
            .roof_overlap_allowance
            .min((strip.width() - 1.0).max(0.0) / 2.0);
        obstacles.push(WorldObject {
            bounds: strip,
            kind: ObstacleKind::RoofStrip {
                building: building.number,
            },
            margin_x,
        });
    }
}
