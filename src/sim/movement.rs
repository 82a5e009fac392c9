//! Collision-aware movement
//!
//! Moves are resolved one axis at a time. A blocked move is retried with a
//! smaller step so the mover slides flush against the wall instead of
//! stopping short of it.

use glam::Vec2;

use super::geom::AxisBox;
use super::world::{EnemyBuildingObject, WorldObject};

/// Anything that blocks movement
pub trait Obstacle {
    fn collision_box(&self) -> AxisBox;
}

impl Obstacle for WorldObject {
    #[inline]
    fn collision_box(&self) -> AxisBox {
        WorldObject::collision_box(self)
    }
}

impl Obstacle for EnemyBuildingObject {
    #[inline]
    fn collision_box(&self) -> AxisBox {
        self.bounds
    }
}

impl Obstacle for AxisBox {
    #[inline]
    fn collision_box(&self) -> AxisBox {
        *self
    }
}

/// Whether a move is applied or only tested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
    Commit,
    Probe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    fn delta(self, amount: f32) -> (f32, f32) {
        match self {
            Axis::X => (amount, 0.0),
            Axis::Y => (0.0, amount),
        }
    }
}

/// Test (and optionally apply) a displacement of `bounds`
///
/// The box is grown by `padding` before testing. Leaving `canvas` counts as
/// a collision. Returns `true` if the move collided; a colliding move never
/// mutates `bounds`.
pub fn try_move<O: Obstacle>(
    bounds: &mut AxisBox,
    dx: f32,
    dy: f32,
    obstacles: &[O],
    padding: f32,
    canvas: &AxisBox,
    mode: MoveMode,
) -> bool {
    let moved = bounds.translate(dx, dy);
    let tested = moved.expand(padding);
    let collided =
        !moved.inside(canvas) || obstacles.iter().any(|o| o.collision_box().overlaps(&tested));
    if !collided && mode == MoveMode::Commit {
        *bounds = moved;
    }
    collided
}

/// Move along one axis, shrinking the step one unit at a time until it fits
///
/// Returns the signed distance actually moved (zero if fully blocked).
pub fn slide_axis<O: Obstacle>(
    bounds: &mut AxisBox,
    axis: Axis,
    amount: f32,
    obstacles: &[O],
    padding: f32,
    canvas: &AxisBox,
) -> f32 {
    let sign = amount.signum();
    let mut magnitude = amount.abs();
    while magnitude > 0.0 {
        let (dx, dy) = axis.delta(sign * magnitude);
        if !try_move(bounds, dx, dy, obstacles, padding, canvas, MoveMode::Commit) {
            return sign * magnitude;
        }
        magnitude -= 1.0;
    }
    0.0
}

/// Horizontal then vertical slide; returns the displacement applied
pub fn slide<O: Obstacle>(
    bounds: &mut AxisBox,
    delta: Vec2,
    obstacles: &[O],
    padding: f32,
    canvas: &AxisBox,
) -> Vec2 {
    let mut moved = Vec2::ZERO;
    if delta.x != 0.0 {
        moved.x = slide_axis(bounds, Axis::X, delta.x, obstacles, padding, canvas);
    }
    if delta.y != 0.0 {
        moved.y = slide_axis(bounds, Axis::Y, delta.y, obstacles, padding, canvas);
    }
    moved
}

/// Turn four held directions into a displacement capped at `amount`
///
/// Opposite keys cancel. Two orthogonal keys split `amount` so the diagonal
/// is no faster than a straight line.
pub fn intent_vector(up: bool, down: bool, left: bool, right: bool, amount: f32) -> Vec2 {
    let x = (right as i8 - left as i8) as f32;
    let y = (down as i8 - up as i8) as f32;
    normalize_step(x, y, amount)
}

/// Scale a direction with components in {-1, 0, 1} to length `amount`
#[inline]
pub fn normalize_step(x: f32, y: f32, amount: f32) -> Vec2 {
    if x != 0.0 && y != 0.0 {
        Vec2::new(x, y) * (amount / std::f32::consts::SQRT_2)
    } else {
        Vec2::new(x, y) * amount
    }
}

/// Resolve a player move. Flying ignores every obstacle but the canvas edge.
pub fn move_player(
    bounds: &mut AxisBox,
    delta: Vec2,
    obstacles: &[WorldObject],
    flying: bool,
    canvas: &AxisBox,
) -> Vec2 {
    if flying {
        slide::<WorldObject>(bounds, delta, &[], 0.0, canvas)
    } else {
        slide(bounds, delta, obstacles, 0.0, canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::ObstacleKind;
    use proptest::prelude::*;

    const CANVAS: AxisBox = AxisBox::new(0.0, 0.0, 1000.0, 1000.0);

    fn wall(x1: f32, y1: f32, x2: f32, y2: f32) -> WorldObject {
        WorldObject {
            bounds: AxisBox::new(x1, y1, x2, y2),
            kind: ObstacleKind::House,
            margin_x: 0.0,
        }
    }

    #[test]
    fn test_slide_stops_flush_against_wall() {
        let walls = [wall(110.0, 0.0, 200.0, 500.0)];
        let mut player = AxisBox::from_size(70.0, 100.0, 36.0, 54.0); // right edge at 106
        let moved = slide_axis(&mut player, Axis::X, 6.0, &walls, 0.0, &CANVAS);
        assert_eq!(moved, 4.0);
        assert_eq!(player.x2, 110.0);

        // Already flush: nothing fits
        let moved = slide_axis(&mut player, Axis::X, 6.0, &walls, 0.0, &CANVAS);
        assert_eq!(moved, 0.0);
        assert_eq!(player.x2, 110.0);
    }

    #[test]
    fn test_probe_does_not_move() {
        let mut b = AxisBox::from_size(10.0, 10.0, 10.0, 10.0);
        let collided =
            try_move::<WorldObject>(&mut b, 5.0, 5.0, &[], 0.0, &CANVAS, MoveMode::Probe);
        assert!(!collided);
        assert_eq!(b, AxisBox::from_size(10.0, 10.0, 10.0, 10.0));
    }

    #[test]
    fn test_padding_widens_collision() {
        let walls = [wall(30.0, 0.0, 40.0, 100.0)];
        let mut b = AxisBox::from_size(10.0, 10.0, 10.0, 10.0); // right edge 20
        assert!(!try_move(&mut b, 5.0, 0.0, &walls, 0.0, &CANVAS, MoveMode::Probe));
        assert!(try_move(&mut b, 5.0, 0.0, &walls, 6.0, &CANVAS, MoveMode::Probe));
    }

    #[test]
    fn test_roof_margin_lets_player_under_eaves() {
        let mut eave = wall(100.0, 0.0, 200.0, 10.0);
        eave.margin_x = -8.0;
        let mut b = AxisBox::from_size(60.0, 2.0, 40.0, 5.0); // right edge 100
        assert!(!try_move(&mut b, 7.0, 0.0, &[eave], 0.0, &CANVAS, MoveMode::Commit));
        assert!(try_move(&mut b, 2.0, 0.0, &[eave], 0.0, &CANVAS, MoveMode::Commit));
    }

    #[test]
    fn test_canvas_edge_blocks() {
        let mut b = AxisBox::from_size(2.0, 2.0, 10.0, 10.0);
        let moved = slide::<WorldObject>(&mut b, Vec2::new(-6.0, -6.0), &[], 0.0, &CANVAS);
        assert_eq!(moved, Vec2::new(-2.0, -2.0));
        assert_eq!(b.x1, 0.0);
        assert_eq!(b.y1, 0.0);
    }

    #[test]
    fn test_flying_ignores_buildings() {
        let walls = [wall(0.0, 0.0, 1000.0, 1000.0)];
        let mut b = AxisBox::from_size(100.0, 100.0, 10.0, 10.0);
        let moved = move_player(&mut b, Vec2::new(5.0, 0.0), &walls, true, &CANVAS);
        assert_eq!(moved.x, 5.0);
        let moved = move_player(&mut b, Vec2::new(5.0, 0.0), &walls, false, &CANVAS);
        assert_eq!(moved.x, 0.0);
    }

    #[test]
    fn test_blocked_axis_does_not_block_the_other() {
        let walls = [wall(110.0, 0.0, 200.0, 1000.0)];
        let mut b = AxisBox::from_size(74.0, 100.0, 36.0, 54.0); // flush at 110
        let moved = move_player(&mut b, Vec2::new(4.0, 4.0), &walls, false, &CANVAS);
        assert_eq!(moved, Vec2::new(0.0, 4.0));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        assert_eq!(intent_vector(true, true, false, false, 6.0), Vec2::ZERO);
        assert_eq!(intent_vector(false, false, true, true, 6.0), Vec2::ZERO);
        assert_eq!(intent_vector(true, true, true, false, 6.0), Vec2::new(-6.0, 0.0));
    }

    proptest! {
        #[test]
        fn prop_diagonal_speed_is_capped(
            up in any::<bool>(), down in any::<bool>(),
            left in any::<bool>(), right in any::<bool>(),
            amount in 0.5f32..20.0,
        ) {
            let v = intent_vector(up, down, left, right, amount);
            let moving = (up != down) || (left != right);
            if moving {
                prop_assert!((v.length() - amount).abs() < 1e-4);
            } else {
                prop_assert_eq!(v, Vec2::ZERO);
            }
        }

        #[test]
        fn prop_diagonal_equals_x_then_y(
            x in 0.0f32..900.0, y in 0.0f32..900.0,
            dx in -8.0f32..8.0, dy in -8.0f32..8.0,
        ) {
            let walls = [wall(300.0, 300.0, 500.0, 420.0), wall(600.0, 0.0, 640.0, 700.0)];
            let start = AxisBox::from_size(x.min(950.0), y.min(940.0), 36.0, 54.0);
            prop_assume!(start.inside(&CANVAS));
            prop_assume!(!walls.iter().any(|w| w.bounds.overlaps(&start)));

            let mut combined = start;
            move_player(&mut combined, Vec2::new(dx, dy), &walls, false, &CANVAS);

            let mut sequential = start;
            slide_axis(&mut sequential, Axis::X, dx, &walls, 0.0, &CANVAS);
            slide_axis(&mut sequential, Axis::Y, dy, &walls, 0.0, &CANVAS);

            prop_assert_eq!(combined, sequential);
        }
    }
}
