//! Axis-aligned boxes
//!
//! Every spatial decision in the game reduces to [`AxisBox::overlaps`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Half-open rectangle, top-left `(x1, y1)` to bottom-right `(x2, y2)`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl AxisBox {
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box from a top-left corner and a size
    pub fn from_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Box of the given size centered on a point
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            center.x + width / 2.0,
            center.y + height / 2.0,
        )
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Strict overlap test: boxes that only share an edge do not collide
    #[inline]
    pub fn overlaps(&self, other: &AxisBox) -> bool {
        self.x1 < other.x2 && self.x2 > other.x1 && self.y1 < other.y2 && self.y2 > other.y1
    }

    /// Grow by `pad` on every side (negative shrinks)
    #[inline]
    pub fn expand(&self, pad: f32) -> Self {
        self.expand_xy(pad, pad)
    }

    /// Grow by separate horizontal and vertical amounts
    #[inline]
    pub fn expand_xy(&self, pad_x: f32, pad_y: f32) -> Self {
        Self::new(
            self.x1 - pad_x,
            self.y1 - pad_y,
            self.x2 + pad_x,
            self.y2 + pad_y,
        )
    }

    #[inline]
    pub fn inset(&self, amount: f32) -> Self {
        self.expand(-amount)
    }

    #[inline]
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    /// True if this box lies entirely within `outer`
    #[inline]
    pub fn inside(&self, outer: &AxisBox) -> bool {
        self.x1 >= outer.x1 && self.y1 >= outer.y1 && self.x2 <= outer.x2 && self.y2 <= outer.y2
    }
}

/// Free-function form of [`AxisBox::overlaps`]
#[inline]
pub fn overlaps(a: &AxisBox, b: &AxisBox) -> bool {
    a.overlaps(b)
}

/// Point at angle `theta` (radians) on the circle of radius `r` around `center`
#[inline]
pub fn point_on_circle(center: Vec2, r: f32, theta: f32) -> Vec2 {
    center + Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = AxisBox::new(0.0, 0.0, 10.0, 10.0);
        let right = AxisBox::new(10.0, 0.0, 20.0, 10.0);
        let below = AxisBox::new(0.0, 10.0, 10.0, 20.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
        assert!(a.overlaps(&right.translate(-0.5, 0.0)));
    }

    #[test]
    fn test_expand_and_inset() {
        let a = AxisBox::new(10.0, 10.0, 20.0, 30.0);
        assert_eq!(a.expand(5.0), AxisBox::new(5.0, 5.0, 25.0, 35.0));
        assert_eq!(a.inset(2.0), AxisBox::new(12.0, 12.0, 18.0, 28.0));
        assert_eq!(a.expand_xy(1.0, 3.0), AxisBox::new(9.0, 7.0, 21.0, 33.0));
    }

    #[test]
    fn test_centered_round_trips_center() {
        let b = AxisBox::centered(Vec2::new(50.0, 40.0), 20.0, 10.0);
        assert_eq!(b.center(), Vec2::new(50.0, 40.0));
        assert_eq!(b.width(), 20.0);
        assert_eq!(b.height(), 10.0);
    }

    #[test]
    fn test_point_on_circle_quadrants() {
        use std::f32::consts::{FRAC_PI_2, PI};
        let c = Vec2::new(10.0, -5.0);
        let cases = [
            (0.0, Vec2::new(13.0, -5.0)),
            (FRAC_PI_2, Vec2::new(10.0, -2.0)),
            (PI, Vec2::new(7.0, -5.0)),
            (3.0 * FRAC_PI_2, Vec2::new(10.0, -8.0)),
        ];
        for (theta, expected) in cases {
            let p = point_on_circle(c, 3.0, theta);
            assert!((p - expected).length() < 1e-5, "theta {theta}: {p:?}");
        }
        assert_eq!(point_on_circle(c, 0.0, 1.234), c);
    }

    fn arb_box() -> impl Strategy<Value = AxisBox> {
        (-500.0f32..500.0, -500.0f32..500.0, 0.5f32..200.0, 0.5f32..200.0)
            .prop_map(|(x, y, w, h)| AxisBox::from_size(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in arb_box(), b in arb_box()) {
            prop_assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
        }

        #[test]
        fn prop_box_overlaps_itself(a in arb_box()) {
            prop_assert!(overlaps(&a, &a));
        }
    }
}
