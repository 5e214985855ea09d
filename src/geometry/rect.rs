//! Axis-aligned rectangles and the workspace boundary.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::vec2::{Vec2, EPSILON};

/// Axis-aligned rectangle given by its minimum corner and size.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when either side is zero, negative or not finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.x.is_finite()
            || !self.y.is_finite()
            || !self.width.is_finite()
            || !self.height.is_finite()
    }

    /// Point membership, inclusive of the edges.
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x >= self.x && p.x <= max.x && p.y >= self.y && p.y <= max.y
    }

    /// Closed-set intersection: rectangles sharing only an edge intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.x <= b_max.x && other.x <= a_max.x && self.y <= b_max.y && other.y <= a_max.y
    }

    /// Nearest point of the rectangle to `p` (`p` itself when inside).
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let max = self.max();
        Vec2::new(p.x.clamp(self.x, max.x), p.y.clamp(self.y, max.y))
    }

    /// Euclidean distance from `p` to the rectangle; zero inside.
    pub fn distance_to(&self, p: Vec2) -> f64 {
        p.distance_to(self.closest_point(p))
    }

    /// Unit normal of the supporting line separating `p` from the rectangle.
    ///
    /// For an outside point this is the direction from the closest point to
    /// `p`. For a point on or inside the rectangle it falls back to the
    /// outward normal of the nearest face.
    pub fn separating_normal(&self, p: Vec2) -> Vec2 {
        if let Some(n) = (p - self.closest_point(p)).normalized() {
            return n;
        }
        let max = self.max();
        let faces = [
            (p.x - self.x, Vec2::new(-1.0, 0.0)),
            (max.x - p.x, Vec2::new(1.0, 0.0)),
            (p.y - self.y, Vec2::new(0.0, -1.0)),
            (max.y - p.y, Vec2::new(0.0, 1.0)),
        ];
        faces
            .iter()
            .fold((f64::INFINITY, Vec2::new(-1.0, 0.0)), |best, &(d, n)| {
                if d < best.0 - EPSILON {
                    (d, n)
                } else {
                    best
                }
            })
            .1
    }
}

/// Workspace boundary. `up` is the minimum y and `down` the maximum y.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub up: f64,
    pub down: f64,
}

impl Bounds {
    pub fn new(left: f64, right: f64, up: f64, down: f64) -> Self {
        Self {
            left,
            right,
            up,
            down,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.down - self.up
    }

    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0 && self.width().is_finite() && self.height().is_finite()
    }

    /// Point membership, inclusive of the boundary.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.up && p.y <= self.down
    }

    pub fn contains_rect(&self, r: &Rect) -> bool {
        self.contains(r.min()) && self.contains(r.max())
    }

    /// Projects `p` onto the boundary rectangle.
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(self.left, self.right), p.y.clamp(self.up, self.down))
    }

    /// Clamps `p` into the boundary and moves any coordinate within
    /// `tolerance` of a wall exactly onto it.
    pub fn snap(&self, p: Vec2, tolerance: f64) -> Vec2 {
        let snap_axis = |v: f64, lo: f64, hi: f64| {
            let v = v.clamp(lo, hi);
            if v - lo <= tolerance {
                lo
            } else if hi - v <= tolerance {
                hi
            } else {
                v
            }
        };
        Vec2::new(
            snap_axis(p.x, self.left, self.right),
            snap_axis(p.y, self.up, self.down),
        )
    }

    /// The boundary shrunk by `margin` on every side.
    pub fn inset(&self, margin: f64) -> Bounds {
        Bounds::new(
            self.left + margin,
            self.right - margin,
            self.up + margin,
            self.down - margin,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive() {
        let r = Rect::new(1.0, -0.1, 0.3, 0.2);
        assert!(r.contains(Vec2::new(1.0, 0.0)));
        assert!(r.contains(Vec2::new(1.3, 0.1)));
        assert!(!r.contains(Vec2::new(0.999, 0.0)));
    }

    #[test]
    fn degenerate_rects() {
        assert!(Rect::new(0.0, 0.0, 0.0, 1.0).is_degenerate());
        assert!(Rect::new(0.0, 0.0, 1.0, -1.0).is_degenerate());
        assert!(Rect::new(0.0, f64::NAN, 1.0, 1.0).is_degenerate());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
    }

    #[test]
    fn touching_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(1.0, 0.0, 1.0, 1.0);
        let c = Rect::new(1.01, 0.0, 1.0, 1.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn distance_outside_corner() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert!((r.distance_to(Vec2::new(4.0, 5.0)) - 5.0).abs() < 1e-12);
        assert_eq!(r.distance_to(Vec2::new(0.5, 0.5)), 0.0);
    }

    #[test]
    fn separating_normal_outside_and_on_face() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        let n = r.separating_normal(Vec2::new(-2.0, 0.5));
        assert!((n.x + 1.0).abs() < 1e-12 && n.y.abs() < 1e-12);
        let on_top = r.separating_normal(Vec2::new(0.5, 1.0));
        assert_eq!(on_top, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn bounds_clamp_and_inset() {
        let b = Bounds::new(-1.5, 1.5, -1.0, 1.0);
        assert_eq!(b.clamp(Vec2::new(2.0, -3.0)), Vec2::new(1.5, -1.0));
        let inner = b.inset(0.2);
        assert!((inner.width() - 2.6).abs() < 1e-12);
        assert!(b.is_valid());
        assert_eq!(
            b.snap(Vec2::new(1.4999999999, 0.3), 1e-9),
            Vec2::new(1.5, 0.3)
        );
        assert!(!Bounds::new(1.0, 1.0, 0.0, 1.0).is_valid());
    }
}
