//! Axis-aligned rectangles and static solids
//!
//! World space is in pixels with y growing downward, so `top` is the smaller y.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::SURFACE_INSET;

/// An axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Strict overlap (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_by(other, 0.0)
    }

    /// Overlap deeper than `slack` on both axes
    #[inline]
    pub fn overlaps_by(&self, other: &Rect, slack: f32) -> bool {
        self.left() < other.right() - slack
            && self.right() > other.left() + slack
            && self.top() < other.bottom() - slack
            && self.bottom() > other.top() + slack
    }

    /// Point containment, inclusive of the top and left edges
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }
}

/// A static platform: the visual rectangle plus the collider actually used for physics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub visual: Rect,
    pub collider: Rect,
}

impl Solid {
    /// Build a solid whose collider starts `SURFACE_INSET` below the visual top
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        let visual = Rect::new(x, y, w, h);
        let collider = Rect::new(x, y + SURFACE_INSET, w, (h - SURFACE_INSET).max(1.0));
        Self { visual, collider }
    }

    /// y a body's feet rest at when standing on this solid
    #[inline]
    pub fn surface_y(&self) -> f32 {
        self.collider.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_is_not_overlapping() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        let c = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.overlaps(&c));
        let d = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(a.overlaps(&d));
    }

    #[test]
    fn test_collider_inset() {
        let solid = Solid::new(100.0, 300.0, 200.0, 20.0);
        assert_eq!(solid.collider.x, 100.0);
        assert_eq!(solid.collider.w, 200.0);
        assert_eq!(solid.surface_y(), 300.0 + SURFACE_INSET);
        assert_eq!(solid.collider.bottom(), solid.visual.bottom());
    }

    #[test]
    fn test_contains_edges() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Vec2::new(0.0, 0.0)));
        assert!(!r.contains(Vec2::new(10.0, 5.0)));
        assert!(!r.contains(Vec2::new(5.0, 10.0)));
    }
}
