//! Rectangle collision resolution against static solids
//!
//! Motion is integrated in sub-steps. Each sub-step sweeps the horizontal axis
//! completely and then the vertical axis, stopping the body at the nearest face
//! it would cross. Resolving one axis at a time keeps bodies from snagging on
//! platform corners or slipping diagonally between two solids.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Penetration tolerated before two rectangles count as overlapping
pub const SKIN: f32 = 1e-3;

/// A moving rectangle: top-left position, velocity, size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }
}

/// What the body touched during one resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionResult {
    /// Landed on (or is resting on) a solid's top surface
    pub grounded: bool,
    /// Bumped a solid's underside while moving up
    pub hit_ceiling: bool,
    /// Stopped by a solid's side
    pub hit_wall: bool,
}

impl CollisionResult {
    pub fn touched_any(&self) -> bool {
        self.grounded || self.hit_ceiling || self.hit_wall
    }
}

/// How a frame's delta is split into collision sub-steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubStepPlan {
    pub steps: u32,
    pub step_dt: f32,
}

impl SubStepPlan {
    /// Split `dt` into at most `max_sub_steps` steps of at most `max_step_dt`.
    ///
    /// Time beyond `max_step_dt * max_sub_steps` is dropped rather than taken
    /// as one oversized step.
    pub fn for_frame(dt: f32, max_step_dt: f32, max_sub_steps: u32) -> Self {
        if dt <= 0.0 || max_sub_steps == 0 || max_step_dt <= 0.0 {
            return Self {
                steps: 0,
                step_dt: 0.0,
            };
        }
        let dt = dt.min(max_step_dt * max_sub_steps as f32);
        let steps = ((dt / max_step_dt).ceil() as u32).clamp(1, max_sub_steps);
        Self {
            steps,
            step_dt: dt / steps as f32,
        }
    }

    /// Simulated time covered by the plan
    pub fn total(&self) -> f32 {
        self.step_dt * self.steps as f32
    }
}

/// Advance `body` by its velocity over `plan`, resolving against `solids`.
///
/// Velocity on a blocked axis is zeroed. Bodies are assumed to start clear of
/// every solid; the sweep never pushes a clear body into one.
pub fn move_and_collide(body: &mut Body, solids: &[Rect], plan: SubStepPlan) -> CollisionResult {
    let mut result = CollisionResult::default();
    for _ in 0..plan.steps {
        sweep_x(body, solids, plan.step_dt, &mut result);
        sweep_y(body, solids, plan.step_dt, &mut result);
    }
    result
}

fn sweep_x(body: &mut Body, solids: &[Rect], dt: f32, result: &mut CollisionResult) {
    let dx = body.vel.x * dt;
    if dx == 0.0 {
        return;
    }
    let prev = body.rect();
    let mut new_x = prev.x + dx;
    let mut blocked = false;

    for s in solids {
        // Only solids sharing our vertical span can block horizontal motion
        if prev.top() >= s.bottom() - SKIN || prev.bottom() <= s.top() + SKIN {
            continue;
        }
        if dx > 0.0 {
            if s.left() >= prev.right() - SKIN && s.left() < new_x + prev.w {
                new_x = s.left() - prev.w;
                blocked = true;
            }
        } else if s.right() <= prev.left() + SKIN && s.right() > new_x {
            new_x = s.right();
            blocked = true;
        }
    }

    body.pos.x = new_x;
    if blocked {
        body.vel.x = 0.0;
        result.hit_wall = true;
    }
}

fn sweep_y(body: &mut Body, solids: &[Rect], dt: f32, result: &mut CollisionResult) {
    let dy = body.vel.y * dt;
    if dy == 0.0 {
        return;
    }
    let prev = body.rect();
    let mut new_y = prev.y + dy;
    let mut blocked = false;

    for s in solids {
        if prev.left() >= s.right() - SKIN || prev.right() <= s.left() + SKIN {
            continue;
        }
        if dy > 0.0 {
            if s.top() >= prev.bottom() - SKIN && s.top() < new_y + prev.h {
                new_y = s.top() - prev.h;
                blocked = true;
            }
        } else if s.bottom() <= prev.top() + SKIN && s.bottom() > new_y {
            new_y = s.bottom();
            blocked = true;
        }
    }

    body.pos.y = new_y;
    if blocked {
        if dy > 0.0 {
            result.grounded = true;
        } else {
            result.hit_ceiling = true;
        }
        body.vel.y = 0.0;
    }
}

/// Whether any solid contains the point
pub fn solid_at(solids: &[Rect], point: Vec2) -> bool {
    solids.iter().any(|s| s.contains(point))
}

/// Whether a rectangle overlaps any solid beyond the skin tolerance
pub fn overlaps_any(rect: &Rect, solids: &[Rect]) -> bool {
    solids.iter().any(|s| rect.overlaps_by(s, SKIN))
}
