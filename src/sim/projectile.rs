//! Thrown weapons and enemy bolts

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Body, SubStepPlan, move_and_collide};
use super::rect::Rect;
use crate::consts::*;
use crate::tuning::PhysicsTuning;

/// Who fired a projectile; each side only hurts the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub body: Body,
    pub owner: Owner,
    pub damage: i32,
    /// Seconds until it expires
    pub lifetime: f32,
    /// Downward acceleration; zero for straight bolts
    pub gravity: f32,
    pub alive: bool,
}

impl Projectile {
    /// Spawn centred on `center`
    pub fn new(owner: Owner, center: Vec2, vel: Vec2, damage: i32, lifetime: f32, gravity: f32) -> Self {
        let size = Vec2::splat(PROJECTILE_SIZE);
        let mut body = Body::new(center - size * 0.5, size);
        body.vel = vel;
        Self {
            body,
            owner,
            damage,
            lifetime,
            gravity,
            alive: true,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    /// Advance one frame; returns false once the projectile is spent
    pub fn update(&mut self, colliders: &[Rect], physics: &PhysicsTuning, level_width: f32, dt: f32) -> bool {
        if !self.alive {
            return false;
        }
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.alive = false;
            return false;
        }

        self.body.vel.y += self.gravity * dt;
        let plan = SubStepPlan::for_frame(dt, physics.max_step_dt, physics.max_sub_steps);
        let result = move_and_collide(&mut self.body, colliders, plan);
        if result.touched_any() {
            self.alive = false;
        }

        let r = self.body.rect();
        if r.right() < 0.0 || r.left() > level_width || r.top() > KILL_Y {
            self.alive = false;
        }
        self.alive
    }
}
