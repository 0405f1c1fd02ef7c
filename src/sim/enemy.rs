//! Enemy behaviour: patrol, chase, edge avoidance and ranged attacks
//!
//! Walkers probe the floor just past their leading foot before moving. With no
//! ground there (or at the end of their patrol span) they turn around and
//! ignore the player for a short hold, so a chase never carries them off a
//! ledge.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Body, SubStepPlan, move_and_collide, solid_at};
use super::entity::{Facing, Health};
use super::level::{EnemyKind, EnemySpawn};
use super::projectile::{Owner, Projectile};
use super::rect::Rect;
use super::rng::SeededRng;
use crate::tuning::Tuning;

/// How far below the feet the edge probe looks
const PROBE_DEPTH: f32 = 6.0;
/// Extra look-ahead past the distance covered this frame
const PROBE_MARGIN: f32 = 2.0;
/// Vertical velocities of the boss's three-bolt spread
const BOSS_SPREAD: [f32; 3] = [-110.0, 0.0, 110.0];
/// Multiplier on detection range for the boss
const BOSS_SIGHT: f32 = 2.5;

/// What an enemy knows about the world this frame
pub struct EnemyContext<'a> {
    /// Player centre, or `None` once the player is down
    pub target: Option<Vec2>,
    pub colliders: &'a [Rect],
    pub tuning: &'a Tuning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub health: Health,
    pub facing: Facing,
    /// Horizontal span the body must stay within
    pub patrol: (f32, f32),
    pub grounded: bool,
    pub chasing: bool,
    pub shoot_cooldown: f32,
    /// Chase suppressed while positive
    pub turn_hold: f32,
    pub hurt_flash: f32,
}

impl Enemy {
    pub fn from_spawn(id: u32, spawn: &EnemySpawn, rng: &mut SeededRng, tuning: &Tuning) -> Self {
        let cooldown = match spawn.kind {
            EnemyKind::Boss => tuning.enemy.boss_shoot_cooldown,
            _ => tuning.enemy.shoot_cooldown,
        };
        Self {
            id,
            kind: spawn.kind,
            body: Body::new(spawn.pos, spawn.kind.size()),
            health: Health::new(spawn.hp),
            facing: if rng.chance(0.5) {
                Facing::Left
            } else {
                Facing::Right
            },
            patrol: spawn.patrol,
            grounded: false,
            chasing: false,
            shoot_cooldown: rng.span(cooldown),
            turn_hold: 0.0,
            hurt_flash: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn is_boss(&self) -> bool {
        self.kind == EnemyKind::Boss
    }

    pub fn contact_damage(&self, tuning: &Tuning) -> i32 {
        match self.kind {
            EnemyKind::Boss => tuning.enemy.contact_damage * 2,
            _ => tuning.enemy.contact_damage,
        }
    }

    fn speeds(&self, tuning: &Tuning) -> (f32, f32) {
        let e = &tuning.enemy;
        match self.kind {
            EnemyKind::Boss => (e.boss_patrol_speed, e.boss_chase_speed),
            _ => (e.patrol_speed, e.chase_speed),
        }
    }

    /// Whether the ground continues and the patrol span allows a step of `dx`
    fn can_advance(&self, dx: f32, colliders: &[Rect]) -> bool {
        let r = self.rect();
        let ahead = dx.abs() + PROBE_MARGIN;
        let (foot_x, within) = match self.facing {
            Facing::Right => (r.right() + ahead, r.right() + ahead <= self.patrol.1),
            Facing::Left => (r.left() - ahead, r.left() - ahead >= self.patrol.0),
        };
        within && solid_at(colliders, Vec2::new(foot_x, r.bottom() + PROBE_DEPTH))
    }

    fn turn_back(&mut self, tuning: &Tuning) {
        self.facing = self.facing.flipped();
        self.turn_hold = tuning.enemy.turn_hold;
        self.chasing = false;
    }

    /// Advance one frame and return any bolts fired
    pub fn update(&mut self, ctx: &EnemyContext, rng: &mut SeededRng, dt: f32) -> Vec<Projectile> {
        let mut fired = Vec::new();
        if !self.health.is_alive() {
            return fired;
        }
        let e = &ctx.tuning.enemy;
        let physics = &ctx.tuning.physics;

        self.health.tick(dt);
        self.hurt_flash = (self.hurt_flash - dt).max(0.0);
        self.turn_hold = (self.turn_hold - dt).max(0.0);
        self.shoot_cooldown = (self.shoot_cooldown - dt).max(0.0);

        let center = self.body.center();
        let offset = ctx.target.map(|t| t - center);
        let sight = if self.is_boss() { BOSS_SIGHT } else { 1.0 };
        let sees = offset.is_some_and(|d| {
            d.x.abs() <= e.detect_radius * sight && d.y.abs() <= e.detect_height * sight
        });
        let in_line = offset.is_some_and(|d| d.x.abs() <= e.shoot_range && d.y.abs() <= e.shoot_band);

        self.chasing = sees && self.turn_hold <= 0.0;
        if let (true, Some(d)) = (self.chasing, offset) {
            self.facing = self.facing.toward(d.x);
        }

        let (patrol_speed, chase_speed) = self.speeds(ctx.tuning);
        let mut speed = if self.chasing { chase_speed } else { patrol_speed };
        // Shooters plant their feet to fire
        if self.kind == EnemyKind::Shooter && in_line {
            speed = 0.0;
            if let Some(d) = offset {
                self.facing = self.facing.toward(d.x);
            }
        }

        if self.grounded && speed > 0.0 && !self.can_advance(speed * dt, ctx.colliders) {
            self.turn_back(ctx.tuning);
            speed = patrol_speed;
            if !self.can_advance(speed * dt, ctx.colliders) {
                speed = 0.0;
            }
        }
        self.body.vel.x = self.facing.sign() * speed;
        self.body.vel.y = (self.body.vel.y + physics.gravity * dt).min(physics.max_fall_speed);

        let plan = SubStepPlan::for_frame(dt, physics.max_step_dt, physics.max_sub_steps);
        let result = move_and_collide(&mut self.body, ctx.colliders, plan);
        self.grounded = result.grounded;
        if result.hit_wall {
            self.turn_back(ctx.tuning);
        }

        if self.shoot_cooldown <= 0.0 {
            match self.kind {
                EnemyKind::Shooter if in_line => {
                    fired.push(self.bolt(0.0, ctx.tuning));
                    self.shoot_cooldown = rng.span(e.shoot_cooldown);
                }
                EnemyKind::Boss if sees => {
                    fired.extend(BOSS_SPREAD.iter().map(|&vy| self.bolt(vy, ctx.tuning)));
                    self.shoot_cooldown = rng.span(e.boss_shoot_cooldown);
                }
                _ => {}
            }
        }
        fired
    }

    fn bolt(&self, vy: f32, tuning: &Tuning) -> Projectile {
        let e = &tuning.enemy;
        let dir = self.facing.sign();
        let muzzle = self.body.center() + Vec2::new(dir * self.body.size.x * 0.5, 0.0);
        Projectile::new(
            Owner::Enemy,
            muzzle,
            Vec2::new(dir * e.bolt_speed, vy),
            e.bolt_damage,
            e.bolt_lifetime,
            0.0,
        )
    }
}
