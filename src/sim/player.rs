//! Player controller
//!
//! Order within a frame: timers, horizontal intent, jump (buffer + coyote),
//! dash, gravity, collision resolve, throw. Overlaps with coins, pickups and
//! the exit are handled by the stage after this runs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Body, SubStepPlan, move_and_collide};
use super::entity::{Facing, Health};
use super::events::GameEvent;
use super::projectile::{Owner, Projectile};
use super::rect::Rect;
use super::session::{Character, Upgrades};
use crate::consts::*;
use crate::{approach, decay_to_zero};
use crate::platform::{Action, InputState};
use crate::tuning::Tuning;

/// Countdown timers, all in seconds and floored at zero
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerTimers {
    /// Remaining jump buffer after a press
    pub jump_buffer: f32,
    /// Remaining grace period after leaving the ground
    pub coyote: f32,
    /// Remaining active dash
    pub dash: f32,
    pub dash_cooldown: f32,
    pub throw_cooldown: f32,
    pub speed_boost: f32,
    pub hurt_flash: f32,
}

impl PlayerTimers {
    fn tick(&mut self, dt: f32) {
        for t in [
            &mut self.jump_buffer,
            &mut self.coyote,
            &mut self.dash,
            &mut self.dash_cooldown,
            &mut self.throw_cooldown,
            &mut self.speed_boost,
            &mut self.hurt_flash,
        ] {
            *t = approach(*t, 0.0, dt);
        }
    }
}

/// Everything the player reads from the world each frame
pub struct PlayerContext<'a> {
    pub input: &'a InputState,
    pub tuning: &'a Tuning,
    pub upgrades: &'a Upgrades,
    pub colliders: &'a [Rect],
    pub level_width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub character: Character,
    pub facing: Facing,
    pub health: Health,
    pub grounded: bool,
    /// Rising from a jump that can still be cut short
    pub jumping: bool,
    pub timers: PlayerTimers,
}

impl Player {
    pub fn new(spawn: Vec2, character: Character, max_hp: i32) -> Self {
        Self {
            body: Body::new(spawn, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)),
            character,
            facing: Facing::Right,
            health: Health::new(max_hp),
            grounded: false,
            jumping: false,
            timers: PlayerTimers::default(),
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn is_dashing(&self) -> bool {
        self.timers.dash > 0.0
    }

    /// Run-speed multiplier from character, upgrades and an active boost
    pub fn speed_factor(&self, upgrades: &Upgrades, tuning: &Tuning) -> f32 {
        let p = &tuning.player;
        let boost = if self.timers.speed_boost > 0.0 {
            p.speed_boost
        } else {
            1.0
        };
        self.character.speed_factor() * (1.0 + p.speed_per_level * upgrades.speed as f32) * boost
    }

    /// Current throw cooldown after upgrades
    pub fn throw_cooldown(upgrades: &Upgrades, tuning: &Tuning) -> f32 {
        let p = &tuning.player;
        (p.throw_cooldown - p.throw_cooldown_step * upgrades.throw_cooldown as f32)
            .max(p.min_throw_cooldown)
    }

    /// Advance one frame, returning a thrown projectile if one was spawned
    pub fn update(
        &mut self,
        ctx: &PlayerContext,
        dt: f32,
        events: &mut Vec<GameEvent>,
    ) -> Option<Projectile> {
        if !self.health.is_alive() {
            return None;
        }
        let p = &ctx.tuning.player;
        let physics = &ctx.tuning.physics;
        let input = ctx.input;

        self.timers.tick(dt);
        self.health.tick(dt);

        // Horizontal intent
        let dir = input.horizontal();
        if dir != 0.0 {
            self.facing = self.facing.toward(dir);
        }
        if self.is_dashing() {
            self.body.vel.x = self.facing.sign() * p.dash_speed;
        } else if dir != 0.0 {
            let target = dir * physics.move_speed * self.speed_factor(ctx.upgrades, ctx.tuning);
            let authority = if self.grounded { 1.0 } else { p.air_control };
            let blend = (p.accel_rate * authority * dt).min(1.0);
            self.body.vel.x += (target - self.body.vel.x) * blend;
        } else if self.grounded {
            self.body.vel.x = decay_to_zero(self.body.vel.x, p.friction, dt, p.stop_epsilon);
        }

        // Jump: a buffered press fires while coyote time remains
        if input.is_pressed(Action::Jump) {
            self.timers.jump_buffer = p.jump_buffer;
        }
        if self.timers.jump_buffer > 0.0 && self.timers.coyote > 0.0 {
            self.body.vel.y = -physics.jump_velocity;
            self.timers.jump_buffer = 0.0;
            self.timers.coyote = 0.0;
            self.grounded = false;
            self.jumping = true;
            events.push(GameEvent::Jumped);
        }
        let cut_speed = physics.jump_velocity * p.jump_cut;
        if self.jumping && !input.is_held(Action::Jump) && self.body.vel.y < -cut_speed {
            self.body.vel.y = -cut_speed;
        }
        if self.body.vel.y >= 0.0 {
            self.jumping = false;
        }

        // Dash
        if input.is_pressed(Action::Dash)
            && ctx.upgrades.dash
            && !self.is_dashing()
            && self.timers.dash_cooldown <= 0.0
        {
            self.timers.dash = p.dash_duration;
            self.timers.dash_cooldown = p.dash_cooldown;
            self.body.vel = Vec2::new(self.facing.sign() * p.dash_speed, 0.0);
            self.jumping = false;
            events.push(GameEvent::Dashed);
        }

        if !self.is_dashing() {
            self.body.vel.y = (self.body.vel.y + physics.gravity * dt).min(physics.max_fall_speed);
        }

        let plan = SubStepPlan::for_frame(dt, physics.max_step_dt, physics.max_sub_steps);
        let result = move_and_collide(&mut self.body, ctx.colliders, plan);

        // Level edges act as walls
        let max_x = ctx.level_width - self.body.size.x;
        if self.body.pos.x < 0.0 || self.body.pos.x > max_x {
            self.body.pos.x = self.body.pos.x.clamp(0.0, max_x.max(0.0));
            self.body.vel.x = 0.0;
        }

        self.grounded = result.grounded;
        if self.grounded {
            self.timers.coyote = p.coyote_time;
            self.jumping = false;
        }
        if result.hit_ceiling {
            self.jumping = false;
        }

        if input.is_pressed(Action::Throw) && self.timers.throw_cooldown <= 0.0 {
            self.timers.throw_cooldown = Self::throw_cooldown(ctx.upgrades, ctx.tuning);
            events.push(GameEvent::Threw);
            let vel = Vec2::new(
                self.facing.sign() * p.throw_speed + self.body.vel.x * 0.25,
                -p.throw_lift,
            );
            return Some(Projectile::new(
                Owner::Player,
                self.body.center(),
                vel,
                p.throw_damage + ctx.upgrades.throw_damage as i32,
                p.throw_lifetime,
                p.throw_gravity,
            ));
        }
        None
    }
}
