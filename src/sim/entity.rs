//! Shared entity pieces: health with the damage contract, facing, knockback

use serde::{Deserialize, Serialize};

use super::collision::Body;

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(&self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing for a direction; zero keeps `self`
    pub fn toward(self, dx: f32) -> Self {
        if dx < 0.0 {
            Facing::Left
        } else if dx > 0.0 {
            Facing::Right
        } else {
            self
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Result of a damage attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable, already dead, or a non-positive amount
    Ignored,
    Hurt,
    /// This hit took the last point; reported exactly once
    Killed,
}

impl DamageOutcome {
    pub fn landed(&self) -> bool {
        !matches!(self, DamageOutcome::Ignored)
    }
}

/// Hit points clamped to `[0, max]` plus the post-hit invulnerability window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub hp: i32,
    pub max: i32,
    /// Seconds of invulnerability remaining
    pub invulnerable: f32,
    dead: bool,
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self {
            hp: max,
            max,
            invulnerable: 0.0,
            dead: false,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_alive(&self) -> bool {
        !self.dead && self.hp > 0
    }

    pub fn tick(&mut self, dt: f32) {
        self.invulnerable = (self.invulnerable - dt).max(0.0);
    }

    /// Apply `amount` damage, then open an invulnerability window of `window` seconds
    pub fn damage(&mut self, amount: i32, window: f32) -> DamageOutcome {
        if self.dead || self.invulnerable > 0.0 || amount <= 0 {
            return DamageOutcome::Ignored;
        }
        self.hp = (self.hp - amount).clamp(0, self.max);
        self.invulnerable = window;
        if self.hp == 0 {
            self.dead = true;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Hurt
        }
    }

    pub fn heal(&mut self, amount: i32) {
        if !self.dead {
            self.hp = (self.hp + amount).clamp(0, self.max);
        }
    }

    /// Raise or lower the cap, keeping the missing amount
    pub fn set_max(&mut self, max: i32) {
        let max = max.max(1);
        let missing = self.max - self.hp;
        self.max = max;
        if !self.dead {
            self.hp = (max - missing).clamp(1, max);
        }
    }
}

/// Shove a body away from a hit coming from `dir` (-1 left, +1 right)
pub fn apply_knockback(body: &mut Body, dir: f32, strength_x: f32, strength_y: f32) {
    let dir = if dir < 0.0 { -1.0 } else { 1.0 };
    body.vel.x = dir * strength_x;
    body.vel.y = -strength_y;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_hit_kills_once() {
        let mut health = Health::new(6);
        health.hp = 1;
        assert_eq!(health.damage(1, 0.5), DamageOutcome::Killed);
        assert_eq!(health.hp, 0);
        assert!(health.is_dead());
        health.invulnerable = 0.0;
        assert_eq!(health.damage(1, 0.5), DamageOutcome::Ignored);
        assert_eq!(health.hp, 0);
    }

    #[test]
    fn test_invulnerable_damage_is_noop() {
        let mut health = Health::new(6);
        assert_eq!(health.damage(2, 0.8), DamageOutcome::Hurt);
        let before = health;
        assert_eq!(health.damage(3, 0.8), DamageOutcome::Ignored);
        assert_eq!(health, before);
    }

    #[test]
    fn test_overkill_clamps_to_zero() {
        let mut health = Health::new(3);
        assert_eq!(health.damage(10, 0.0), DamageOutcome::Killed);
        assert_eq!(health.hp, 0);
    }

    #[test]
    fn test_window_expires() {
        let mut health = Health::new(5);
        health.damage(1, 0.3);
        health.tick(0.2);
        assert_eq!(health.damage(1, 0.3), DamageOutcome::Ignored);
        health.tick(0.2);
        assert_eq!(health.damage(1, 0.3), DamageOutcome::Hurt);
        assert_eq!(health.hp, 3);
    }

    #[test]
    fn test_set_max_keeps_missing() {
        let mut health = Health::new(6);
        health.damage(2, 0.0);
        health.set_max(8);
        assert_eq!(health.hp, 6);
        assert_eq!(health.max, 8);
    }

    #[test]
    fn test_facing() {
        assert_eq!(Facing::Right.toward(-3.0), Facing::Left);
        assert_eq!(Facing::Left.toward(0.0), Facing::Left);
        assert_eq!(Facing::Left.flipped().sign(), 1.0);
    }
}
