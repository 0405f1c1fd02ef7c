//! Data-driven game balance
//!
//! Every number the simulation reads lives here so a JSON file can retune the
//! game without a rebuild. The generator's ranges and the physics constants are
//! coupled: [`Tuning::validate`] rejects any combination where a generated gap
//! could be wider or taller than the player can jump.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;
use crate::sim::Character;

/// Inclusive numeric range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Map a unit sample in [0, 1) onto the range
    #[inline]
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f32,
    pub jump_velocity: f32,
    pub move_speed: f32,
    pub max_fall_speed: f32,
    pub max_step_dt: f32,
    pub max_sub_steps: u32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            move_speed: MOVE_SPEED,
            max_fall_speed: MAX_FALL_SPEED,
            max_step_dt: MAX_STEP_DT,
            max_sub_steps: MAX_SUB_STEPS,
        }
    }
}

impl PhysicsTuning {
    /// Apex height of a full jump
    pub fn max_jump_height(&self) -> f32 {
        self.jump_velocity * self.jump_velocity / (2.0 * self.gravity)
    }

    /// Un-upgraded run speed of the slowest character
    pub fn slowest_run_speed(&self) -> f32 {
        let factor = Character::ALL
            .iter()
            .map(Character::speed_factor)
            .fold(f32::INFINITY, f32::min);
        self.move_speed * factor
    }

    /// Horizontal distance the slowest character covers with a full jump that
    /// lands `rise` above the takeoff height (negative rise lands lower).
    pub fn jump_reach(&self, rise: f32) -> f32 {
        let v = self.jump_velocity;
        let disc = v * v - 2.0 * self.gravity * rise;
        if disc < 0.0 {
            return 0.0;
        }
        let airtime = (v + disc.sqrt()) / self.gravity;
        self.slowest_run_speed() * airtime
    }

    /// Whether an edge-to-edge `gap` with the given `rise` can be jumped
    pub fn can_clear(&self, gap: f32, rise: f32) -> bool {
        rise <= self.max_jump_height() && gap <= self.jump_reach(rise)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorTuning {
    pub min_platforms: u32,
    pub max_platforms: u32,
    pub platforms_per_difficulty: f32,
    pub platform_width: Span,
    /// Edge-to-edge horizontal gap between consecutive platforms
    pub gap: Span,
    /// Largest upward step between consecutive platform tops
    pub max_step_up: f32,
    /// Largest downward step between consecutive platform tops
    pub max_step_down: f32,
    /// Vertical band (visual tops) platforms are clamped into
    pub band: Span,
    /// x of the first platform's left edge
    pub first_x: f32,
    pub coins_per_platform: Span,
    pub max_enemies: u32,
    pub enemies_per_difficulty: f32,
    /// Chance an enemy is a melee patroller rather than a shooter
    pub patroller_chance: f32,
    pub boss_interval: u32,
}

impl Default for GeneratorTuning {
    fn default() -> Self {
        Self {
            min_platforms: 6,
            max_platforms: 10,
            platforms_per_difficulty: 0.8,
            platform_width: Span::new(140.0, 260.0),
            gap: Span::new(60.0, 140.0),
            max_step_up: 90.0,
            max_step_down: 70.0,
            band: Span::new(220.0, 420.0),
            first_x: 220.0,
            coins_per_platform: Span::new(1.0, 3.0),
            max_enemies: 6,
            enemies_per_difficulty: 1.2,
            patroller_chance: 0.55,
            boss_interval: BOSS_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// How quickly run speed approaches its target (1/s)
    pub accel_rate: f32,
    /// Fraction of `accel_rate` available while airborne
    pub air_control: f32,
    /// Ground friction when no direction is held (1/s)
    pub friction: f32,
    /// Horizontal speeds below this snap to zero
    pub stop_epsilon: f32,
    pub jump_buffer: f32,
    pub coyote_time: f32,
    /// Fraction of jump velocity kept when jump is released early
    pub jump_cut: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    pub throw_cooldown: f32,
    pub throw_cooldown_step: f32,
    pub min_throw_cooldown: f32,
    pub throw_speed: f32,
    pub throw_lift: f32,
    pub throw_gravity: f32,
    pub throw_lifetime: f32,
    pub throw_damage: i32,
    pub invulnerability: f32,
    pub hurt_flash: f32,
    pub knockback_x: f32,
    pub knockback_y: f32,
    pub speed_boost_duration: f32,
    pub speed_boost: f32,
    pub speed_per_level: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            accel_rate: 14.0,
            air_control: 0.55,
            friction: 12.0,
            stop_epsilon: 6.0,
            jump_buffer: 0.12,
            coyote_time: 0.1,
            jump_cut: 0.45,
            dash_speed: 720.0,
            dash_duration: 0.16,
            dash_cooldown: 0.6,
            throw_cooldown: 0.38,
            throw_cooldown_step: 0.06,
            min_throw_cooldown: 0.14,
            throw_speed: 520.0,
            throw_lift: 90.0,
            throw_gravity: 500.0,
            throw_lifetime: 1.2,
            throw_damage: 1,
            invulnerability: 0.9,
            hurt_flash: 0.2,
            knockback_x: 220.0,
            knockback_y: 260.0,
            speed_boost_duration: 6.0,
            speed_boost: 1.35,
            speed_per_level: 0.08,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub detect_radius: f32,
    pub detect_height: f32,
    pub shoot_range: f32,
    pub shoot_band: f32,
    pub shoot_cooldown: Span,
    pub bolt_speed: f32,
    pub bolt_lifetime: f32,
    pub bolt_damage: i32,
    pub contact_damage: i32,
    pub invulnerability: f32,
    /// Chase is ignored this long after turning back from an edge
    pub turn_hold: f32,
    pub patroller_hp: i32,
    pub shooter_hp: i32,
    pub hp_per_difficulty: i32,
    pub boss_hp: i32,
    pub boss_hp_per_difficulty: i32,
    pub boss_patrol_speed: f32,
    pub boss_chase_speed: f32,
    pub boss_shoot_cooldown: Span,
    pub boss_bounty: u32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            patrol_speed: 60.0,
            chase_speed: 130.0,
            detect_radius: 260.0,
            detect_height: 90.0,
            shoot_range: 420.0,
            shoot_band: 48.0,
            shoot_cooldown: Span::new(1.3, 2.6),
            bolt_speed: 300.0,
            bolt_lifetime: 2.0,
            bolt_damage: 1,
            contact_damage: 1,
            invulnerability: 0.12,
            turn_hold: 0.4,
            patroller_hp: 2,
            shooter_hp: 1,
            hp_per_difficulty: 1,
            boss_hp: 24,
            boss_hp_per_difficulty: 8,
            boss_patrol_speed: 90.0,
            boss_chase_speed: 150.0,
            boss_shoot_cooldown: Span::new(1.2, 2.0),
            boss_bounty: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopTuning {
    pub max_hp_price: u32,
    pub dash_price: u32,
    pub speed_price: u32,
    pub damage_price: u32,
    pub cooldown_price: u32,
    /// Added to the price for each level already owned
    pub price_step: u32,
    /// Level cap for every tiered upgrade
    pub max_level: u8,
}

impl Default for ShopTuning {
    fn default() -> Self {
        Self {
            max_hp_price: 8,
            dash_price: 12,
            speed_price: 6,
            damage_price: 10,
            cooldown_price: 7,
            price_step: 5,
            max_level: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowTuning {
    /// Loading screen before the first stage of a run
    pub loading_secs: f32,
    /// Loading screen between stages
    pub next_loading_secs: f32,
    /// Fraction of the loading time after which the level is built
    pub build_point: f32,
}

impl Default for FlowTuning {
    fn default() -> Self {
        Self {
            loading_secs: 1.6,
            next_loading_secs: 1.2,
            build_point: 0.5,
        }
    }
}

/// Complete balance data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub generator: GeneratorTuning,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub shop: ShopTuning,
    pub flow: FlowTuning,
}

impl Tuning {
    /// Parse tuning JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        if let Err(e) = tuning.validate() {
            log::warn!("Rejected tuning: {}", e);
            return Err(e);
        }
        Ok(tuning)
    }

    /// Check ranges and the generator/physics jump-feasibility contract
    pub fn validate(&self) -> Result<(), TuningError> {
        let g = &self.generator;
        let spans = [
            ("generator.platform_width", g.platform_width),
            ("generator.gap", g.gap),
            ("generator.band", g.band),
            ("generator.coins_per_platform", g.coins_per_platform),
            ("enemy.shoot_cooldown", self.enemy.shoot_cooldown),
            ("enemy.boss_shoot_cooldown", self.enemy.boss_shoot_cooldown),
        ];
        for (name, span) in spans {
            if !span.is_valid() {
                return Err(TuningError::InvalidRange(name));
            }
        }
        if g.min_platforms == 0 || g.min_platforms > g.max_platforms {
            return Err(TuningError::InvalidRange("generator.min_platforms"));
        }
        // The narrowest, tightest walk must fit the level
        let max_right = MAX_LEVEL_WIDTH - LEVEL_END_RUNOFF;
        let n = g.max_platforms as f32;
        let tightest = g.first_x + n * g.platform_width.min + (n - 1.0) * g.gap.min;
        if tightest > max_right {
            return Err(TuningError::InvalidRange("generator.max_platforms"));
        }
        if g.boss_interval == 0 {
            return Err(TuningError::InvalidRange("generator.boss_interval"));
        }
        if self.physics.max_sub_steps == 0 || self.physics.max_step_dt <= 0.0 {
            return Err(TuningError::InvalidRange("physics.max_sub_steps"));
        }

        let height = self.physics.max_jump_height();
        let first_climb = (GROUND_Y - g.band.max).max(g.max_step_up);
        if first_climb > height {
            return Err(TuningError::TooTall {
                step: first_climb,
                height,
            });
        }
        // Worst case: widest gap combined with the tallest climb
        let reach = self.physics.jump_reach(g.max_step_up);
        if g.gap.max > reach {
            return Err(TuningError::Unreachable {
                gap: g.gap.max,
                rise: g.max_step_up,
                reach,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_jump_reach_shrinks_with_rise() {
        let physics = PhysicsTuning::default();
        assert!(physics.jump_reach(0.0) > physics.jump_reach(80.0));
        assert!(physics.jump_reach(-60.0) > physics.jump_reach(0.0));
        assert_eq!(physics.jump_reach(physics.max_jump_height() + 1.0), 0.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "flow": { "loading_secs": 3.0 } }"#).unwrap();
        assert_eq!(tuning.flow.loading_secs, 3.0);
        assert_eq!(tuning.flow.build_point, FlowTuning::default().build_point);
        assert_eq!(tuning.physics.gravity, GRAVITY);
    }

    #[test]
    fn test_rejects_unjumpable_gap() {
        let json = r#"{ "generator": { "gap": { "min": 60.0, "max": 900.0 } } }"#;
        assert!(matches!(
            Tuning::from_json(json),
            Err(TuningError::Unreachable { .. })
        ));
    }

    #[test]
    fn test_reach_uses_slowest_character() {
        let physics = PhysicsTuning::default();
        let slowest = physics.move_speed * Character::Bruiser.speed_factor();
        assert_eq!(physics.slowest_run_speed(), slowest);

        // Clearable at base speed, too wide for the Bruiser
        let v = physics.jump_velocity;
        let rise = GeneratorTuning::default().max_step_up;
        let airtime = (v + (v * v - 2.0 * physics.gravity * rise).sqrt()) / physics.gravity;
        let base_reach = physics.move_speed * airtime;
        let gap = (base_reach + physics.jump_reach(rise)) / 2.0;
        assert!(gap < base_reach);
        assert!(!physics.can_clear(gap, rise));

        let mut tuning = Tuning::default();
        tuning.generator.gap.max = gap;
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::Unreachable { .. })
        ));
    }

    #[test]
    fn test_rejects_walk_longer_than_level() {
        let json = r#"{ "generator": { "max_platforms": 40 } }"#;
        assert!(matches!(
            Tuning::from_json(json),
            Err(TuningError::InvalidRange("generator.max_platforms"))
        ));
    }

    #[test]
    fn test_rejects_step_taller_than_jump() {
        let json = r#"{ "generator": { "max_step_up": 400.0 } }"#;
        assert!(matches!(
            Tuning::from_json(json),
            Err(TuningError::TooTall { .. })
        ));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let json = r#"{ "generator": { "platform_width": { "min": 300.0, "max": 100.0 } } }"#;
        assert!(matches!(
            Tuning::from_json(json),
            Err(TuningError::InvalidRange("generator.platform_width"))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ nope"),
            Err(TuningError::Parse(_))
        ));
    }
}
