//! Ledge Runner - a seeded side-scrolling platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, physics, entities, stage flow)
//! - `renderer`: WebGPU rendering of read-only frame snapshots
//! - `platform`: Input and frame-clock collaborators
//! - `persistence`: Key/value storage for progress and settings
//! - `tuning`: Data-driven game balance

pub mod assets;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{CommandError, ShopError, StoreError, TransitionError, TuningError};
pub use settings::{SettingToggle, Settings, SettingsChange};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Frame delta is clamped to this before use (tab backgrounding, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.05;
    /// Longest single collision sub-step
    pub const MAX_STEP_DT: f32 = 1.0 / 240.0;
    /// Maximum collision sub-steps per frame
    pub const MAX_SUB_STEPS: u32 = 12;

    /// Viewport dimensions (world units are pixels, y grows downward)
    pub const VIEW_WIDTH: f32 = 960.0;
    pub const VIEW_HEIGHT: f32 = 540.0;

    /// Widest a generated level may become
    pub const MAX_LEVEL_WIDTH: f32 = 3600.0;
    /// Empty run-off after the last platform
    pub const LEVEL_END_RUNOFF: f32 = 160.0;
    /// Top of the ground's visual rectangle
    pub const GROUND_Y: f32 = 500.0;
    pub const GROUND_HEIGHT: f32 = 40.0;
    pub const PLATFORM_HEIGHT: f32 = 20.0;
    /// Collision surfaces sit this far below the visual top (grass overhang)
    pub const SURFACE_INSET: f32 = 4.0;
    /// Below this y a body has left the playfield
    pub const KILL_Y: f32 = VIEW_HEIGHT + 160.0;

    /// Gravity (pixels/s²)
    pub const GRAVITY: f32 = 1800.0;
    /// Initial upward speed of a jump
    pub const JUMP_VELOCITY: f32 = 720.0;
    /// Base horizontal run speed
    pub const MOVE_SPEED: f32 = 260.0;
    /// Terminal fall speed
    pub const MAX_FALL_SPEED: f32 = 900.0;

    pub const PLAYER_WIDTH: f32 = 28.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    pub const ENEMY_WIDTH: f32 = 30.0;
    pub const ENEMY_HEIGHT: f32 = 34.0;
    pub const BOSS_WIDTH: f32 = 64.0;
    pub const BOSS_HEIGHT: f32 = 80.0;
    pub const PROJECTILE_SIZE: f32 = 10.0;
    pub const COIN_SIZE: f32 = 16.0;
    pub const PICKUP_SIZE: f32 = 22.0;
    pub const EXIT_WIDTH: f32 = 36.0;
    pub const EXIT_HEIGHT: f32 = 56.0;
    pub const CHECKPOINT_WIDTH: f32 = 20.0;
    pub const CHECKPOINT_HEIGHT: f32 = 48.0;

    /// Every Nth level is the boss arena
    pub const BOSS_INTERVAL: u32 = 5;
    /// Multiplier used to derive per-level seeds from the run seed
    pub const LEVEL_SEED_PRIME: u32 = 2_654_435_761;

    /// Starting max HP before character and upgrade bonuses
    pub const BASE_MAX_HP: i32 = 6;
}

/// Move `current` toward `target` by at most `max_delta`
#[inline]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    if current < target {
        (current + max_delta).min(target)
    } else {
        (current - max_delta).max(target)
    }
}

/// Exponential decay toward zero, snapped to zero below `epsilon`
#[inline]
pub fn decay_to_zero(value: f32, rate: f32, dt: f32, epsilon: f32) -> f32 {
    let next = value * (-rate * dt).exp();
    if next.abs() < epsilon { 0.0 } else { next }
}
