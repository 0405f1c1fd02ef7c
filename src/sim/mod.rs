//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame delta is clamped and split into bounded collision sub-steps
//! - Seeded RNG only (the run seed is the one exception, drawn at run start)
//! - Stable iteration order (entities in spawn order)
//! - No rendering or platform dependencies beyond the input snapshot

pub mod collision;
pub mod enemy;
pub mod entity;
pub mod events;
pub mod level;
pub mod player;
pub mod projectile;
pub mod rect;
pub mod rng;
pub mod session;
pub mod stage;
pub mod state;
pub mod tick;

pub use collision::{Body, CollisionResult, SubStepPlan, move_and_collide};
pub use enemy::Enemy;
pub use entity::{DamageOutcome, Facing, Health};
pub use events::{DeathCause, GameEvent, StageSummary};
pub use level::{EnemyKind, Level, PickupKind, build_level, generate_level};
pub use player::Player;
pub use projectile::{Owner, Projectile};
pub use rect::{Rect, Solid};
pub use rng::{SeededRng, level_seed};
pub use session::{Character, Session, Upgrade, Upgrades};
pub use stage::{Stage, StageOutcome};
pub use state::{Command, GameState, Phase, Tutorial};
pub use tick::tick;
