//! Events emitted by the simulation
//!
//! The tick returns these in order; the host turns them into sounds, toasts
//! and HUD updates. The simulation never reads them back.

use serde::{Deserialize, Serialize};

use super::level::{EnemyKind, PickupKind};
use super::session::{Character, Upgrade};
use super::state::Phase;

/// How the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Health reached zero
    Slain,
    /// Fell below the playfield
    Fell,
}

/// Completion summary shown on the stage-complete screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    /// One-based level number
    pub level: u32,
    pub coins: u32,
    pub damage_taken: i32,
    pub enemies_defeated: u32,
    pub time_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: Phase, to: Phase },
    AssetsReady,
    RunStarted { seed: u32, character: Character },
    LevelBuilt { level: u32, boss: bool },
    Jumped,
    Dashed,
    Threw,
    CoinCollected { total: u32 },
    PickupCollected(PickupKind),
    CheckpointReached,
    PlayerHurt { hp: i32 },
    EnemyHit { id: u32 },
    EnemyKilled { id: u32, kind: EnemyKind },
    BossDefeated { bounty: u32 },
    ExitUnlocked,
    /// The player touched a locked exit
    ExitLocked,
    StageComplete(StageSummary),
    PlayerDied(DeathCause),
    Purchased { upgrade: Upgrade, price: u32 },
    TutorialComplete,
    /// Persistent progress changed and should be saved
    ProgressUpdated,
    /// A rejected command, shown as a toast
    Notice(String),
}
