//! Recoverable error types
//!
//! None of these are fatal. The simulation turns each one into a toast notice
//! and carries on; the host only sees them when it calls fallible APIs directly
//! (tuning files, storage).

use thiserror::Error;

use crate::sim::session::Upgrade;
use crate::sim::state::{Command, Phase};

/// A shop interaction that was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    #[error("the shop is closed")]
    Closed,
    #[error("the shop can only be visited once per stage")]
    AlreadyVisited,
    #[error("{upgrade} costs {price} coins, you have {coins}")]
    InsufficientCoins {
        upgrade: Upgrade,
        price: u32,
        coins: u32,
    },
    #[error("{0} is already maxed out")]
    Maxed(Upgrade),
}

/// A command or key press that is not valid in the current phase
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{command:?} is not available during {phase:?}")]
    NotAllowed { command: Command, phase: Phase },
    #[error("can't pause while a stage is loading")]
    PauseWhileLoading,
}

/// Tuning data that failed to parse or would break the game
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("range `{0}` is empty or inverted")]
    InvalidRange(&'static str),
    #[error("platform gap {gap:.1} exceeds jump reach {reach:.1} at a {rise:.1} rise")]
    Unreachable { gap: f32, rise: f32, reach: f32 },
    #[error("max platform step {step:.1} exceeds jump height {height:.1}")]
    TooTall { step: f32, height: f32 },
}

/// Storage backend failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored data is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Any rejected command; surfaced to the player as a notice
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Shop(#[from] ShopError),
}
