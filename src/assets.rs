//! Asset registry
//!
//! Tracks every named sound in the manifest through pending → loaded | failed.
//! A failed asset resolves to a placeholder (silence) so the game keeps
//! running; boot only waits until nothing is pending. Visuals are flat quads
//! drawn by the renderer and need no loading.

use crate::sim::GameEvent;

/// One manifest entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetSpec {
    pub name: &'static str,
    /// Path relative to the page
    pub path: &'static str,
}

const fn sound(name: &'static str, path: &'static str) -> AssetSpec {
    AssetSpec { name, path }
}

/// Everything the game asks the host to load
pub const MANIFEST: &[AssetSpec] = &[
    sound("jump", "assets/sfx/jump.ogg"),
    sound("dash", "assets/sfx/dash.ogg"),
    sound("throw", "assets/sfx/throw.ogg"),
    sound("coin", "assets/sfx/coin.ogg"),
    sound("powerup", "assets/sfx/powerup.ogg"),
    sound("checkpoint", "assets/sfx/checkpoint.ogg"),
    sound("hurt", "assets/sfx/hurt.ogg"),
    sound("hit", "assets/sfx/hit.ogg"),
    sound("enemy_down", "assets/sfx/enemy_down.ogg"),
    sound("boss_down", "assets/sfx/boss_down.ogg"),
    sound("denied", "assets/sfx/denied.ogg"),
    sound("stage_clear", "assets/sfx/stage_clear.ogg"),
    sound("death", "assets/sfx/death.ogg"),
    sound("purchase", "assets/sfx/purchase.ogg"),
];

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Jump,
    Dash,
    Throw,
    Coin,
    PowerUp,
    Checkpoint,
    Hurt,
    Hit,
    EnemyDown,
    BossDown,
    Denied,
    StageClear,
    Death,
    Purchase,
}

impl SoundCue {
    /// Manifest name of the sound
    pub fn asset_name(&self) -> &'static str {
        match self {
            SoundCue::Jump => "jump",
            SoundCue::Dash => "dash",
            SoundCue::Throw => "throw",
            SoundCue::Coin => "coin",
            SoundCue::PowerUp => "powerup",
            SoundCue::Checkpoint => "checkpoint",
            SoundCue::Hurt => "hurt",
            SoundCue::Hit => "hit",
            SoundCue::EnemyDown => "enemy_down",
            SoundCue::BossDown => "boss_down",
            SoundCue::Denied => "denied",
            SoundCue::StageClear => "stage_clear",
            SoundCue::Death => "death",
            SoundCue::Purchase => "purchase",
        }
    }

    pub fn for_event(event: &GameEvent) -> Option<Self> {
        let cue = match event {
            GameEvent::Jumped => SoundCue::Jump,
            GameEvent::Dashed => SoundCue::Dash,
            GameEvent::Threw => SoundCue::Throw,
            GameEvent::CoinCollected { .. } => SoundCue::Coin,
            GameEvent::PickupCollected(_) => SoundCue::PowerUp,
            GameEvent::CheckpointReached => SoundCue::Checkpoint,
            GameEvent::PlayerHurt { .. } => SoundCue::Hurt,
            GameEvent::EnemyHit { .. } => SoundCue::Hit,
            GameEvent::EnemyKilled { .. } => SoundCue::EnemyDown,
            GameEvent::BossDefeated { .. } => SoundCue::BossDown,
            GameEvent::ExitLocked | GameEvent::Notice(_) => SoundCue::Denied,
            GameEvent::StageComplete(_) => SoundCue::StageClear,
            GameEvent::PlayerDied(_) => SoundCue::Death,
            GameEvent::Purchased { .. } => SoundCue::Purchase,
            _ => return None,
        };
        Some(cue)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    Pending,
    Loaded,
    Failed(String),
}

/// What a lookup resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetHandle {
    /// Index into the manifest of a loaded asset
    Ready(usize),
    /// Not available; draw or play the built-in fallback
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct AssetRegistry {
    specs: &'static [AssetSpec],
    status: Vec<AssetStatus>,
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new(MANIFEST)
    }
}

impl AssetRegistry {
    pub fn new(specs: &'static [AssetSpec]) -> Self {
        Self {
            specs,
            status: vec![AssetStatus::Pending; specs.len()],
        }
    }

    pub fn specs(&self) -> &'static [AssetSpec] {
        self.specs
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    /// Record a load outcome by manifest index. Returns true if this settled
    /// the last pending asset.
    pub fn settle(&mut self, index: usize, outcome: Result<(), String>) -> bool {
        let was_settled = self.is_settled();
        let Some(status) = self.status.get_mut(index) else {
            return false;
        };
        if *status != AssetStatus::Pending {
            return false;
        }
        let spec = &self.specs[index];
        *status = match outcome {
            Ok(()) => AssetStatus::Loaded,
            Err(reason) => {
                log::warn!("Asset '{}' ({}) failed: {}", spec.name, spec.path, reason);
                AssetStatus::Failed(reason)
            }
        };
        !was_settled && self.is_settled()
    }

    pub fn status(&self, index: usize) -> Option<&AssetStatus> {
        self.status.get(index)
    }

    /// No asset is still pending
    pub fn is_settled(&self) -> bool {
        !self.status.contains(&AssetStatus::Pending)
    }

    /// Fraction of assets that have settled
    pub fn progress(&self) -> f32 {
        if self.status.is_empty() {
            return 1.0;
        }
        let done = self
            .status
            .iter()
            .filter(|s| **s != AssetStatus::Pending)
            .count();
        done as f32 / self.status.len() as f32
    }

    pub fn failed(&self) -> impl Iterator<Item = &AssetSpec> + '_ {
        self.specs
            .iter()
            .zip(&self.status)
            .filter(|(_, s)| matches!(s, AssetStatus::Failed(_)))
            .map(|(spec, _)| spec)
    }

    pub fn sound(&self, cue: SoundCue) -> AssetHandle {
        match self.index_of(cue.asset_name()) {
            Some(i) if self.status[i] == AssetStatus::Loaded => AssetHandle::Ready(i),
            _ => AssetHandle::Placeholder,
        }
    }
}
