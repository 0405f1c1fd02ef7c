//! Run-scoped data: chosen character, coins, purchased upgrades, stage stats
//!
//! A session lives from character select until the player starts a new run.
//! The stage-start snapshot is what a retry rolls back to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::BASE_MAX_HP;
use crate::error::ShopError;
use crate::tuning::ShopTuning;

/// Playable characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Character {
    /// Quick and fragile
    Sprinter,
    /// Slower with a deeper health pool
    Bruiser,
}

impl Character {
    pub const ALL: [Character; 2] = [Character::Sprinter, Character::Bruiser];

    pub fn name(&self) -> &'static str {
        match self {
            Character::Sprinter => "Sprinter",
            Character::Bruiser => "Bruiser",
        }
    }

    /// Multiplier on base run speed
    pub fn speed_factor(&self) -> f32 {
        match self {
            Character::Sprinter => 1.12,
            Character::Bruiser => 0.94,
        }
    }

    /// Extra max HP over the base pool
    pub fn hp_bonus(&self) -> i32 {
        match self {
            Character::Sprinter => 0,
            Character::Bruiser => 2,
        }
    }
}

/// Shop items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Upgrade {
    MaxHp,
    Dash,
    Speed,
    ThrowDamage,
    ThrowCooldown,
}

impl Upgrade {
    pub const ALL: [Upgrade; 5] = [
        Upgrade::MaxHp,
        Upgrade::Dash,
        Upgrade::Speed,
        Upgrade::ThrowDamage,
        Upgrade::ThrowCooldown,
    ];
}

impl fmt::Display for Upgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Upgrade::MaxHp => "Max HP",
            Upgrade::Dash => "Dash",
            Upgrade::Speed => "Speed",
            Upgrade::ThrowDamage => "Throw damage",
            Upgrade::ThrowCooldown => "Throw rate",
        };
        f.write_str(name)
    }
}

/// Upgrade levels owned in the current run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    pub max_hp: u8,
    pub dash: bool,
    pub speed: u8,
    pub throw_damage: u8,
    pub throw_cooldown: u8,
}

impl Upgrades {
    pub fn level(&self, upgrade: Upgrade) -> u8 {
        match upgrade {
            Upgrade::MaxHp => self.max_hp,
            Upgrade::Dash => self.dash as u8,
            Upgrade::Speed => self.speed,
            Upgrade::ThrowDamage => self.throw_damage,
            Upgrade::ThrowCooldown => self.throw_cooldown,
        }
    }

    pub fn cap(upgrade: Upgrade, shop: &ShopTuning) -> u8 {
        match upgrade {
            Upgrade::Dash => 1,
            _ => shop.max_level,
        }
    }

    pub fn is_maxed(&self, upgrade: Upgrade, shop: &ShopTuning) -> bool {
        self.level(upgrade) >= Self::cap(upgrade, shop)
    }

    /// Base price plus `price_step` per level already owned
    pub fn price(&self, upgrade: Upgrade, shop: &ShopTuning) -> u32 {
        let base = match upgrade {
            Upgrade::MaxHp => shop.max_hp_price,
            Upgrade::Dash => shop.dash_price,
            Upgrade::Speed => shop.speed_price,
            Upgrade::ThrowDamage => shop.damage_price,
            Upgrade::ThrowCooldown => shop.cooldown_price,
        };
        base + shop.price_step * self.level(upgrade) as u32
    }

    fn raise(&mut self, upgrade: Upgrade) {
        match upgrade {
            Upgrade::MaxHp => self.max_hp += 1,
            Upgrade::Dash => self.dash = true,
            Upgrade::Speed => self.speed += 1,
            Upgrade::ThrowDamage => self.throw_damage += 1,
            Upgrade::ThrowCooldown => self.throw_cooldown += 1,
        }
    }
}

/// Per-stage counters for the completion summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    pub coins: u32,
    pub damage_taken: i32,
    pub enemies_defeated: u32,
    /// Session clock when the stage was built
    pub started_at: f64,
}

/// What a retry restores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageSnapshot {
    pub coins: u32,
    pub upgrades: Upgrades,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub run_seed: u32,
    pub character: Character,
    /// Zero-based index of the current level
    pub level_index: u32,
    pub coins: u32,
    pub upgrades: Upgrades,
    pub stage: StageStats,
    pub snapshot: StageSnapshot,
    /// The shop has been opened during this stage
    pub shop_used: bool,
}

impl Session {
    pub fn new(run_seed: u32, character: Character) -> Self {
        Self {
            run_seed,
            character,
            level_index: 0,
            coins: 0,
            upgrades: Upgrades::default(),
            stage: StageStats::default(),
            snapshot: StageSnapshot::default(),
            shop_used: false,
        }
    }

    /// Reset per-stage state when a level is built
    pub fn begin_stage(&mut self, now: f64) {
        self.stage = StageStats {
            started_at: now,
            ..StageStats::default()
        };
        self.snapshot = StageSnapshot {
            coins: self.coins,
            upgrades: self.upgrades.clone(),
        };
        self.shop_used = false;
    }

    /// Roll coins and upgrades back to the stage start
    pub fn restore_snapshot(&mut self) {
        self.coins = self.snapshot.coins;
        self.upgrades = self.snapshot.upgrades.clone();
    }

    pub fn max_hp(&self) -> i32 {
        BASE_MAX_HP + self.character.hp_bonus() + self.upgrades.max_hp as i32
    }

    pub fn add_coins(&mut self, amount: u32) {
        self.coins += amount;
        self.stage.coins += amount;
    }

    /// Buy one level of `upgrade`, returning the price paid
    pub fn purchase(&mut self, upgrade: Upgrade, shop: &ShopTuning) -> Result<u32, ShopError> {
        if self.upgrades.is_maxed(upgrade, shop) {
            return Err(ShopError::Maxed(upgrade));
        }
        let price = self.upgrades.price(upgrade, shop);
        if self.coins < price {
            return Err(ShopError::InsufficientCoins {
                upgrade,
                price,
                coins: self.coins,
            });
        }
        self.coins -= price;
        self.upgrades.raise(upgrade);
        log::debug!(
            "Purchased {} (level {}) for {} coins",
            upgrade,
            self.upgrades.level(upgrade),
            price
        );
        Ok(price)
    }
}
