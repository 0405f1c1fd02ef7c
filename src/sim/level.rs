//! Seeded level generation
//!
//! A level is an immutable description: solids, spawn points and pickups. The
//! live stage copies what it needs out of it and never writes back, so the same
//! `(seed, difficulty)` always rebuilds the same layout.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::{Rect, Solid};
use super::rng::{SeededRng, level_seed};
use crate::consts::*;
use crate::tuning::{PhysicsTuning, Tuning};

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Melee walker that chases on sight
    Patroller,
    /// Ranged walker that fires bolts along its row
    Shooter,
    /// Stage guardian holding the exit shut
    Boss,
}

impl EnemyKind {
    pub fn size(&self) -> Vec2 {
        match self {
            EnemyKind::Boss => Vec2::new(BOSS_WIDTH, BOSS_HEIGHT),
            _ => Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT),
        }
    }
}

/// Where and how an enemy starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    /// Top-left corner
    pub pos: Vec2,
    pub hp: i32,
    /// Horizontal span the enemy may walk within (its platform)
    pub patrol: (f32, f32),
}

/// Collectible power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Unlocks dashing for the rest of the run
    Dash,
    /// Temporary run-speed boost
    Speed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupSpawn {
    pub kind: PickupKind,
    pub pos: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitDoor {
    pub rect: Rect,
    /// Locked exits open only once the boss is down
    pub locked: bool,
}

/// A generated or authored stage layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub index: u32,
    pub seed: u32,
    pub difficulty: u32,
    /// Playfield width; the ground spans all of it
    pub width: f32,
    /// Player top-left at stage start
    pub spawn: Vec2,
    pub exit: ExitDoor,
    pub checkpoint: Rect,
    /// Ground first, then platforms left to right
    pub solids: Vec<Solid>,
    pub enemies: Vec<EnemySpawn>,
    /// Coin top-left corners
    pub coins: Vec<Vec2>,
    pub pickups: Vec<PickupSpawn>,
    pub boss: Option<EnemySpawn>,
}

impl Level {
    pub fn ground(&self) -> &Solid {
        &self.solids[0]
    }

    /// Every solid except the ground, in walk order
    pub fn platforms(&self) -> &[Solid] {
        &self.solids[1..]
    }

    /// Collision rectangles for the physics resolver
    pub fn colliders(&self) -> Vec<Rect> {
        self.solids.iter().map(|s| s.collider).collect()
    }

    pub fn is_boss_level(&self) -> bool {
        self.boss.is_some()
    }

    /// Index of the first platform pair the player cannot jump between, if any.
    ///
    /// Pair `0` is ground to first platform; pair `i` is platform `i-1` to `i`.
    pub fn unreachable_pair(&self, physics: &PhysicsTuning) -> Option<usize> {
        let platforms = self.platforms();
        let first = platforms.first()?;
        let ground_rise = self.ground().surface_y() - first.surface_y();
        if ground_rise > physics.max_jump_height() {
            return Some(0);
        }
        platforms.windows(2).enumerate().find_map(|(i, pair)| {
            let gap = (pair[1].collider.left() - pair[0].collider.right()).max(0.0);
            let rise = pair[0].surface_y() - pair[1].surface_y();
            (!physics.can_clear(gap, rise)).then_some(i + 1)
        })
    }
}

/// Difficulty grows by one after every boss
pub fn difficulty_for(level_index: u32, boss_interval: u32) -> u32 {
    1 + level_index / boss_interval.max(1)
}

/// Every `boss_interval`th level (1-based) is a boss arena
pub fn is_boss_level(level_index: u32, boss_interval: u32) -> bool {
    let interval = boss_interval.max(1);
    (level_index + 1) % interval == 0
}

/// Build the level for a given position in a run
pub fn build_level(run_seed: u32, level_index: u32, tuning: &Tuning) -> Level {
    let interval = tuning.generator.boss_interval;
    let difficulty = difficulty_for(level_index, interval);
    let seed = level_seed(run_seed, level_index);
    let level = if is_boss_level(level_index, interval) {
        boss_level(seed, difficulty, tuning)
    } else {
        generate_level(seed, difficulty, tuning)
    };
    log::info!(
        "Level {} built: seed={} difficulty={} platforms={} enemies={} boss={}",
        level_index + 1,
        seed,
        difficulty,
        level.platforms().len(),
        level.enemies.len(),
        level.is_boss_level()
    );
    Level {
        index: level_index,
        ..level
    }
}

/// Generate a staircase level from a seed
pub fn generate_level(seed: u32, difficulty: u32, tuning: &Tuning) -> Level {
    let g = &tuning.generator;
    let mut rng = SeededRng::new(seed);

    let count = (g.min_platforms as f32 + (difficulty as f32 * g.platforms_per_difficulty).floor())
        as u32;
    let count = count.clamp(g.min_platforms, g.max_platforms);

    // Random walk: each platform follows the previous one by a bounded gap and step
    let max_right = MAX_LEVEL_WIDTH - LEVEL_END_RUNOFF;
    let mut platforms: Vec<Solid> = Vec::with_capacity(count as usize);
    let mut cursor = g.first_x;
    let mut prev_top = GROUND_Y;
    for i in 0..count {
        let width = rng.span(g.platform_width);
        let gap = if i == 0 { 0.0 } else { rng.span(g.gap) };
        let step = rng.range(-g.max_step_up, g.max_step_down);

        // Leave room for every later platform at its narrowest and closest
        let later = (count - 1 - i) as f32;
        let limit = max_right - later * (g.platform_width.min + g.gap.min);
        let gap = if i == 0 {
            gap
        } else {
            gap.min(limit - cursor - g.platform_width.min).max(g.gap.min)
        };
        let x = cursor + gap;
        let y = (prev_top + step).clamp(g.band.min, g.band.max);
        let width = width.min(limit - x).max(g.platform_width.min);
        platforms.push(Solid::new(x, y, width, PLATFORM_HEIGHT));
        cursor = x + width;
        prev_top = y;
    }

    let width = (cursor + LEVEL_END_RUNOFF).min(MAX_LEVEL_WIDTH);
    let ground = Solid::new(0.0, GROUND_Y, width, GROUND_HEIGHT);
    let spawn = Vec2::new(60.0, ground.surface_y() - PLAYER_HEIGHT);

    // Exit sits on the last platform, checkpoint on the middle one
    let (exit_rect, checkpoint) = match (platforms.last(), platforms.get(platforms.len() / 2)) {
        (Some(last), Some(mid)) => (
            Rect::new(
                last.collider.right() - EXIT_WIDTH - 12.0,
                last.surface_y() - EXIT_HEIGHT,
                EXIT_WIDTH,
                EXIT_HEIGHT,
            ),
            Rect::new(
                mid.collider.center().x - CHECKPOINT_WIDTH * 0.5,
                mid.surface_y() - CHECKPOINT_HEIGHT,
                CHECKPOINT_WIDTH,
                CHECKPOINT_HEIGHT,
            ),
        ),
        _ => (
            Rect::new(
                width - EXIT_WIDTH - 40.0,
                ground.surface_y() - EXIT_HEIGHT,
                EXIT_WIDTH,
                EXIT_HEIGHT,
            ),
            Rect::new(
                width * 0.5,
                ground.surface_y() - CHECKPOINT_HEIGHT,
                CHECKPOINT_WIDTH,
                CHECKPOINT_HEIGHT,
            ),
        ),
    };

    let mut coins = Vec::new();
    for p in &platforms {
        let n = rng.int_inclusive(
            g.coins_per_platform.min as u32,
            g.coins_per_platform.max as u32,
        );
        let usable = (p.collider.w - 32.0 - COIN_SIZE).max(0.0);
        for _ in 0..n {
            let x = p.collider.left() + 16.0 + rng.next_f32() * usable;
            let y = p.surface_y() - COIN_SIZE - 12.0 - rng.next_f32() * 24.0;
            coins.push(Vec2::new(x, y));
        }
    }

    let mut pickups = Vec::new();
    if platforms.len() >= 3 {
        pickups.push(pickup_on(PickupKind::Dash, &platforms[1]));
    }
    if platforms.len() >= 5 {
        pickups.push(pickup_on(PickupKind::Speed, &platforms[platforms.len() - 2]));
    }

    // Enemies stand on mid-level platforms: never the first two or the last
    let e = &tuning.enemy;
    let enemy_count = (1.0 + (difficulty as f32 * g.enemies_per_difficulty).floor()) as u32;
    let enemy_count = enemy_count.clamp(1, g.max_enemies.max(1));
    let mut enemies = Vec::new();
    if platforms.len() > 3 {
        let candidates = &platforms[2..platforms.len() - 1];
        let bonus = e.hp_per_difficulty * (difficulty as i32 - 1);
        for _ in 0..enemy_count {
            let p = &candidates[rng.index(candidates.len())];
            let (kind, hp) = if rng.chance(g.patroller_chance) {
                (EnemyKind::Patroller, e.patroller_hp + bonus)
            } else {
                (EnemyKind::Shooter, e.shooter_hp + bonus)
            };
            let x = p.collider.left() + rng.next_f32() * (p.collider.w - ENEMY_WIDTH).max(0.0);
            enemies.push(EnemySpawn {
                kind,
                pos: Vec2::new(x, p.surface_y() - ENEMY_HEIGHT),
                hp: hp.max(1),
                patrol: (p.collider.left(), p.collider.right()),
            });
        }
    }

    let mut solids = Vec::with_capacity(platforms.len() + 1);
    solids.push(ground);
    solids.extend(platforms);

    Level {
        index: 0,
        seed,
        difficulty,
        width,
        spawn,
        exit: ExitDoor {
            rect: exit_rect,
            locked: false,
        },
        checkpoint,
        solids,
        enemies,
        coins,
        pickups,
        boss: None,
    }
}

fn pickup_on(kind: PickupKind, platform: &Solid) -> PickupSpawn {
    PickupSpawn {
        kind,
        pos: Vec2::new(
            platform.collider.center().x - PICKUP_SIZE * 0.5,
            platform.surface_y() - PICKUP_SIZE - 8.0,
        ),
    }
}

/// Width of the authored boss arena
pub const BOSS_ARENA_WIDTH: f32 = 1600.0;

/// Hand-authored boss arena: symmetric ledges, boss on the floor, exit locked
pub fn boss_level(seed: u32, difficulty: u32, tuning: &Tuning) -> Level {
    let ground = Solid::new(0.0, GROUND_Y, BOSS_ARENA_WIDTH, GROUND_HEIGHT);
    let floor = ground.surface_y();
    let ledges = [
        Solid::new(240.0, 400.0, 180.0, PLATFORM_HEIGHT),
        Solid::new(560.0, 320.0, 160.0, PLATFORM_HEIGHT),
        Solid::new(880.0, 320.0, 160.0, PLATFORM_HEIGHT),
        Solid::new(1180.0, 400.0, 180.0, PLATFORM_HEIGHT),
    ];

    let mut coins = Vec::new();
    for ledge in &ledges {
        let c = ledge.collider.center().x;
        coins.push(Vec2::new(c - COIN_SIZE - 8.0, ledge.surface_y() - COIN_SIZE - 14.0));
        coins.push(Vec2::new(c + 8.0, ledge.surface_y() - COIN_SIZE - 14.0));
    }

    let e = &tuning.enemy;
    let boss = EnemySpawn {
        kind: EnemyKind::Boss,
        pos: Vec2::new(BOSS_ARENA_WIDTH * 0.5 - BOSS_WIDTH * 0.5, floor - BOSS_HEIGHT),
        hp: e.boss_hp + e.boss_hp_per_difficulty * (difficulty as i32 - 1),
        patrol: (120.0, BOSS_ARENA_WIDTH - 120.0),
    };

    let mut solids = vec![ground];
    solids.extend(ledges);

    Level {
        index: 0,
        seed,
        difficulty,
        width: BOSS_ARENA_WIDTH,
        spawn: Vec2::new(60.0, floor - PLAYER_HEIGHT),
        exit: ExitDoor {
            rect: Rect::new(
                BOSS_ARENA_WIDTH - EXIT_WIDTH - 40.0,
                floor - EXIT_HEIGHT,
                EXIT_WIDTH,
                EXIT_HEIGHT,
            ),
            locked: true,
        },
        checkpoint: Rect::new(
            160.0,
            floor - CHECKPOINT_HEIGHT,
            CHECKPOINT_WIDTH,
            CHECKPOINT_HEIGHT,
        ),
        solids,
        enemies: Vec::new(),
        coins,
        pickups: vec![pickup_on(PickupKind::Speed, &ledges[0])],
        boss: Some(boss),
    }
}
