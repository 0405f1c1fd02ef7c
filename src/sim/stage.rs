//! The live stage: a built level plus everything that moves on it
//!
//! One play frame runs in a fixed order: player, enemies, projectiles, then
//! the rules (boss bounty, death, exit). Entity lists are iterated in spawn
//! order so identical inputs replay identically.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyContext};
use super::entity::apply_knockback;
use super::events::{DeathCause, GameEvent};
use super::level::{EnemyKind, Level, PickupKind};
use super::player::{Player, PlayerContext};
use super::projectile::{Owner, Projectile};
use super::rect::Rect;
use super::rng::SeededRng;
use super::session::Session;
use crate::consts::*;
use crate::decay_to_zero;
use crate::platform::InputState;
use crate::tuning::Tuning;

/// Runtime RNG stream is kept apart from the generator's stream
const RUNTIME_SALT: u32 = 0x5EED_F00D;
/// Screen shake added when the player is hurt
const HURT_SHAKE: f32 = 6.0;
/// Screen shake added when the boss goes down
const BOSS_SHAKE: f32 = 14.0;
/// Shake decay rate (1/s)
const SHAKE_DECAY: f32 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub rect: Rect,
    pub collected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    pub rect: Rect,
    pub collected: bool,
}

/// How a stage ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageOutcome {
    Complete,
    Died(DeathCause),
}

#[derive(Debug, Clone)]
pub struct Stage {
    pub level: Level,
    pub colliders: Vec<Rect>,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub coins: Vec<Coin>,
    pub pickups: Vec<Pickup>,
    pub exit_locked: bool,
    pub checkpoint_reached: bool,
    /// Seconds of play on this stage
    pub elapsed: f32,
    /// Camera shake amplitude in pixels, decays every frame
    pub shake: f32,
    rng: SeededRng,
    /// Player was already touching the locked exit last frame
    touching_exit: bool,
}

impl Stage {
    /// Populate a level. With `from_checkpoint` the player starts on the
    /// checkpoint instead of the spawn point.
    pub fn new(level: Level, session: &Session, tuning: &Tuning, from_checkpoint: bool) -> Self {
        let mut rng = SeededRng::new(level.seed ^ RUNTIME_SALT);
        let spawn = if from_checkpoint {
            Vec2::new(
                level.checkpoint.center().x - PLAYER_WIDTH * 0.5,
                level.checkpoint.bottom() - PLAYER_HEIGHT,
            )
        } else {
            level.spawn
        };

        let enemies = level
            .enemies
            .iter()
            .chain(level.boss.as_ref())
            .enumerate()
            .map(|(i, spawn)| Enemy::from_spawn(i as u32 + 1, spawn, &mut rng, tuning))
            .collect();
        let coins = level
            .coins
            .iter()
            .map(|&pos| Coin {
                rect: Rect::from_pos_size(pos, Vec2::splat(COIN_SIZE)),
                collected: false,
            })
            .collect();
        let pickups = level
            .pickups
            .iter()
            .map(|p| Pickup {
                kind: p.kind,
                rect: Rect::from_pos_size(p.pos, Vec2::splat(PICKUP_SIZE)),
                collected: false,
            })
            .collect();

        Self {
            colliders: level.colliders(),
            player: Player::new(spawn, session.character, session.max_hp()),
            enemies,
            projectiles: Vec::new(),
            coins,
            pickups,
            exit_locked: level.exit.locked,
            checkpoint_reached: from_checkpoint,
            elapsed: 0.0,
            shake: 0.0,
            rng,
            touching_exit: false,
            level,
        }
    }

    pub fn boss_alive(&self) -> bool {
        self.enemies
            .iter()
            .any(|e| e.is_boss() && e.health.is_alive())
    }

    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.is_boss())
    }

    pub fn coins_remaining(&self) -> usize {
        self.coins.iter().filter(|c| !c.collected).count()
    }

    /// Run one play frame
    pub fn step(
        &mut self,
        session: &mut Session,
        input: &InputState,
        tuning: &Tuning,
        dt: f32,
        events: &mut Vec<GameEvent>,
    ) -> Option<StageOutcome> {
        self.elapsed += dt;
        self.shake = decay_to_zero(self.shake, SHAKE_DECAY, dt, 0.01);

        // Player
        let ctx = PlayerContext {
            input,
            tuning,
            upgrades: &session.upgrades,
            colliders: &self.colliders,
            level_width: self.level.width,
        };
        if let Some(thrown) = self.player.update(&ctx, dt, events) {
            self.projectiles.push(thrown);
        }
        self.collect(session, tuning, events);
        let at_exit = self.check_exit(events);

        // Enemies
        let target = self
            .player
            .health
            .is_alive()
            .then(|| self.player.body.center());
        let ctx = EnemyContext {
            target,
            colliders: &self.colliders,
            tuning,
        };
        for enemy in &mut self.enemies {
            let fired = enemy.update(&ctx, &mut self.rng, dt);
            self.projectiles.extend(fired);
        }
        self.resolve_contact(session, tuning, events);

        // Projectiles
        for p in &mut self.projectiles {
            p.update(&self.colliders, &tuning.physics, self.level.width, dt);
        }
        self.resolve_hits(session, tuning, events);
        self.projectiles.retain(|p| p.alive);

        // Rules
        self.reap_enemies(session, tuning, events);
        if !self.player.health.is_alive() {
            return Some(StageOutcome::Died(DeathCause::Slain));
        }
        if self.player.body.pos.y > KILL_Y {
            return Some(StageOutcome::Died(DeathCause::Fell));
        }
        at_exit.then_some(StageOutcome::Complete)
    }

    fn collect(&mut self, session: &mut Session, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        if !self.player.health.is_alive() {
            return;
        }
        let r = self.player.rect();
        for coin in self.coins.iter_mut().filter(|c| !c.collected) {
            if coin.rect.overlaps(&r) {
                coin.collected = true;
                session.add_coins(1);
                events.push(GameEvent::CoinCollected {
                    total: session.coins,
                });
            }
        }
        for pickup in self.pickups.iter_mut().filter(|p| !p.collected) {
            if pickup.rect.overlaps(&r) {
                pickup.collected = true;
                match pickup.kind {
                    PickupKind::Dash => session.upgrades.dash = true,
                    PickupKind::Speed => {
                        self.player.timers.speed_boost = tuning.player.speed_boost_duration
                    }
                }
                events.push(GameEvent::PickupCollected(pickup.kind));
            }
        }
        if !self.checkpoint_reached && self.level.checkpoint.overlaps(&r) {
            self.checkpoint_reached = true;
            events.push(GameEvent::CheckpointReached);
        }
    }

    /// True when the player stands in an open exit
    fn check_exit(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if !self.player.health.is_alive() {
            return false;
        }
        let touching = self.level.exit.rect.overlaps(&self.player.rect());
        let open = !self.exit_locked || !self.boss_alive();
        let entered = touching && !self.touching_exit;
        self.touching_exit = touching;
        if touching && !open {
            if entered {
                events.push(GameEvent::ExitLocked);
            }
            return false;
        }
        touching
    }

    fn hurt_player(
        &mut self,
        session: &mut Session,
        tuning: &Tuning,
        amount: i32,
        from_x: f32,
        events: &mut Vec<GameEvent>,
    ) {
        let p = &tuning.player;
        let before = self.player.health.hp;
        let outcome = self.player.health.damage(amount, p.invulnerability);
        if !outcome.landed() {
            return;
        }
        session.stage.damage_taken += before - self.player.health.hp;
        self.player.timers.hurt_flash = p.hurt_flash;
        self.shake += HURT_SHAKE;
        let dir = self.player.body.center().x - from_x;
        apply_knockback(&mut self.player.body, dir, p.knockback_x, p.knockback_y);
        self.player.timers.dash = 0.0;
        events.push(GameEvent::PlayerHurt {
            hp: self.player.health.hp,
        });
    }

    fn resolve_contact(&mut self, session: &mut Session, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        if !self.player.health.is_alive() {
            return;
        }
        let r = self.player.rect();
        let hit = self
            .enemies
            .iter()
            .find(|e| e.health.is_alive() && e.rect().overlaps(&r))
            .map(|e| (e.contact_damage(tuning), e.body.center().x));
        if let Some((amount, from_x)) = hit {
            self.hurt_player(session, tuning, amount, from_x, events);
        }
    }

    fn resolve_hits(&mut self, session: &mut Session, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        let mut player_hits = Vec::new();
        for p in self.projectiles.iter_mut().filter(|p| p.alive) {
            let r = p.rect();
            match p.owner {
                Owner::Player => {
                    let target = self
                        .enemies
                        .iter_mut()
                        .find(|e| e.health.is_alive() && e.rect().overlaps(&r));
                    if let Some(enemy) = target {
                        p.alive = false;
                        let outcome = enemy.health.damage(p.damage, tuning.enemy.invulnerability);
                        if outcome.landed() {
                            enemy.hurt_flash = 0.12;
                            events.push(GameEvent::EnemyHit { id: enemy.id });
                        }
                    }
                }
                Owner::Enemy => {
                    if self.player.health.is_alive() && self.player.rect().overlaps(&r) {
                        p.alive = false;
                        player_hits.push((p.damage, r.center().x));
                    }
                }
            }
        }
        for (amount, from_x) in player_hits {
            self.hurt_player(session, tuning, amount, from_x, events);
        }
    }

    /// Remove dead enemies; a boss death opens the exit and pays its bounty
    fn reap_enemies(&mut self, session: &mut Session, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        let mut boss_down = false;
        let mut killed = 0;
        self.enemies.retain(|e| {
            if e.health.is_alive() {
                return true;
            }
            events.push(GameEvent::EnemyKilled {
                id: e.id,
                kind: e.kind,
            });
            boss_down |= e.kind == EnemyKind::Boss;
            killed += 1;
            false
        });
        session.stage.enemies_defeated += killed;

        if boss_down && self.exit_locked {
            let bounty = tuning.enemy.boss_bounty;
            self.exit_locked = false;
            session.add_coins(bounty);
            self.shake += BOSS_SHAKE;
            log::info!("Boss defeated on level {}", self.level.index + 1);
            events.push(GameEvent::BossDefeated { bounty });
            events.push(GameEvent::ExitUnlocked);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{DamageOutcome, Health};
    use crate::sim::level::{build_level, generate_level};
    use crate::sim::session::Character;

    const DT: f32 = 1.0 / 60.0;

    fn damage_player(stage: &mut Stage, session: &mut Session, tuning: &Tuning, amount: i32) -> DamageOutcome {
        let before = stage.player.health;
        let mut events = Vec::new();
        stage.hurt_player(session, tuning, amount, 0.0, &mut events);
        if stage.player.health == before {
            DamageOutcome::Ignored
        } else if stage.player.health.is_dead() {
            DamageOutcome::Killed
        } else {
            DamageOutcome::Hurt
        }
    }

    fn setup(level: Level) -> (Stage, Session, Tuning) {
        let tuning = Tuning::default();
        let mut session = Session::new(level.seed, Character::Sprinter);
        session.begin_stage(0.0);
        let stage = Stage::new(level, &session, &tuning, false);
        (stage, session, tuning)
    }

    fn run(stage: &mut Stage, session: &mut Session, tuning: &Tuning, frames: usize) -> (Vec<GameEvent>, Option<StageOutcome>) {
        let input = InputState::new();
        let mut events = Vec::new();
        for _ in 0..frames {
            if let Some(outcome) = stage.step(session, &input, tuning, DT, &mut events) {
                return (events, Some(outcome));
            }
        }
        (events, None)
    }

    fn quiet_level() -> Level {
        let mut level = generate_level(42, 1, &Tuning::default());
        level.enemies.clear();
        level
    }

    #[test]
    fn test_last_point_of_damage_dies_once() {
        let (mut stage, mut session, tuning) = setup(quiet_level());
        stage.player.health.set_max(6);
        stage.player.health.hp = 1;
        assert_eq!(damage_player(&mut stage, &mut session, &tuning, 1), DamageOutcome::Killed);
        assert_eq!(stage.player.health.hp, 0);

        let (events, outcome) = run(&mut stage, &mut session, &tuning, 3);
        assert_eq!(outcome, Some(StageOutcome::Died(DeathCause::Slain)));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PlayerHurt { .. })));

        stage.player.health.invulnerable = 0.0;
        assert_eq!(damage_player(&mut stage, &mut session, &tuning, 1), DamageOutcome::Ignored);
    }

    #[test]
    fn test_coin_collected_once() {
        let (mut stage, mut session, tuning) = setup(quiet_level());
        let coin = stage.coins[0].rect;
        stage.player.body.pos = Vec2::new(coin.x, coin.y);
        let mut events = Vec::new();
        stage.collect(&mut session, &tuning, &mut events);
        stage.collect(&mut session, &tuning, &mut events);
        let collected = events
            .iter()
            .filter(|e| matches!(e, GameEvent::CoinCollected { .. }))
            .count();
        assert_eq!(collected, 1);
        assert_eq!(session.coins, 1);
        assert_eq!(session.stage.coins, 1);
        assert!(stage.coins[0].collected);
    }

    #[test]
    fn test_dash_pickup_unlocks_dash() {
        let (mut stage, mut session, tuning) = setup(quiet_level());
        let dash = stage
            .pickups
            .iter()
            .find(|p| p.kind == PickupKind::Dash)
            .map(|p| p.rect)
            .unwrap();
        stage.player.body.pos = Vec2::new(dash.x, dash.y);
        let mut events = Vec::new();
        stage.collect(&mut session, &tuning, &mut events);
        assert!(session.upgrades.dash);
        assert!(events.contains(&GameEvent::PickupCollected(PickupKind::Dash)));
    }

    #[test]
    fn test_speed_pickup_does_not_refresh_boost() {
        let (mut stage, mut session, tuning) = setup(quiet_level());
        let speed = stage
            .pickups
            .iter()
            .find(|p| p.kind == PickupKind::Speed)
            .map(|p| p.rect)
            .unwrap();
        stage.player.body.pos = Vec2::new(speed.x, speed.y);
        let mut events = Vec::new();
        stage.collect(&mut session, &tuning, &mut events);
        assert_eq!(stage.player.timers.speed_boost, tuning.player.speed_boost_duration);

        // Boost has mostly run out; standing on the spent pickup again changes nothing
        stage.player.timers.speed_boost = 0.5;
        stage.collect(&mut session, &tuning, &mut events);
        assert_eq!(stage.player.timers.speed_boost, 0.5);
        let announced = events
            .iter()
            .filter(|e| **e == GameEvent::PickupCollected(PickupKind::Speed))
            .count();
        assert_eq!(announced, 1);
    }

    #[test]
    fn test_checkpoint_fires_once() {
        let (mut stage, mut session, tuning) = setup(quiet_level());
        let cp = stage.level.checkpoint;
        stage.player.body.pos = Vec2::new(cp.x, cp.y);
        let mut events = Vec::new();
        stage.collect(&mut session, &tuning, &mut events);
        stage.collect(&mut session, &tuning, &mut events);
        let hits = events
            .iter()
            .filter(|e| **e == GameEvent::CheckpointReached)
            .count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_open_exit_completes() {
        let (mut stage, mut session, tuning) = setup(quiet_level());
        let exit = stage.level.exit.rect;
        stage.player.body.pos = Vec2::new(exit.x + 2.0, exit.bottom() - PLAYER_HEIGHT);
        let (_, outcome) = run(&mut stage, &mut session, &tuning, 1);
        assert_eq!(outcome, Some(StageOutcome::Complete));
    }

    #[test]
    fn test_locked_exit_waits_for_boss() {
        let tuning = Tuning::default();
        let level = build_level(3, 4, &tuning);
        let (mut stage, mut session, _) = setup(level);
        assert!(stage.exit_locked);
        assert!(stage.boss_alive());

        let exit = stage.level.exit.rect;
        stage.player.body.pos = Vec2::new(exit.x + 2.0, exit.bottom() - PLAYER_HEIGHT);
        stage.player.health.invulnerable = 1_000.0;
        let (events, outcome) = run(&mut stage, &mut session, &tuning, 30);
        assert_eq!(outcome, None);
        let notices = events.iter().filter(|e| **e == GameEvent::ExitLocked).count();
        assert_eq!(notices, 1);

        // Fell the boss; the exit opens and pays the bounty
        let coins_before = session.coins;
        for enemy in stage.enemies.iter_mut().filter(|e| e.is_boss()) {
            enemy.health.damage(10_000, 0.0);
        }
        stage.player.body.pos = Vec2::new(exit.x + 2.0, exit.bottom() - PLAYER_HEIGHT);
        let mut events = Vec::new();
        let input = InputState::new();
        let first = stage.step(&mut session, &input, &tuning, DT, &mut events);
        assert!(events.iter().any(|e| matches!(e, GameEvent::BossDefeated { .. })));
        assert!(events.contains(&GameEvent::ExitUnlocked));
        assert!(!stage.exit_locked);
        assert_eq!(session.coins, coins_before + tuning.enemy.boss_bounty);
        let outcome = match first {
            Some(o) => Some(o),
            None => run(&mut stage, &mut session, &tuning, 2).1,
        };
        assert_eq!(outcome, Some(StageOutcome::Complete));
    }

    #[test]
    fn test_falling_out_dies() {
        let (mut stage, mut session, tuning) = setup(quiet_level());
        stage.player.body.pos = Vec2::new(10.0, KILL_Y + 5.0);
        let (_, outcome) = run(&mut stage, &mut session, &tuning, 1);
        assert_eq!(outcome, Some(StageOutcome::Died(DeathCause::Fell)));
    }

    #[test]
    fn test_enemy_bolt_hurts_player() {
        let (mut stage, mut session, tuning) = setup(quiet_level());
        let center = stage.player.body.center();
        stage.projectiles.push(Projectile::new(
            Owner::Enemy,
            center,
            Vec2::ZERO,
            1,
            1.0,
            0.0,
        ));
        let max = stage.player.health.max;
        let (events, _) = run(&mut stage, &mut session, &tuning, 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerHurt { .. })));
        assert_eq!(stage.player.health.hp, max - 1);
        assert_eq!(session.stage.damage_taken, 1);
        assert!(stage.projectiles.is_empty());
    }

    #[test]
    fn test_player_throw_kills_enemy() {
        let tuning = Tuning::default();
        let level = generate_level(42, 1, &tuning);
        let (mut stage, mut session, _) = setup(level);
        stage.enemies.truncate(1);
        let id = stage.enemies[0].id;
        stage.enemies[0].health = Health::new(1);
        let center = stage.enemies[0].body.center();
        stage.projectiles.push(Projectile::new(Owner::Player, center, Vec2::ZERO, 1, 1.0, 0.0));
        let mut events = Vec::new();
        let input = InputState::new();
        stage.step(&mut session, &input, &tuning, DT, &mut events);
        assert!(events.iter().any(|e| matches!(e, GameEvent::EnemyKilled { id: k, .. } if *k == id)));
        assert!(stage.enemies.is_empty());
        assert_eq!(session.stage.enemies_defeated, 1);
    }

    #[test]
    fn test_checkpoint_spawn() {
        let tuning = Tuning::default();
        let level = quiet_level();
        let session = Session::new(1, Character::Bruiser);
        let stage = Stage::new(level.clone(), &session, &tuning, true);
        assert!(stage.checkpoint_reached);
        assert!((stage.player.body.bottom() - level.checkpoint.bottom()).abs() < 1e-3);
        assert_eq!(stage.player.health.max, session.max_hp());
    }

    #[test]
    fn test_runtime_is_deterministic() {
        let tuning = Tuning::default();
        let level = generate_level(8, 3, &tuning);
        let (mut a, mut sa, _) = setup(level.clone());
        let (mut b, mut sb, _) = setup(level);
        let (ea, _) = run(&mut a, &mut sa, &tuning, 240);
        let (eb, _) = run(&mut b, &mut sb, &tuning, 240);
        assert_eq!(ea, eb);
        assert_eq!(a.player, b.player);
        assert_eq!(a.enemies, b.enemies);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn coins_counted_once(seed in any::<u32>(), visits in prop::collection::vec(any::<usize>(), 1..40)) {
                let tuning = Tuning::default();
                let mut level = generate_level(seed, 2, &tuning);
                level.enemies.clear();
                let (mut stage, mut session, tuning) = setup(level);
                let total = stage.coins.len();
                prop_assume!(total > 0);

                let mut events = Vec::new();
                for v in visits {
                    let coin = stage.coins[v % total].rect;
                    stage.player.body.pos = Vec2::new(coin.x, coin.y);
                    stage.collect(&mut session, &tuning, &mut events);
                }
                let flagged = stage.coins.iter().filter(|c| c.collected).count();
                let announced = events
                    .iter()
                    .filter(|e| matches!(e, GameEvent::CoinCollected { .. }))
                    .count();
                prop_assert_eq!(announced, flagged);
                prop_assert_eq!(session.coins as usize, flagged);
                prop_assert_eq!(stage.coins_remaining() + flagged, total);
            }

            #[test]
            fn pickups_consumed_once(seed in any::<u32>(), visits in prop::collection::vec(any::<usize>(), 1..20)) {
                let tuning = Tuning::default();
                let mut level = generate_level(seed, 2, &tuning);
                level.enemies.clear();
                let (mut stage, mut session, tuning) = setup(level);
                let total = stage.pickups.len();
                prop_assume!(total > 0);

                let mut events = Vec::new();
                let mut boost_grants = 0;
                for v in visits {
                    let pickup = &stage.pickups[v % total];
                    let rect = pickup.rect;
                    stage.player.body.pos = Vec2::new(rect.x, rect.y);
                    // Let any boost lapse so a second grant would show
                    stage.player.timers.speed_boost = 0.0;
                    stage.collect(&mut session, &tuning, &mut events);
                    if stage.player.timers.speed_boost > 0.0 {
                        boost_grants += 1;
                    }
                }
                let flagged = stage.pickups.iter().filter(|p| p.collected).count();
                let announced = events
                    .iter()
                    .filter(|e| matches!(e, GameEvent::PickupCollected(_)))
                    .count();
                prop_assert_eq!(announced, flagged);
                let speed_taken = stage
                    .pickups
                    .iter()
                    .filter(|p| p.collected && p.kind == PickupKind::Speed)
                    .count();
                prop_assert_eq!(boost_grants, speed_taken);
            }
        }
    }
}
