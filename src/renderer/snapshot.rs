//! Read-only frame snapshot
//!
//! Everything a frame draws, in screen pixels, extracted from the game state
//! once per frame. Building it never mutates the simulation, and it needs no
//! GPU, so it is what the tests exercise.

use glam::Vec2;

use crate::consts::{VIEW_HEIGHT, VIEW_WIDTH};
use crate::settings::Settings;
use crate::sim::{EnemyKind, Facing, GameState, Owner, Phase, PickupKind, Rect, Stage};

/// What a sprite depicts; the renderer picks colours from this
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Ground,
    Platform,
    Player,
    Patroller,
    Shooter,
    Boss,
    PlayerShot,
    EnemyBolt,
    Coin,
    DashPickup,
    SpeedPickup,
    Checkpoint,
    CheckpointLit,
    ExitOpen,
    ExitLocked,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub kind: SpriteKind,
    /// Screen-space rectangle
    pub rect: Rect,
    /// Draw with the hurt tint
    pub flash: bool,
    pub facing: Facing,
}

/// HUD numbers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hud {
    pub level: u32,
    pub best_level: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub coins: u32,
    /// Current and max HP of a living boss
    pub boss_hp: Option<(i32, i32)>,
    pub dash_ready: Option<bool>,
    pub fps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub phase: Phase,
    /// World position of the viewport's top-left corner
    pub camera: Vec2,
    /// Shake offset already applied to every sprite
    pub shake: Vec2,
    pub sprites: Vec<Sprite>,
    pub hud: Hud,
    pub hint: Option<&'static str>,
    /// Fill fraction for the loading bar
    pub loading: Option<f32>,
}

/// Camera x that centres `focus_x` without showing past either level edge
pub fn camera_x(focus_x: f32, level_width: f32) -> f32 {
    let max = (level_width - VIEW_WIDTH).max(0.0);
    (focus_x - VIEW_WIDTH * 0.5).clamp(0.0, max)
}

/// Deterministic jitter for a given amplitude and time
fn shake_offset(amplitude: f32, t: f32) -> Vec2 {
    if amplitude <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new((t * 83.0).sin(), (t * 71.0).cos()) * amplitude
}

impl FrameSnapshot {
    pub fn capture(state: &GameState, settings: &Settings, fps: u32) -> Self {
        let mut snapshot = Self {
            phase: state.phase,
            camera: Vec2::ZERO,
            shake: Vec2::ZERO,
            sprites: Vec::new(),
            hud: Hud {
                best_level: state.progress.best_level,
                fps: settings.show_fps.then_some(fps),
                ..Hud::default()
            },
            hint: None,
            loading: state.phase.is_loading().then(|| state.loading_fraction()),
        };

        if let Some(session) = &state.session {
            snapshot.hud.level = session.level_index + 1;
            snapshot.hud.coins = session.coins;
        }
        match (&state.stage, &state.session) {
            (Some(stage), Some(session)) if state.phase.shows_stage() => {
                snapshot.capture_stage(stage, settings);
                if session.upgrades.dash {
                    snapshot.hud.dash_ready = Some(stage.player.timers.dash_cooldown <= 0.0);
                }
            }
            _ => {}
        }
        if state.tutorial_active() && settings.show_hints {
            snapshot.hint = state.tutorial.next_hint();
        }
        snapshot
    }

    fn capture_stage(&mut self, stage: &Stage, settings: &Settings) {
        let player = &stage.player;
        self.camera = Vec2::new(camera_x(player.body.center().x, stage.level.width), 0.0);
        if settings.effective_screen_shake() {
            self.shake = shake_offset(stage.shake, stage.elapsed);
        }
        let flash_ok = settings.effective_hurt_flash();

        self.hud.hp = player.health.hp;
        self.hud.max_hp = player.health.max;
        self.hud.boss_hp = stage
            .boss()
            .filter(|b| b.health.is_alive())
            .map(|b| (b.health.hp, b.health.max));

        let level = &stage.level;
        for (i, solid) in level.solids.iter().enumerate() {
            let kind = if i == 0 {
                SpriteKind::Ground
            } else {
                SpriteKind::Platform
            };
            self.push(kind, solid.visual, false, Facing::Right);
        }
        let checkpoint = if stage.checkpoint_reached {
            SpriteKind::CheckpointLit
        } else {
            SpriteKind::Checkpoint
        };
        self.push(checkpoint, level.checkpoint, false, Facing::Right);
        let exit = if stage.exit_locked && stage.boss_alive() {
            SpriteKind::ExitLocked
        } else {
            SpriteKind::ExitOpen
        };
        self.push(exit, level.exit.rect, false, Facing::Right);

        for coin in stage.coins.iter().filter(|c| !c.collected) {
            self.push(SpriteKind::Coin, coin.rect, false, Facing::Right);
        }
        for pickup in stage.pickups.iter().filter(|p| !p.collected) {
            let kind = match pickup.kind {
                PickupKind::Dash => SpriteKind::DashPickup,
                PickupKind::Speed => SpriteKind::SpeedPickup,
            };
            self.push(kind, pickup.rect, false, Facing::Right);
        }
        for enemy in &stage.enemies {
            let kind = match enemy.kind {
                EnemyKind::Patroller => SpriteKind::Patroller,
                EnemyKind::Shooter => SpriteKind::Shooter,
                EnemyKind::Boss => SpriteKind::Boss,
            };
            self.push(kind, enemy.rect(), flash_ok && enemy.hurt_flash > 0.0, enemy.facing);
        }
        for p in &stage.projectiles {
            let kind = match p.owner {
                Owner::Player => SpriteKind::PlayerShot,
                Owner::Enemy => SpriteKind::EnemyBolt,
            };
            self.push(kind, p.rect(), false, Facing::Right);
        }
        let flash = flash_ok && player.timers.hurt_flash > 0.0;
        self.push(SpriteKind::Player, player.rect(), flash, player.facing);
    }

    /// Add a world rectangle if any of it is on screen
    fn push(&mut self, kind: SpriteKind, world: Rect, flash: bool, facing: Facing) {
        let offset = self.shake - self.camera;
        let rect = Rect::new(world.x + offset.x, world.y + offset.y, world.w, world.h);
        if rect.right() < 0.0 || rect.left() > VIEW_WIDTH || rect.bottom() < 0.0 || rect.top() > VIEW_HEIGHT {
            return;
        }
        self.sprites.push(Sprite {
            kind,
            rect,
            flash,
            facing,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Progress;
    use crate::platform::InputState;
    use crate::sim::{Character, Command, tick};
    use crate::tuning::Tuning;

    fn playing() -> GameState {
        let mut state = GameState::new(Tuning::default(), Progress::default()).with_seed(Some(12));
        state.on_assets_settled();
        let input = InputState::new();
        tick(&mut state, &input, &[], 0.016);
        tick(&mut state, &input, &[Command::Confirm], 0.016);
        tick(&mut state, &input, &[Command::SelectCharacter(Character::Sprinter)], 0.016);
        for _ in 0..200 {
            tick(&mut state, &input, &[], 0.016);
        }
        state
    }

    #[test]
    fn test_camera_clamps_to_level() {
        assert_eq!(camera_x(10.0, 3000.0), 0.0);
        assert_eq!(camera_x(1500.0, 3000.0), 1500.0 - VIEW_WIDTH * 0.5);
        assert_eq!(camera_x(2990.0, 3000.0), 3000.0 - VIEW_WIDTH);
        assert_eq!(camera_x(400.0, 500.0), 0.0);
    }

    #[test]
    fn test_capture_play_frame() {
        let state = playing();
        assert_eq!(state.phase, Phase::Play);
        let snapshot = FrameSnapshot::capture(&state, &Settings::default(), 60);
        assert_eq!(snapshot.hud.level, 1);
        assert!(snapshot.hud.hp > 0);
        assert!(snapshot.sprites.iter().any(|s| s.kind == SpriteKind::Player));
        assert!(snapshot.sprites.iter().any(|s| s.kind == SpriteKind::Ground));
        assert_eq!(snapshot.hud.fps, None);
        assert_eq!(snapshot.hint, Some("Use the arrow keys to run"));
    }

    #[test]
    fn test_capture_does_not_mutate() {
        let state = playing();
        let before = state.stage.as_ref().map(|s| s.player.clone());
        let _ = FrameSnapshot::capture(&state, &Settings::default(), 60);
        assert_eq!(state.stage.as_ref().map(|s| s.player.clone()), before);
    }

    #[test]
    fn test_reduced_motion_disables_shake() {
        let mut state = playing();
        if let Some(stage) = state.stage.as_mut() {
            stage.shake = 10.0;
            stage.elapsed = 0.3;
        }
        let calm = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert_eq!(FrameSnapshot::capture(&state, &calm, 60).shake, Vec2::ZERO);
        assert_ne!(FrameSnapshot::capture(&state, &Settings::default(), 60).shake, Vec2::ZERO);
    }

    #[test]
    fn test_menu_has_no_sprites() {
        let mut state = GameState::new(Tuning::default(), Progress::default());
        state.on_assets_settled();
        tick(&mut state, &InputState::new(), &[], 0.016);
        let snapshot = FrameSnapshot::capture(&state, &Settings::default(), 60);
        assert_eq!(snapshot.phase, Phase::Start);
        assert!(snapshot.sprites.is_empty());
        assert!(snapshot.loading.is_none());
    }
}
