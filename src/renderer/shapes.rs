//! Shape generation for 2D primitives
//!
//! Everything is built from axis-aligned quads and triangle fans in screen
//! pixels; the pipeline maps pixels to clip space.

use glam::Vec2;
use std::f32::consts::PI;

use super::snapshot::{FrameSnapshot, Sprite, SpriteKind};
use super::vertex::{Vertex, colors};
use crate::consts::{SURFACE_INSET, VIEW_HEIGHT, VIEW_WIDTH};
use crate::sim::{Facing, Phase, Rect};

/// Two triangles covering `r`
pub fn quad(r: Rect, color: [f32; 4]) -> [Vertex; 6] {
    let (l, t, rt, b) = (r.left(), r.top(), r.right(), r.bottom());
    [
        Vertex::new(l, t, color),
        Vertex::new(l, b, color),
        Vertex::new(rt, t, color),
        Vertex::new(rt, t, color),
        Vertex::new(l, b, color),
        Vertex::new(rt, b, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Horizontal bar filled to `fraction`
pub fn bar(r: Rect, fraction: f32, back: [f32; 4], fill: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(12);
    vertices.extend(quad(r, back));
    let w = r.w * fraction.clamp(0.0, 1.0);
    if w > 0.0 {
        vertices.extend(quad(Rect::new(r.x, r.y, w, r.h), fill));
    }
    vertices
}

fn sprite_color(kind: SpriteKind) -> [f32; 4] {
    match kind {
        SpriteKind::Ground => colors::GROUND,
        SpriteKind::Platform => colors::PLATFORM,
        SpriteKind::Player => colors::PLAYER,
        SpriteKind::Patroller => colors::PATROLLER,
        SpriteKind::Shooter => colors::SHOOTER,
        SpriteKind::Boss => colors::BOSS,
        SpriteKind::PlayerShot => colors::PLAYER_SHOT,
        SpriteKind::EnemyBolt => colors::ENEMY_BOLT,
        SpriteKind::Coin => colors::COIN,
        SpriteKind::DashPickup => colors::DASH_PICKUP,
        SpriteKind::SpeedPickup => colors::SPEED_PICKUP,
        SpriteKind::Checkpoint => colors::CHECKPOINT,
        SpriteKind::CheckpointLit => colors::CHECKPOINT_LIT,
        SpriteKind::ExitOpen => colors::EXIT_OPEN,
        SpriteKind::ExitLocked => colors::EXIT_LOCKED,
    }
}

fn sprite(s: &Sprite, out: &mut Vec<Vertex>) {
    let color = if s.flash {
        colors::HURT
    } else {
        sprite_color(s.kind)
    };
    match s.kind {
        SpriteKind::Coin | SpriteKind::PlayerShot | SpriteKind::EnemyBolt => {
            out.extend(circle(s.rect.center(), s.rect.w * 0.5, color, 12));
        }
        SpriteKind::Ground | SpriteKind::Platform => {
            out.extend(quad(s.rect, color));
            // Grass strip over the collision inset
            let grass = Rect::new(s.rect.x, s.rect.y, s.rect.w, SURFACE_INSET + 2.0);
            out.extend(quad(grass, colors::GRASS));
        }
        _ => {
            out.extend(quad(s.rect, color));
            // Eye marks the facing side of characters
            if matches!(
                s.kind,
                SpriteKind::Player | SpriteKind::Patroller | SpriteKind::Shooter | SpriteKind::Boss
            ) {
                let eye = s.rect.w * 0.18;
                let x = match s.facing {
                    Facing::Right => s.rect.right() - eye * 2.0,
                    Facing::Left => s.rect.left() + eye,
                };
                out.extend(quad(
                    Rect::new(x, s.rect.top() + s.rect.h * 0.2, eye, eye),
                    colors::BACKGROUND,
                ));
            }
        }
    }
}

/// Every vertex for one frame, in screen pixels
pub fn frame_vertices(snapshot: &FrameSnapshot) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(snapshot.sprites.len() * 8 + 64);
    for s in &snapshot.sprites {
        sprite(s, &mut out);
    }

    let hud = &snapshot.hud;
    if snapshot.phase.shows_stage() && hud.max_hp > 0 {
        out.extend(bar(
            Rect::new(16.0, 16.0, 160.0, 12.0),
            hud.hp as f32 / hud.max_hp as f32,
            colors::HP_BACK,
            colors::HP_FILL,
        ));
        for i in 0..hud.coins.min(40) {
            let c = Vec2::new(20.0 + i as f32 * 10.0, 40.0);
            out.extend(circle(c, 4.0, colors::COIN, 8));
        }
        if let Some((hp, max)) = hud.boss_hp {
            out.extend(bar(
                Rect::new(VIEW_WIDTH * 0.25, VIEW_HEIGHT - 28.0, VIEW_WIDTH * 0.5, 10.0),
                hp as f32 / max.max(1) as f32,
                colors::HP_BACK,
                colors::BOSS_HP_FILL,
            ));
        }
    }

    if matches!(
        snapshot.phase,
        Phase::Paused | Phase::Dead | Phase::StageComplete | Phase::Shop
    ) {
        out.extend(quad(
            Rect::new(0.0, 0.0, VIEW_WIDTH, VIEW_HEIGHT),
            colors::OVERLAY,
        ));
    }
    if let Some(fraction) = snapshot.loading {
        out.extend(bar(
            Rect::new(VIEW_WIDTH * 0.2, VIEW_HEIGHT * 0.5 - 8.0, VIEW_WIDTH * 0.6, 16.0),
            fraction,
            colors::HP_BACK,
            colors::LOADING_FILL,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::snapshot::Hud;

    fn snapshot(phase: Phase, sprites: Vec<Sprite>) -> FrameSnapshot {
        FrameSnapshot {
            phase,
            camera: Vec2::ZERO,
            shake: Vec2::ZERO,
            sprites,
            hud: Hud::default(),
            hint: None,
            loading: None,
        }
    }

    #[test]
    fn test_quad_covers_rect() {
        let v = quad(Rect::new(10.0, 20.0, 30.0, 40.0), [1.0; 4]);
        let xs: Vec<f32> = v.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = v.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), 10.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 40.0);
        assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 60.0);
    }

    #[test]
    fn test_bar_fill_clamped() {
        assert_eq!(bar(Rect::new(0.0, 0.0, 100.0, 10.0), 0.0, [0.0; 4], [1.0; 4]).len(), 6);
        let full = bar(Rect::new(0.0, 0.0, 100.0, 10.0), 3.0, [0.0; 4], [1.0; 4]);
        assert_eq!(full.len(), 12);
        assert_eq!(full[11].position[0], 100.0);
    }

    #[test]
    fn test_flash_overrides_color() {
        let s = Sprite {
            kind: SpriteKind::Player,
            rect: Rect::new(0.0, 0.0, 28.0, 40.0),
            flash: true,
            facing: Facing::Left,
        };
        let v = frame_vertices(&snapshot(Phase::Start, vec![s]));
        assert_eq!(v[0].color, colors::HURT);
    }

    #[test]
    fn test_overlay_only_on_overlay_phases() {
        let play = frame_vertices(&snapshot(Phase::Play, Vec::new()));
        let paused = frame_vertices(&snapshot(Phase::Paused, Vec::new()));
        assert!(play.is_empty());
        assert_eq!(paused.len(), 6);
    }
}
