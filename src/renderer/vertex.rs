//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.08, 0.1, 0.18, 1.0];
    pub const GROUND: [f32; 4] = [0.32, 0.22, 0.14, 1.0];
    pub const GRASS: [f32; 4] = [0.3, 0.7, 0.3, 1.0];
    pub const PLATFORM: [f32; 4] = [0.45, 0.35, 0.25, 1.0];
    pub const PLAYER: [f32; 4] = [0.2, 0.8, 0.9, 1.0];
    pub const PATROLLER: [f32; 4] = [0.9, 0.35, 0.3, 1.0];
    pub const SHOOTER: [f32; 4] = [0.85, 0.5, 0.9, 1.0];
    pub const BOSS: [f32; 4] = [0.6, 0.1, 0.2, 1.0];
    pub const PLAYER_SHOT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const ENEMY_BOLT: [f32; 4] = [1.0, 0.5, 0.1, 1.0];
    pub const COIN: [f32; 4] = [1.0, 0.85, 0.2, 1.0];
    pub const DASH_PICKUP: [f32; 4] = [0.4, 0.6, 1.0, 1.0];
    pub const SPEED_PICKUP: [f32; 4] = [0.4, 1.0, 0.5, 1.0];
    pub const CHECKPOINT: [f32; 4] = [0.6, 0.6, 0.6, 1.0];
    pub const CHECKPOINT_LIT: [f32; 4] = [0.3, 1.0, 0.6, 1.0];
    pub const EXIT_OPEN: [f32; 4] = [0.95, 0.95, 0.5, 1.0];
    pub const EXIT_LOCKED: [f32; 4] = [0.35, 0.3, 0.3, 1.0];
    pub const HURT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const HP_BACK: [f32; 4] = [0.15, 0.05, 0.05, 0.8];
    pub const HP_FILL: [f32; 4] = [0.9, 0.2, 0.25, 1.0];
    pub const BOSS_HP_FILL: [f32; 4] = [0.75, 0.2, 0.9, 1.0];
    pub const LOADING_FILL: [f32; 4] = [0.3, 0.8, 0.9, 1.0];
    pub const OVERLAY: [f32; 4] = [0.0, 0.0, 0.0, 0.55];
}
