//! WebGPU rendering module
//!
//! The game state is first captured into a [`FrameSnapshot`] (pure data),
//! then turned into coloured triangles and drawn in a single pass.

pub mod pipeline;
pub mod shapes;
pub mod snapshot;
pub mod vertex;

pub use pipeline::RenderState;
pub use snapshot::{FrameSnapshot, Hud, Sprite, SpriteKind};
