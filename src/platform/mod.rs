//! Platform abstraction layer
//!
//! Host-facing collaborators the simulation samples once per frame:
//! - Input: held/pressed state for the logical actions
//! - Menu: phase-dependent key bindings that produce commands and preference edits
//! - Time: frame delta clamping
//! - Launch: seed override parsing

pub mod input;
pub mod launch;
pub mod menu;
pub mod time;

pub use input::{Action, InputState};
pub use launch::{parse_seed, seed_from_query};
pub use menu::{menu_command, settings_change};
pub use time::FrameClock;
