//! Menu key bindings
//!
//! Outside of play the host turns key presses into [`Command`] values. The
//! binding depends on the phase so the same digit picks a character on the
//! select screen and buys an upgrade in the shop.

use crate::settings::{SettingToggle, SettingsChange};
use crate::sim::{Character, Command, Phase, Upgrade};

/// Master volume step for the pause menu's -/+ keys
const VOLUME_STEP: f32 = 0.1;

/// Command for `key` (a `KeyboardEvent.key` value) in `phase`, if any
pub fn menu_command(phase: Phase, key: &str) -> Option<Command> {
    let key = key.to_ascii_lowercase();
    match (phase, key.as_str()) {
        (Phase::Start, "enter" | " ") => Some(Command::Confirm),
        (Phase::Select, "1") => Some(Command::SelectCharacter(Character::Sprinter)),
        (Phase::Select, "2") => Some(Command::SelectCharacter(Character::Bruiser)),
        (Phase::Play | Phase::StageComplete, "s") => Some(Command::OpenShop),
        (Phase::Shop, "s" | "escape" | "enter") => Some(Command::CloseShop),
        (Phase::Shop, digit) => digit
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| Upgrade::ALL.get(i))
            .map(|&upgrade| Command::Purchase(upgrade)),
        (Phase::StageComplete, "enter" | "c") => Some(Command::Continue),
        (Phase::Dead, "enter" | "r") => Some(Command::RetryStage),
        (Phase::Dead | Phase::Paused | Phase::StageComplete, "n") => Some(Command::NewRun),
        _ => None,
    }
}

/// Preference edit for `key` on the pause menu, if any
///
/// Digits flip toggles in [`SettingToggle::ALL`] order; `-` and `+` step the
/// master volume.
pub fn settings_change(phase: Phase, key: &str) -> Option<SettingsChange> {
    if phase != Phase::Paused {
        return None;
    }
    match key {
        "-" | "_" => Some(SettingsChange::Volume(-VOLUME_STEP)),
        "+" | "=" => Some(SettingsChange::Volume(VOLUME_STEP)),
        digit => digit
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| SettingToggle::ALL.get(i))
            .map(|&toggle| SettingsChange::Toggle(toggle)),
    }
}
