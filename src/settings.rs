//! Game settings and preferences
//!
//! Persisted separately from progress, as one JSON value.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::persistence::KeyValueStore;

/// A preference the player can flip from the pause menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingToggle {
    ScreenShake,
    HurtFlash,
    ShowFps,
    ShowHints,
    MuteOnBlur,
    ReducedMotion,
}

impl SettingToggle {
    /// Pause-menu order
    pub const ALL: [SettingToggle; 6] = [
        SettingToggle::ScreenShake,
        SettingToggle::HurtFlash,
        SettingToggle::ShowFps,
        SettingToggle::ShowHints,
        SettingToggle::MuteOnBlur,
        SettingToggle::ReducedMotion,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingToggle::ScreenShake => "Screen shake",
            SettingToggle::HurtFlash => "Hurt flash",
            SettingToggle::ShowFps => "FPS counter",
            SettingToggle::ShowHints => "Hints",
            SettingToggle::MuteOnBlur => "Mute on blur",
            SettingToggle::ReducedMotion => "Reduced motion",
        }
    }
}

/// One in-game preference edit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsChange {
    Toggle(SettingToggle),
    /// Master volume step
    Volume(f32),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Visual Effects ===
    /// Camera shake on hits and boss defeats
    pub screen_shake: bool,
    /// Flash sprites when hurt
    pub hurt_flash: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
    /// Show tutorial hints on the first level
    pub show_hints: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,
            hurt_flash: true,

            show_fps: false,
            show_hints: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "ledge_runner.settings";

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective hurt flash (respects reduced_motion)
    pub fn effective_hurt_flash(&self) -> bool {
        self.hurt_flash && !self.reduced_motion
    }

    /// Flip one preference and return its new value
    pub fn toggle(&mut self, toggle: SettingToggle) -> bool {
        let flag = match toggle {
            SettingToggle::ScreenShake => &mut self.screen_shake,
            SettingToggle::HurtFlash => &mut self.hurt_flash,
            SettingToggle::ShowFps => &mut self.show_fps,
            SettingToggle::ShowHints => &mut self.show_hints,
            SettingToggle::MuteOnBlur => &mut self.mute_on_blur,
            SettingToggle::ReducedMotion => &mut self.reduced_motion,
        };
        *flag = !*flag;
        *flag
    }

    /// Step master volume by `delta`, clamped to 0..=1
    pub fn adjust_volume(&mut self, delta: f32) -> f32 {
        self.master_volume = (self.master_volume + delta).clamp(0.0, 1.0);
        self.master_volume
    }

    /// Apply an edit; returns a short description for a notice
    pub fn apply(&mut self, change: SettingsChange) -> String {
        match change {
            SettingsChange::Toggle(toggle) => {
                let on = self.toggle(toggle);
                format!("{}: {}", toggle.label(), if on { "on" } else { "off" })
            }
            SettingsChange::Volume(delta) => {
                let volume = self.adjust_volume(delta);
                format!("Volume: {}%", (volume * 100.0).round() as i32)
            }
        }
    }

    /// Final gain for a sound effect
    pub fn sfx_gain(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Failed to read settings: {}", e),
        }
        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_round_trip() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            reduced_motion: true,
            master_volume: 0.3,
            ..Settings::default()
        };
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_reduced_motion_overrides_effects() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(settings.screen_shake);
        assert!(!settings.effective_screen_shake());
        assert!(!settings.effective_hurt_flash());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{ "show_fps": true }"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert!(settings.show_fps);
        assert_eq!(settings.master_volume, Settings::default().master_volume);
    }

    #[test]
    fn test_toggle_then_save_persists() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::default();
        assert!(settings.toggle(SettingToggle::ShowFps));
        assert!(settings.toggle(SettingToggle::ReducedMotion));
        assert!(!settings.toggle(SettingToggle::ShowHints));
        settings.save(&mut store).unwrap();

        let loaded = Settings::load(&store);
        assert!(loaded.show_fps);
        assert!(!loaded.effective_screen_shake());
        assert!(!loaded.show_hints);
    }

    #[test]
    fn test_apply_describes_change() {
        let mut settings = Settings::default();
        assert_eq!(
            settings.apply(SettingsChange::Toggle(SettingToggle::ShowFps)),
            "FPS counter: on"
        );
        assert_eq!(settings.apply(SettingsChange::Volume(-0.3)), "Volume: 50%");
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut settings = Settings::default();
        assert_eq!(settings.adjust_volume(5.0), 1.0);
        assert_eq!(settings.adjust_volume(-3.0), 0.0);
        assert_eq!(settings.sfx_gain(), 0.0);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let mut store = MemoryStore::new();
        store
            .set(
                Settings::STORAGE_KEY,
                r#"{ "palette": "dark", "show_fps": true }"#,
            )
            .unwrap();
        assert!(Settings::load(&store).show_fps);
    }

    #[test]
    fn test_garbage_falls_back() {
        let mut store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, "{{{").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
