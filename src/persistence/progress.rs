//! Persistent player progress: best level reached and the tutorial flag

use serde::{Deserialize, Serialize};

use super::store::KeyValueStore;
use crate::error::StoreError;

const BEST_LEVEL_KEY: &str = "ledge_runner.best_level";
const TUTORIAL_KEY: &str = "ledge_runner.tutorial_done";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Highest one-based level number ever started
    pub best_level: u32,
    pub tutorial_done: bool,
}

impl Progress {
    /// Load from a store. Missing or malformed values fall back to defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let best_level = read(store, BEST_LEVEL_KEY).unwrap_or(0);
        let tutorial_done = read(store, TUTORIAL_KEY).unwrap_or(false);
        log::info!(
            "Loaded progress: best_level={} tutorial_done={}",
            best_level,
            tutorial_done
        );
        Self {
            best_level,
            tutorial_done,
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        store.set(BEST_LEVEL_KEY, &self.best_level.to_string())?;
        store.set(TUTORIAL_KEY, if self.tutorial_done { "true" } else { "false" })?;
        Ok(())
    }
}

fn read<T: std::str::FromStr>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    match store.get(key) {
        Ok(Some(raw)) => match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring malformed value for {}: {:?}", key, raw);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::warn!("Failed to read {}: {}", key, e);
            None
        }
    }
}
