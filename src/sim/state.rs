//! Top-level game state
//!
//! Everything the host needs to drive and draw a frame hangs off [`GameState`]:
//! the current phase, the run session, the live stage and persistent progress.

use serde::{Deserialize, Serialize};

use super::events::{DeathCause, StageSummary};
use super::session::{Character, Session, Upgrade};
use super::stage::Stage;
use crate::persistence::Progress;
use crate::tuning::Tuning;

/// Screen-level phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for assets to settle
    Boot,
    /// Title screen
    Start,
    /// Character select
    Select,
    /// Loading screen before the first stage of a run
    Loading,
    /// Loading screen between stages
    NextLoading,
    /// Active gameplay
    Play,
    Paused,
    StageComplete,
    Shop,
    Dead,
}

impl Phase {
    pub fn is_loading(&self) -> bool {
        matches!(self, Phase::Loading | Phase::NextLoading)
    }

    /// Phases that draw the stage underneath their overlay
    pub fn shows_stage(&self) -> bool {
        matches!(
            self,
            Phase::Play | Phase::Paused | Phase::StageComplete | Phase::Shop | Phase::Dead
        )
    }
}

/// UI-level requests from menus and overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Leave the title screen
    Confirm,
    SelectCharacter(Character),
    OpenShop,
    Purchase(Upgrade),
    CloseShop,
    /// Move on from the stage-complete screen
    Continue,
    /// Restart the stage after death
    RetryStage,
    /// Back to character select with a fresh run
    NewRun,
    TogglePause,
}

/// Tutorial goals for the first level; satisfied flags persist across runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tutorial {
    pub moved: bool,
    pub jumped: bool,
    pub threw: bool,
    pub collected: bool,
}

impl Tutorial {
    pub fn is_complete(&self) -> bool {
        self.moved && self.jumped && self.threw && self.collected
    }

    /// Hint for the first unmet goal
    pub fn next_hint(&self) -> Option<&'static str> {
        if !self.moved {
            Some("Use the arrow keys to run")
        } else if !self.jumped {
            Some("Press Up or Space to jump")
        } else if !self.threw {
            Some("Press J to throw")
        } else if !self.collected {
            Some("Grab a coin")
        } else {
            None
        }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: Phase,
    pub tuning: Tuning,
    pub progress: Progress,
    pub tutorial: Tutorial,
    pub session: Option<Session>,
    pub stage: Option<Stage>,
    /// Fixed run seed for reproducible runs; random when `None`
    pub seed_override: Option<u32>,
    /// Seconds simulated since boot
    pub clock: f64,
    /// Seconds spent in the current loading phase
    pub loading_elapsed: f32,
    /// Phase to return to when the shop closes
    pub shop_return: Phase,
    /// The next stage build starts at the checkpoint
    pub respawn_at_checkpoint: bool,
    pub last_summary: Option<StageSummary>,
    pub death: Option<DeathCause>,
    pub(crate) assets_settled: bool,
}

impl GameState {
    pub fn new(tuning: Tuning, progress: Progress) -> Self {
        Self {
            phase: Phase::Boot,
            tuning,
            progress,
            tutorial: Tutorial::default(),
            session: None,
            stage: None,
            seed_override: None,
            clock: 0.0,
            loading_elapsed: 0.0,
            shop_return: Phase::Play,
            respawn_at_checkpoint: false,
            last_summary: None,
            death: None,
            assets_settled: false,
        }
    }

    pub fn with_seed(mut self, seed: Option<u32>) -> Self {
        self.seed_override = seed;
        self
    }

    /// Host callback once every asset has loaded or failed
    pub fn on_assets_settled(&mut self) {
        self.assets_settled = true;
    }

    /// The tutorial runs on the first level until it has been finished once
    pub fn tutorial_active(&self) -> bool {
        !self.progress.tutorial_done
            && self.phase == Phase::Play
            && self.session.as_ref().is_some_and(|s| s.level_index == 0)
    }

    /// Loading progress in [0, 1] for the loading bar
    pub fn loading_fraction(&self) -> f32 {
        let duration = match self.phase {
            Phase::Loading => self.tuning.flow.loading_secs,
            Phase::NextLoading => self.tuning.flow.next_loading_secs,
            _ => return 0.0,
        };
        if duration <= 0.0 {
            1.0
        } else {
            (self.loading_elapsed / duration).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_in_boot() {
        let state = GameState::new(Tuning::default(), Progress::default());
        assert_eq!(state.phase, Phase::Boot);
        assert!(state.session.is_none());
        assert!(!state.tutorial_active());
    }

    #[test]
    fn test_tutorial_hints_in_order() {
        let mut t = Tutorial::default();
        assert_eq!(t.next_hint(), Some("Use the arrow keys to run"));
        t.moved = true;
        t.jumped = true;
        assert_eq!(t.next_hint(), Some("Press J to throw"));
        t.threw = true;
        t.collected = true;
        assert!(t.is_complete());
        assert_eq!(t.next_hint(), None);
    }

    #[test]
    fn test_phase_helpers() {
        assert!(Phase::NextLoading.is_loading());
        assert!(!Phase::Play.is_loading());
        assert!(Phase::Dead.shows_stage());
        assert!(!Phase::Select.shows_stage());
    }
}
