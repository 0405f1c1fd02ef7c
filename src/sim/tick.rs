//! Per-frame state machine
//!
//! `tick` applies queued commands, then the pause key, then advances whatever
//! the current phase runs. Rejected commands never change state; they come
//! back as [`GameEvent::Notice`].

use super::events::{GameEvent, StageSummary};
use super::level::build_level;
use super::session::Session;
use super::stage::{Stage, StageOutcome};
use super::state::{Command, GameState, Phase};
use crate::consts::MAX_FRAME_DT;
use crate::error::{CommandError, ShopError, TransitionError};
use crate::platform::{Action, InputState};

/// Advance the game by one frame
pub fn tick(state: &mut GameState, input: &InputState, commands: &[Command], dt: f32) -> Vec<GameEvent> {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };
    let mut events = Vec::new();
    let before = state.phase;

    for &command in commands {
        if let Err(err) = apply_command(state, command, &mut events) {
            log::debug!("Rejected {:?}: {}", command, err);
            events.push(GameEvent::Notice(err.to_string()));
        }
    }

    // Menus ignore the pause key, and so does a frame whose commands already
    // moved the phase (Escape both closes the shop and presses pause)
    let pausable = state.phase == before
        && matches!(
            before,
            Phase::Play | Phase::Paused | Phase::Loading | Phase::NextLoading
        );
    if input.is_pressed(Action::Pause) && pausable {
        if let Err(err) = toggle_pause(state, &mut events) {
            events.push(GameEvent::Notice(err.to_string()));
        }
    }

    match state.phase {
        Phase::Boot => {
            if state.assets_settled {
                set_phase(state, Phase::Start, &mut events);
                events.push(GameEvent::AssetsReady);
            }
        }
        Phase::Loading | Phase::NextLoading => {
            state.clock += dt as f64;
            advance_loading(state, dt, &mut events);
        }
        Phase::Play => {
            state.clock += dt as f64;
            play_frame(state, input, dt, &mut events);
        }
        _ => {}
    }

    events
}

fn set_phase(state: &mut GameState, to: Phase, events: &mut Vec<GameEvent>) {
    let from = state.phase;
    if from != to {
        log::info!("Phase {:?} -> {:?}", from, to);
        state.phase = to;
        events.push(GameEvent::PhaseChanged { from, to });
    }
}

fn not_allowed(command: Command, phase: Phase) -> CommandError {
    TransitionError::NotAllowed { command, phase }.into()
}

fn apply_command(state: &mut GameState, command: Command, events: &mut Vec<GameEvent>) -> Result<(), CommandError> {
    let phase = state.phase;
    match command {
        Command::Confirm => {
            if phase != Phase::Start {
                return Err(not_allowed(command, phase));
            }
            set_phase(state, Phase::Select, events);
        }
        Command::SelectCharacter(character) => {
            if phase != Phase::Select {
                return Err(not_allowed(command, phase));
            }
            let seed = state.seed_override.unwrap_or_else(rand::random);
            log::info!("New run: seed={} character={}", seed, character.name());
            state.session = Some(Session::new(seed, character));
            begin_loading(state, Phase::Loading, events);
            events.push(GameEvent::RunStarted { seed, character });
        }
        Command::OpenShop => {
            if !matches!(phase, Phase::Play | Phase::StageComplete) {
                return Err(not_allowed(command, phase));
            }
            let session = state
                .session
                .as_mut()
                .ok_or_else(|| not_allowed(command, phase))?;
            if session.shop_used {
                return Err(ShopError::AlreadyVisited.into());
            }
            session.shop_used = true;
            state.shop_return = phase;
            set_phase(state, Phase::Shop, events);
        }
        Command::Purchase(upgrade) => {
            if phase != Phase::Shop {
                return Err(ShopError::Closed.into());
            }
            let session = state.session.as_mut().ok_or(ShopError::Closed)?;
            let price = session.purchase(upgrade, &state.tuning.shop)?;
            let max_hp = session.max_hp();
            if let Some(stage) = state.stage.as_mut() {
                stage.player.health.set_max(max_hp);
            }
            events.push(GameEvent::Purchased { upgrade, price });
        }
        Command::CloseShop => {
            if phase != Phase::Shop {
                return Err(not_allowed(command, phase));
            }
            let back = state.shop_return;
            set_phase(state, back, events);
        }
        Command::Continue => {
            if phase != Phase::StageComplete {
                return Err(not_allowed(command, phase));
            }
            if let Some(session) = state.session.as_mut() {
                session.level_index += 1;
            }
            state.respawn_at_checkpoint = false;
            begin_loading(state, Phase::NextLoading, events);
        }
        Command::RetryStage => {
            if phase != Phase::Dead {
                return Err(not_allowed(command, phase));
            }
            if let Some(session) = state.session.as_mut() {
                session.restore_snapshot();
            }
            state.respawn_at_checkpoint = state.stage.as_ref().is_some_and(|s| s.checkpoint_reached);
            begin_loading(state, Phase::Loading, events);
        }
        Command::NewRun => {
            if !matches!(phase, Phase::Dead | Phase::Paused | Phase::StageComplete) {
                return Err(not_allowed(command, phase));
            }
            state.session = None;
            state.stage = None;
            state.death = None;
            state.last_summary = None;
            set_phase(state, Phase::Select, events);
        }
        Command::TogglePause => toggle_pause(state, events)?,
    }
    Ok(())
}

fn toggle_pause(state: &mut GameState, events: &mut Vec<GameEvent>) -> Result<(), CommandError> {
    match state.phase {
        Phase::Play => set_phase(state, Phase::Paused, events),
        Phase::Paused => set_phase(state, Phase::Play, events),
        Phase::Loading | Phase::NextLoading => return Err(TransitionError::PauseWhileLoading.into()),
        phase => return Err(not_allowed(Command::TogglePause, phase)),
    }
    Ok(())
}

fn begin_loading(state: &mut GameState, phase: Phase, events: &mut Vec<GameEvent>) {
    state.stage = None;
    state.loading_elapsed = 0.0;
    state.death = None;
    set_phase(state, phase, events);
}

/// Build the level part-way through the loading screen and start play at the end
fn advance_loading(state: &mut GameState, dt: f32, events: &mut Vec<GameEvent>) {
    let flow = &state.tuning.flow;
    let duration = if state.phase == Phase::Loading {
        flow.loading_secs
    } else {
        flow.next_loading_secs
    };
    let build_at = duration * flow.build_point.clamp(0.0, 1.0);
    state.loading_elapsed += dt;

    if state.stage.is_none() && state.loading_elapsed >= build_at {
        build_stage(state, events);
    }
    if state.loading_elapsed >= duration {
        if state.stage.is_none() {
            build_stage(state, events);
        }
        set_phase(state, Phase::Play, events);
    }
}

fn build_stage(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let Some(session) = state.session.as_mut() else {
        return;
    };
    let level = build_level(session.run_seed, session.level_index, &state.tuning);
    let number = session.level_index + 1;
    events.push(GameEvent::LevelBuilt {
        level: number,
        boss: level.is_boss_level(),
    });
    session.begin_stage(state.clock);
    state.stage = Some(Stage::new(
        level,
        session,
        &state.tuning,
        state.respawn_at_checkpoint,
    ));
    state.respawn_at_checkpoint = false;

    if number > state.progress.best_level {
        state.progress.best_level = number;
        events.push(GameEvent::ProgressUpdated);
    }
}

fn play_frame(state: &mut GameState, input: &InputState, dt: f32, events: &mut Vec<GameEvent>) {
    let (Some(session), Some(stage)) = (state.session.as_mut(), state.stage.as_mut()) else {
        return;
    };
    let first = events.len();
    let outcome = stage.step(session, input, &state.tuning, dt, events);

    if state.tutorial_active() {
        track_tutorial(state, input, first, events);
    }

    match outcome {
        Some(StageOutcome::Complete) => {
            let Some(session) = state.session.as_ref() else {
                return;
            };
            let summary = StageSummary {
                level: session.level_index + 1,
                coins: session.stage.coins,
                damage_taken: session.stage.damage_taken,
                enemies_defeated: session.stage.enemies_defeated,
                time_secs: (state.clock - session.stage.started_at) as f32,
            };
            log::info!(
                "Level {} complete: coins={} damage={} time={:.1}s",
                summary.level,
                summary.coins,
                summary.damage_taken,
                summary.time_secs
            );
            state.last_summary = Some(summary.clone());
            set_phase(state, Phase::StageComplete, events);
            events.push(GameEvent::StageComplete(summary));
        }
        Some(StageOutcome::Died(cause)) => {
            log::info!("Player died: {:?}", cause);
            state.death = Some(cause);
            set_phase(state, Phase::Dead, events);
            events.push(GameEvent::PlayerDied(cause));
        }
        None => {}
    }
}

/// Mark tutorial goals from this frame's input and events
fn track_tutorial(state: &mut GameState, input: &InputState, first: usize, events: &mut Vec<GameEvent>) {
    let t = &mut state.tutorial;
    if input.horizontal() != 0.0 {
        t.moved = true;
    }
    for event in &events[first..] {
        match event {
            GameEvent::Jumped => t.jumped = true,
            GameEvent::Threw => t.threw = true,
            GameEvent::CoinCollected { .. } => t.collected = true,
            _ => {}
        }
    }
    if t.is_complete() {
        state.progress.tutorial_done = true;
        log::info!("Tutorial complete");
        events.push(GameEvent::TutorialComplete);
        events.push(GameEvent::ProgressUpdated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Progress;
    use crate::sim::events::DeathCause;
    use crate::sim::session::{Character, Upgrade};
    use crate::tuning::Tuning;

    const DT: f32 = 1.0 / 60.0;

    fn booted(seed: u32) -> GameState {
        let mut state = GameState::new(Tuning::default(), Progress::default()).with_seed(Some(seed));
        state.on_assets_settled();
        tick(&mut state, &InputState::new(), &[], DT);
        state
    }

    fn idle(state: &mut GameState, frames: usize) -> Vec<GameEvent> {
        let input = InputState::new();
        let mut all = Vec::new();
        for _ in 0..frames {
            all.extend(tick(state, &input, &[], DT));
        }
        all
    }

    fn command(state: &mut GameState, cmd: Command) -> Vec<GameEvent> {
        tick(state, &InputState::new(), &[cmd], DT)
    }

    fn has_notice(events: &[GameEvent]) -> bool {
        events.iter().any(|e| matches!(e, GameEvent::Notice(_)))
    }

    /// Boot through to play on level 1
    fn playing(seed: u32) -> GameState {
        let mut state = booted(seed);
        command(&mut state, Command::Confirm);
        command(&mut state, Command::SelectCharacter(Character::Sprinter));
        idle(&mut state, 120);
        assert_eq!(state.phase, Phase::Play);
        state
    }

    #[test]
    fn test_boot_waits_for_assets() {
        let mut state = GameState::new(Tuning::default(), Progress::default());
        idle(&mut state, 10);
        assert_eq!(state.phase, Phase::Boot);
        state.on_assets_settled();
        let events = idle(&mut state, 1);
        assert_eq!(state.phase, Phase::Start);
        assert!(events.contains(&GameEvent::AssetsReady));
    }

    #[test]
    fn test_flow_to_play() {
        let mut state = booted(42);
        command(&mut state, Command::Confirm);
        assert_eq!(state.phase, Phase::Select);
        let events = command(&mut state, Command::SelectCharacter(Character::Bruiser));
        assert_eq!(state.phase, Phase::Loading);
        assert!(events.contains(&GameEvent::RunStarted {
            seed: 42,
            character: Character::Bruiser
        }));
        assert!(state.stage.is_none());

        // Built half way through, playable at the end
        let half = (state.tuning.flow.loading_secs * 0.5 / DT).ceil() as usize + 1;
        let events = idle(&mut state, half);
        assert!(state.stage.is_some());
        assert_eq!(state.phase, Phase::Loading);
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelBuilt { level: 1, .. })));
        idle(&mut state, half + 2);
        assert_eq!(state.phase, Phase::Play);
        assert_eq!(state.progress.best_level, 1);
    }

    #[test]
    fn test_pause_toggle_and_loading_rejection() {
        let mut state = booted(1);
        command(&mut state, Command::Confirm);
        command(&mut state, Command::SelectCharacter(Character::Sprinter));
        let events = command(&mut state, Command::TogglePause);
        assert!(has_notice(&events));
        assert_eq!(state.phase, Phase::Loading);

        idle(&mut state, 120);
        let mut input = InputState::new();
        input.press(Action::Pause);
        tick(&mut state, &input, &[], DT);
        assert_eq!(state.phase, Phase::Paused);

        // Frozen while paused
        let player = state.stage.as_ref().map(|s| s.player.clone());
        idle(&mut state, 30);
        assert_eq!(state.stage.as_ref().map(|s| s.player.clone()), player);

        command(&mut state, Command::TogglePause);
        assert_eq!(state.phase, Phase::Play);
    }

    #[test]
    fn test_invalid_commands_leave_state_alone() {
        let mut state = booted(1);
        let events = command(&mut state, Command::Continue);
        assert!(has_notice(&events));
        assert_eq!(state.phase, Phase::Start);
        let events = command(&mut state, Command::Purchase(Upgrade::Dash));
        assert!(has_notice(&events));
        assert!(state.session.is_none());
    }

    #[test]
    fn test_shop_once_per_stage() {
        let mut state = playing(5);
        if let Some(session) = state.session.as_mut() {
            session.coins = 50;
        }
        command(&mut state, Command::OpenShop);
        assert_eq!(state.phase, Phase::Shop);
        let events = command(&mut state, Command::Purchase(Upgrade::MaxHp));
        assert!(events.iter().any(|e| matches!(e, GameEvent::Purchased { upgrade: Upgrade::MaxHp, .. })));
        let session = state.session.as_ref().map(|s| s.max_hp());
        assert_eq!(state.stage.as_ref().map(|s| s.player.health.max), session);

        command(&mut state, Command::CloseShop);
        assert_eq!(state.phase, Phase::Play);
        let events = command(&mut state, Command::OpenShop);
        assert!(events.contains(&GameEvent::Notice(ShopError::AlreadyVisited.to_string())));
        assert_eq!(state.phase, Phase::Play);
    }

    #[test]
    fn test_death_retry_restores_snapshot() {
        let mut state = playing(9);
        let start_coins = state.session.as_ref().map(|s| s.coins);
        if let Some(session) = state.session.as_mut() {
            session.add_coins(7);
        }
        if let Some(stage) = state.stage.as_mut() {
            stage.player.body.pos.y = crate::consts::KILL_Y + 10.0;
        }
        let events = idle(&mut state, 1);
        assert_eq!(state.phase, Phase::Dead);
        assert!(events.contains(&GameEvent::PlayerDied(DeathCause::Fell)));

        idle(&mut state, 10);
        assert_eq!(state.phase, Phase::Dead);

        command(&mut state, Command::RetryStage);
        assert_eq!(state.phase, Phase::Loading);
        assert_eq!(state.session.as_ref().map(|s| s.coins), start_coins);
        idle(&mut state, 120);
        assert_eq!(state.phase, Phase::Play);
        assert_eq!(state.session.as_ref().map(|s| s.level_index), Some(0));
    }

    #[test]
    fn test_stage_complete_then_continue() {
        let mut state = playing(21);
        if let Some(stage) = state.stage.as_mut() {
            let exit = stage.level.exit.rect;
            stage.player.body.pos.x = exit.x + 2.0;
            stage.player.body.pos.y = exit.bottom() - crate::consts::PLAYER_HEIGHT;
        }
        let events = idle(&mut state, 1);
        assert_eq!(state.phase, Phase::StageComplete);
        assert!(events.iter().any(|e| matches!(e, GameEvent::StageComplete(s) if s.level == 1)));

        command(&mut state, Command::Continue);
        assert_eq!(state.phase, Phase::NextLoading);
        idle(&mut state, 120);
        assert_eq!(state.phase, Phase::Play);
        assert_eq!(state.session.as_ref().map(|s| s.level_index), Some(1));
        assert_eq!(state.progress.best_level, 2);
    }

    #[test]
    fn test_escape_in_shop_only_closes_it() {
        let mut state = playing(5);
        command(&mut state, Command::OpenShop);
        assert_eq!(state.phase, Phase::Shop);

        let mut input = InputState::new();
        input.press(Action::Pause);
        let events = tick(&mut state, &input, &[Command::CloseShop], DT);
        assert_eq!(state.phase, Phase::Play);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PhaseChanged { to: Phase::Paused, .. })));

        // A later press still pauses
        input.end_frame();
        input.release(Action::Pause);
        input.press(Action::Pause);
        tick(&mut state, &input, &[], DT);
        assert_eq!(state.phase, Phase::Paused);
    }

    #[test]
    fn test_new_run_returns_to_select() {
        let mut state = playing(3);
        command(&mut state, Command::TogglePause);
        command(&mut state, Command::NewRun);
        assert_eq!(state.phase, Phase::Select);
        assert!(state.session.is_none());
        assert!(state.stage.is_none());
    }

    #[test]
    fn test_tutorial_completes_once() {
        let mut state = playing(4);
        state.tutorial.moved = true;
        state.tutorial.jumped = true;
        state.tutorial.threw = true;
        if let Some(stage) = state.stage.as_mut() {
            let coin = stage.coins[0].rect;
            stage.player.body.pos.x = coin.x;
            stage.player.body.pos.y = coin.y;
        }
        let events = idle(&mut state, 1);
        assert!(events.contains(&GameEvent::TutorialComplete));
        assert!(state.progress.tutorial_done);
        let events = idle(&mut state, 5);
        assert!(!events.contains(&GameEvent::TutorialComplete));
    }

    #[test]
    fn test_same_seed_same_run() {
        let a = playing(77);
        let b = playing(77);
        let la = a.stage.as_ref().map(|s| s.level.clone());
        let lb = b.stage.as_ref().map(|s| s.level.clone());
        assert_eq!(la, lb);
    }

    #[test]
    fn test_huge_dt_is_clamped() {
        let mut state = playing(6);
        let before = state.clock;
        tick(&mut state, &InputState::new(), &[], 10.0);
        assert!((state.clock - before - MAX_FRAME_DT as f64).abs() < 1e-6);
    }
}
